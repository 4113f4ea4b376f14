//! GPU 上传
//!
//! 网格与纹理在渲染线程上一次性上传。渲染器始终只持有一个 [`GpuMesh`]，
//! 安装新网格前显式 `destroy()` 旧缓冲。

use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::core::config::UploadStrategyConfig;
use crate::core::error::{GraphicsError, Result};
use crate::geometry::mesh::{triangle_edges, MeshAsset};
use crate::geometry::texture::TextureImage;
use crate::geometry::vertex::Vertex;

/// 顶点上传方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    /// 交错顶点缓冲 + u32 索引缓冲
    Indexed,
    /// 每个面角一个顶点，非索引绘制
    Flattened,
}

impl UploadStrategy {
    pub fn choose(config: UploadStrategyConfig) -> Self {
        match config {
            UploadStrategyConfig::Indexed => UploadStrategy::Indexed,
            UploadStrategyConfig::Flattened => UploadStrategy::Flattened,
        }
    }
}

/// 缓冲尺寸检查
pub fn check_buffer_size(what: &str, bytes: u64, max_buffer_size: u64) -> Result<()> {
    if bytes > max_buffer_size {
        return Err(GraphicsError::GpuUpload(format!(
            "{} needs {} bytes, device limit is {} bytes",
            what, bytes, max_buffer_size
        ))
        .into());
    }
    Ok(())
}

enum DrawData {
    Indexed {
        index_buffer: wgpu::Buffer,
        index_count: u32,
    },
    Flattened {
        vertex_count: u32,
    },
}

/// GPU 上的网格
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    draw: DrawData,
    /// 线框回退路径需要的三角形索引，仅在需要时保留
    cpu_indices: Option<Vec<u32>>,
    edge_buffer: Option<(wgpu::Buffer, u32)>,
}

impl GpuMesh {
    /// 上传网格
    ///
    /// `keep_indices` 为 true 时保留一份 CPU 索引，供线框回退路径生成边缓冲。
    pub fn upload(
        device: &wgpu::Device,
        asset: &MeshAsset,
        strategy: UploadStrategy,
        max_buffer_size: u64,
        keep_indices: bool,
    ) -> Result<Self> {
        if asset.is_empty() {
            return Err(GraphicsError::GpuUpload("mesh has no triangles".to_string()).into());
        }

        let vertex_size = std::mem::size_of::<Vertex>() as u64;
        let (vertices, draw_vertex_count) = match strategy {
            UploadStrategy::Indexed => {
                check_buffer_size("vertex buffer", asset.vertex_count() as u64 * vertex_size, max_buffer_size)?;
                check_buffer_size("index buffer", asset.indices.len() as u64 * 4, max_buffer_size)?;
                (asset.interleaved(), 0)
            }
            UploadStrategy::Flattened => {
                check_buffer_size("vertex buffer", asset.indices.len() as u64 * vertex_size, max_buffer_size)?;
                let count = u32::try_from(asset.indices.len())
                    .map_err(|_| GraphicsError::GpuUpload("too many vertices".to_string()))?;
                (asset.flattened(), count)
            }
        };

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let draw = match strategy {
            UploadStrategy::Indexed => DrawData::Indexed {
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Index Buffer"),
                    contents: bytemuck::cast_slice(&asset.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: asset.indices.len() as u32,
            },
            UploadStrategy::Flattened => DrawData::Flattened {
                vertex_count: draw_vertex_count,
            },
        };

        info!(
            strategy = ?strategy,
            vertices = vertices.len(),
            size_mb = %format!("{:.1}", (vertices.len() as u64 * vertex_size) as f64 / (1024.0 * 1024.0)),
            "Mesh uploaded"
        );

        let cpu_indices = keep_indices.then(|| match strategy {
            UploadStrategy::Indexed => asset.indices.clone(),
            UploadStrategy::Flattened => (0..asset.indices.len() as u32).collect(),
        });

        Ok(Self {
            vertex_buffer,
            draw,
            cpu_indices,
            edge_buffer: None,
        })
    }

    /// 绘制填充三角形
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.draw {
            DrawData::Indexed {
                index_buffer,
                index_count,
            } => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..*index_count, 0, 0..1);
            }
            DrawData::Flattened { vertex_count } => pass.draw(0..*vertex_count, 0..1),
        }
    }

    /// 首次需要时生成边索引缓冲
    pub fn ensure_edge_buffer(&mut self, device: &wgpu::Device) {
        if self.edge_buffer.is_some() {
            return;
        }
        let Some(indices) = self.cpu_indices.as_ref() else {
            return;
        };
        let edges = triangle_edges(indices);
        debug!(edges = edges.len() / 2, "Built wireframe edge buffer");
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Edge Buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.edge_buffer = Some((buffer, edges.len() as u32));
    }

    /// 按线段列表绘制边；边缓冲尚未生成时不绘制
    pub fn draw_edges<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if let Some((buffer, count)) = &self.edge_buffer {
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..*count, 0, 0..1);
        }
    }

    /// 释放所有 GPU 缓冲
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        if let DrawData::Indexed { index_buffer, .. } = &self.draw {
            index_buffer.destroy();
        }
        if let Some((buffer, _)) = &self.edge_buffer {
            buffer.destroy();
        }
    }
}

/// GPU 上的纹理及其绑定组
pub struct GpuTexture {
    texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    /// 纹理绑定组布局（binding 0：纹理，binding 1：采样器）
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &TextureImage,
        label: &str,
    ) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if image.width == 0 || image.height == 0 || image.width > max || image.height > max {
            return Err(GraphicsError::GpuUpload(format!(
                "texture {}x{} outside device limit {}",
                image.width, image.height, max
            ))
            .into());
        }
        if image.rgba.len() != (image.width * image.height * 4) as usize {
            return Err(GraphicsError::GpuUpload("texture data size mismatch".to_string()).into());
        }

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Ok(Self { texture, bind_group })
    }

    pub fn destroy(self) {
        self.texture.destroy();
    }
}
