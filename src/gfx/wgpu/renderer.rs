//! wgpu 渲染器实现
//!
//! 本模块负责：
//! - 持有设备、管线缓存与每帧 Uniform 缓冲
//! - 安装/替换加载完成的网格与纹理
//! - 按 网格线 → 模型 → 背景条 → GUI 的顺序绘制一帧
//!
//! 场景通道在 MSAA 开启时绘制到多重采样颜色目标并解析到交换链图像，
//! GUI 通道随后直接绘制在解析后的图像上。

use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::component::camera::CameraState;
use crate::component::settings::RenderSettings;
use crate::core::error::{GraphicsError, Result};
use crate::core::Config;
use crate::geometry::pipeline::LoadedModel;
use crate::geometry::texture::TextureImage;
use crate::geometry::vertex::ColorVertex;
use crate::gui::{GuiContent, GuiManager};
use crate::renderer::frame::{FrameTransforms, LineUniforms, MeshUniforms};
use crate::renderer::grid::grid_vertices;
use crate::renderer::overlay::{bar_vertices, overlay_projection};
use crate::renderer::render_state::{texture_active, MeshRenderState, WireframeMode};

use super::backend::{WgpuBackend, DEPTH_FORMAT};
use super::pipelines::{uniform_bind_group_layout, LinePipelines, PipelineCache};
use super::upload::{GpuMesh, GpuTexture, UploadStrategy};

/// 一帧需要的外部状态
pub struct FrameInput<'a> {
    pub camera: &'a CameraState,
    pub settings: &'a RenderSettings,
    /// 模型绕 Y 轴的附加旋转（度）
    pub rotation_offset: f32,
    pub gui: &'a GuiContent,
}

/// 一个 uniform 缓冲及其绑定组
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: u64, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// 深度缓冲与（可选的）多重采样颜色目标
struct RenderTargets {
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl RenderTargets {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32, sample_count: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Color Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        Self {
            depth_view: depth_texture.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa_view,
        }
    }
}

/// 已安装到 GPU 的模型
struct InstalledModel {
    mesh: GpuMesh,
    texture: Option<GpuTexture>,
    has_uvs: bool,
}

/// wgpu 渲染器
pub struct Renderer {
    gfx: WgpuBackend,
    config: Config,

    // 管线
    mesh_pipelines: PipelineCache,
    line_pipelines: LinePipelines,

    // Uniform 与绑定组
    mesh_uniforms: UniformSlot,
    grid_uniforms: UniformSlot,
    overlay_uniforms: UniformSlot,
    texture_layout: wgpu::BindGroupLayout,
    white_texture: GpuTexture,

    // 静态几何
    grid_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    bar_buffer: wgpu::Buffer,
    bar_vertex_count: u32,

    targets: RenderTargets,
    model: Option<InstalledModel>,
    upload_strategy: UploadStrategy,

    // GUI 管理器
    gui_manager: GuiManager,
}

impl Renderer {
    /// 创建窗口、设备与全部静态资源
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Creating wgpu renderer");

        let gfx = WgpuBackend::new(event_loop, config)?;
        let device = &gfx.device;
        let format = gfx.surface_config.format;
        let (width, height) = gfx.surface_size();

        debug!("Creating bind group layouts");
        let uniform_layout = uniform_bind_group_layout(device, "Uniform Bind Group Layout");
        let texture_layout = GpuTexture::bind_group_layout(device);

        let mesh_uniforms = UniformSlot::new(
            device,
            &uniform_layout,
            std::mem::size_of::<MeshUniforms>() as u64,
            "Mesh Uniforms",
        );
        let line_size = std::mem::size_of::<LineUniforms>() as u64;
        let grid_uniforms = UniformSlot::new(device, &uniform_layout, line_size, "Grid Uniforms");
        let overlay_uniforms = UniformSlot::new(device, &uniform_layout, line_size, "Overlay Uniforms");

        // 无纹理时绑定 1x1 白色纹理，着色器布局保持不变
        let white_texture = GpuTexture::upload(
            device,
            &gfx.queue,
            &texture_layout,
            &TextureImage {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            },
            "White Texture",
        )?;

        debug!("Creating pipelines");
        let mut mesh_pipelines = PipelineCache::new(
            device,
            &[&uniform_layout, &texture_layout],
            format,
            gfx.sample_count,
        );
        mesh_pipelines.warm(
            device,
            MeshRenderState::resolve(&RenderSettings::default(), gfx.polygon_line_supported),
        );
        let line_pipelines = LinePipelines::new(device, &uniform_layout, format, gfx.sample_count);

        let grid = grid_vertices(&config.grid);
        let grid_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let (bar_buffer, bar_vertex_count) = create_bar_buffer(device, width, height);

        let targets = RenderTargets::new(device, format, width, height, gfx.sample_count);

        debug!("Initializing GUI");
        let gui_manager = GuiManager::new(device, format, gfx.window());
        info!("GUI manager initialized");

        info!("wgpu renderer created successfully");

        Ok(Self {
            mesh_pipelines,
            line_pipelines,
            mesh_uniforms,
            grid_uniforms,
            overlay_uniforms,
            texture_layout,
            white_texture,
            grid_buffer,
            grid_vertex_count: grid.len() as u32,
            bar_buffer,
            bar_vertex_count,
            targets,
            model: None,
            upload_strategy: UploadStrategy::choose(config.graphics.upload_strategy),
            gui_manager,
            config: config.clone(),
            gfx,
        })
    }

    /// 安装加载完成的模型，替换并释放旧资源
    ///
    /// 网格上传失败返回错误；纹理上传失败只记录警告。
    pub fn install(&mut self, loaded: &LoadedModel) -> Result<()> {
        if let Some(old) = self.model.take() {
            debug!("Releasing previous model");
            old.mesh.destroy();
            if let Some(texture) = old.texture {
                texture.destroy();
            }
        }

        let mesh = GpuMesh::upload(
            &self.gfx.device,
            &loaded.asset,
            self.upload_strategy,
            self.gfx.max_buffer_size(),
            !self.gfx.polygon_line_supported,
        )?;

        let texture = loaded.texture.as_ref().and_then(|(path, image)| {
            match GpuTexture::upload(
                &self.gfx.device,
                &self.gfx.queue,
                &self.texture_layout,
                image,
                "Model Texture",
            ) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    warn!("{} ({}), continuing without texture", e, path.display());
                    None
                }
            }
        });

        self.model = Some(InstalledModel {
            mesh,
            texture,
            has_uvs: loaded.asset.has_uvs,
        });
        Ok(())
    }

    /// 是否有可用的模型纹理
    pub fn has_texture(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.texture.is_some())
    }

    /// 处理窗口大小调整
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("Resizing to {}x{}", width, height);

        self.gfx.reconfigure_surface(width, height);
        self.targets = RenderTargets::new(
            &self.gfx.device,
            self.gfx.surface_config.format,
            width,
            height,
            self.gfx.sample_count,
        );
        let (buffer, count) = create_bar_buffer(&self.gfx.device, width, height);
        self.bar_buffer.destroy();
        self.bar_buffer = buffer;
        self.bar_vertex_count = count;
    }

    /// 绘制一帧
    pub fn render(&mut self, frame: &FrameInput) -> Result<()> {
        // 1. 获取交换链纹理
        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.gfx.surface_size();
                debug!("Surface lost or outdated, reconfiguring");
                self.gfx.reconfigure_surface(width, height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => {
                return Err(GraphicsError::SwapchainError(format!("Failed to acquire next image: {}", e)).into());
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = self.gfx.surface_size();

        // 2. 更新 Uniform
        let transforms = FrameTransforms::new(
            frame.camera,
            &self.config.graphics,
            width,
            height,
            frame.rotation_offset,
        );
        let use_texture = self.model.as_ref().is_some_and(|m| {
            texture_active(m.texture.is_some(), frame.settings.texture_enabled, m.has_uvs)
        });
        let mesh_uniforms = transforms.mesh_uniforms(frame.camera, frame.settings, use_texture);
        let queue = &self.gfx.queue;
        queue.write_buffer(&self.mesh_uniforms.buffer, 0, bytemuck::bytes_of(&mesh_uniforms));
        queue.write_buffer(&self.grid_uniforms.buffer, 0, bytemuck::bytes_of(&transforms.grid_uniforms()));
        queue.write_buffer(
            &self.overlay_uniforms.buffer,
            0,
            bytemuck::bytes_of(&LineUniforms::new(&overlay_projection(width, height))),
        );

        // 3. 解析网格绘制状态
        let state = MeshRenderState::resolve(frame.settings, self.gfx.polygon_line_supported);
        if state.needs_edge_buffer() {
            if let Some(model) = self.model.as_mut() {
                model.mesh.ensure_edge_buffer(&self.gfx.device);
            }
        }
        let mesh_pipeline = self.mesh_pipelines.get(&self.gfx.device, state);
        let show_bars = matches!(frame.gui, GuiContent::Ready(_));

        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // 4. 场景通道
        {
            let (color_view, resolve_target) = match &self.targets.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let [r, g, b] = self.config.graphics.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if frame.settings.grid_visible {
                render_pass.set_pipeline(&self.line_pipelines.grid);
                render_pass.set_bind_group(0, &self.grid_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.grid_buffer.slice(..));
                render_pass.draw(0..self.grid_vertex_count, 0..1);
            }

            if let Some(model) = &self.model {
                let texture = match (&model.texture, use_texture) {
                    (Some(texture), true) => texture,
                    _ => &self.white_texture,
                };
                render_pass.set_pipeline(mesh_pipeline);
                render_pass.set_bind_group(0, &self.mesh_uniforms.bind_group, &[]);
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                match state.wireframe {
                    WireframeMode::EdgeList => model.mesh.draw_edges(&mut render_pass),
                    WireframeMode::Off | WireframeMode::PolygonLine => model.mesh.draw(&mut render_pass),
                }
            }

            if show_bars {
                render_pass.set_pipeline(&self.line_pipelines.overlay);
                render_pass.set_bind_group(0, &self.overlay_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.bar_buffer.slice(..));
                render_pass.draw(0..self.bar_vertex_count, 0..1);
            }
        }

        // 5. GUI 通道
        let gui_commands = self.gui_manager.render(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &view,
            self.gfx.window(),
            frame.gui,
        );

        // 6. 提交命令
        self.gfx
            .queue
            .submit(gui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }

    /// 处理 GUI 事件
    /// 返回 true 如果事件被 GUI 消费
    pub fn handle_gui_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.gui_manager.handle_event(self.gfx.window(), event)
    }

    /// 获取窗口引用
    pub fn window(&self) -> &Window {
        self.gfx.window()
    }

    /// 纹理最大边长
    pub fn max_texture_dimension(&self) -> u32 {
        self.gfx.max_texture_dimension()
    }
}

fn create_bar_buffer(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Buffer, u32) {
    let vertices: Vec<ColorVertex> = bar_vertices(width, height);
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Overlay Bar Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    (buffer, vertices.len() as u32)
}
