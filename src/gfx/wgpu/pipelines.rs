//! 渲染管线
//!
//! 网格管线按 [`MeshRenderState`] 懒创建并缓存；网格线与背景条共用
//! 一套顶点色着色器，在初始化时各建一条管线。

use std::collections::HashMap;
use tracing::debug;

use crate::geometry::vertex::{ColorVertex, Vertex};
use crate::renderer::render_state::{MeshRenderState, WireframeMode};

use super::backend::DEPTH_FORMAT;

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3, 3 => Float32x2];

const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_ATTRIBUTES,
    }
}

fn color_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_ATTRIBUTES,
    }
}

/// 创建单个 uniform 缓冲的绑定组布局
pub fn uniform_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// 网格管线缓存
pub struct PipelineCache {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    pipelines: HashMap<MeshRenderState, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../renderer/shaders/mesh.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
        Self {
            shader,
            layout,
            color_format,
            sample_count,
            pipelines: HashMap::new(),
        }
    }

    /// 预先创建最常用的状态，避免首帧卡顿
    pub fn warm(&mut self, device: &wgpu::Device, state: MeshRenderState) {
        self.get(device, state);
    }

    /// 取得（必要时创建）与状态对应的管线
    pub fn get(&mut self, device: &wgpu::Device, state: MeshRenderState) -> &wgpu::RenderPipeline {
        let shader = &self.shader;
        let layout = &self.layout;
        let color_format = self.color_format;
        let sample_count = self.sample_count;
        self.pipelines.entry(state).or_insert_with(|| {
            debug!(?state, "Creating mesh pipeline");
            create_mesh_pipeline(device, shader, layout, color_format, sample_count, state)
        })
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    state: MeshRenderState,
) -> wgpu::RenderPipeline {
    let (topology, polygon_mode) = match state.wireframe {
        WireframeMode::Off => (wgpu::PrimitiveTopology::TriangleList, wgpu::PolygonMode::Fill),
        WireframeMode::PolygonLine => (wgpu::PrimitiveTopology::TriangleList, wgpu::PolygonMode::Line),
        WireframeMode::EdgeList => (wgpu::PrimitiveTopology::LineList, wgpu::PolygonMode::Fill),
    };
    let cull_mode = (state.cull_back_faces && topology == wgpu::PrimitiveTopology::TriangleList)
        .then_some(wgpu::Face::Back);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[mesh_vertex_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: state.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// 顶点色管线（网格线 / 背景条）
pub struct LinePipelines {
    /// 网格线：深度测试开启，不写深度
    pub grid: wgpu::RenderPipeline,
    /// 背景条：不做深度测试
    pub overlay: wgpu::RenderPipeline,
}

impl LinePipelines {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../renderer/shaders/line.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, topology, depth_compare| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[color_vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                // 渲染通道带深度附件，管线必须声明相同的深度格式
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            })
        };

        Self {
            grid: build(
                "Grid Pipeline",
                wgpu::PrimitiveTopology::LineList,
                wgpu::CompareFunction::Less,
            ),
            overlay: build(
                "Overlay Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::CompareFunction::Always,
            ),
        }
    }
}
