//! GUI 管理器
//!
//! GuiManager 负责集成 egui 与 wgpu：转发窗口事件、构建当帧界面，
//! 并在场景绘制完成后把界面画到交换链图像上。

use egui_wgpu::Renderer as EguiRenderer;
use egui_winit::State as EguiState;
use winit::window::Window;

use crate::gui::metrics::PerformanceMetrics;
use crate::gui::panels::{self, GuiContent};

/// GUI 管理器（使用 egui + wgpu）
pub struct GuiManager {
    context: egui::Context,
    state: EguiState,
    renderer: EguiRenderer,
    metrics: PerformanceMetrics,
}

impl GuiManager {
    /// 创建 GUI 管理器
    ///
    /// GUI 总是绘制在单采样的交换链图像上，不使用深度缓冲。
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let context = egui::Context::default();
        let state = EguiState::new(
            context.clone(),
            context.viewport_id(),
            window,
            Some(window.scale_factor() as f32),
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = EguiRenderer::new(device, surface_format, None, 1);

        Self {
            context,
            state,
            renderer,
            metrics: PerformanceMetrics::new(),
        }
    }

    /// 处理输入事件
    /// 返回 true 如果事件被 GUI 消费
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// 构建并绘制 GUI
    ///
    /// 返回 egui 上传缓冲产生的命令缓冲，需要先于 `encoder` 提交。
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        window: &Window,
        content: &GuiContent,
    ) -> Vec<wgpu::CommandBuffer> {
        self.metrics.record_frame();
        let fps = self.metrics.fps();

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.context.run(raw_input, |ctx| match content {
            GuiContent::Loading(snapshot) => panels::status::render_loading(ctx, snapshot),
            GuiContent::Error { file_name, message } => panels::status::render_error(ctx, file_name, message),
            GuiContent::Ready(stats) => panels::stats::render(ctx, stats, fps),
        });

        self.state.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self.context.tessellate(full_output.shapes, full_output.pixels_per_point);
        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let command_buffers =
            self.renderer.update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // 保留场景渲染结果
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        command_buffers
    }
}
