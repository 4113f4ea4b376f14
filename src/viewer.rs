//! 查看器应用状态
//!
//! 把窗口事件、键盘命令、后台加载进度和渲染器串在一起。
//! 所有方法都在事件循环线程上调用。

use std::time::Duration;
use tracing::{error, info, warn};
use winit::event::WindowEvent;
use winit::event_loop::EventLoopWindowTarget;
use winit::window::Fullscreen;

use crate::component::camera::CameraController;
use crate::component::settings::RenderSettings;
use crate::core::input::{InputSystem, ViewerCommand};
use crate::core::log::megabytes;
use crate::core::prefs::Preferences;
use crate::core::runtime::{LoadState, LoadTracker};
use crate::core::Config;
use crate::geometry::mesh::MeshAsset;
use crate::geometry::pipeline::{display_name, LoadTimings, LoadedModel};
use crate::gfx::{FrameInput, Renderer};
use crate::gui::GuiContent;
use crate::renderer::overlay::OverlayStats;

/// 命令对应用外部（窗口、事件循环）的影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEffect {
    None,
    Quit,
    ToggleFullscreen,
}

/// 把命令作用到相机与渲染设置上
///
/// 没有加载纹理时忽略纹理开关。
pub fn apply_command(
    command: ViewerCommand,
    camera: &mut CameraController,
    settings: &mut RenderSettings,
    has_texture: bool,
) -> CommandEffect {
    match command {
        ViewerCommand::Quit => return CommandEffect::Quit,
        ViewerCommand::ToggleFullscreen => return CommandEffect::ToggleFullscreen,
        ViewerCommand::ResetCamera => camera.reset(),
        ViewerCommand::ToggleTexture => {
            if has_texture {
                settings.texture_enabled = !settings.texture_enabled;
            }
        }
        ViewerCommand::ToggleWireframe => settings.wireframe = !settings.wireframe,
        ViewerCommand::ToggleGrid => settings.grid_visible = !settings.grid_visible,
        ViewerCommand::StepOpacity(delta) => settings.step_opacity(delta),
        ViewerCommand::SetOpacityDigit(digit) => settings.set_opacity_digit(digit),
    }
    CommandEffect::None
}

/// 平均加载速度（MB/s）；耗时为 0 时返回 0
pub fn throughput_mb_per_s(file_size: u64, total: Duration) -> f64 {
    let secs = total.as_secs_f64();
    if secs > 0.0 {
        megabytes(file_size) / secs
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModelStats {
    vertices: usize,
    faces: usize,
}

/// 与 GPU 无关的交互状态
///
/// 相机和渲染设置在整个进程内保持，只响应用户命令；
/// 模型到达时只记录统计信息。
struct ViewState {
    camera: CameraController,
    input: InputSystem,
    settings: RenderSettings,
    stats: Option<ModelStats>,
}

impl ViewState {
    fn new(config: &Config) -> Self {
        Self {
            camera: CameraController::new(&config.camera),
            input: InputSystem::new(&config.camera),
            settings: RenderSettings::default(),
            stats: None,
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent, has_texture: bool) -> CommandEffect {
        match self.input.handle_window_event(event, &mut self.camera) {
            Some(command) => apply_command(command, &mut self.camera, &mut self.settings, has_texture),
            None => CommandEffect::None,
        }
    }

    fn model_installed(&mut self, asset: &MeshAsset) {
        self.stats = Some(ModelStats {
            vertices: asset.vertex_count(),
            faces: asset.face_count(),
        });
    }
}

/// 查看器
pub struct Viewer {
    renderer: Renderer,
    tracker: LoadTracker,
    view: ViewState,
    rotation_offset: f32,
    base_title: String,
    /// 上一次处理过的加载状态，只在状态变化时更新标题
    seen_state: LoadState,
}

impl Viewer {
    pub fn new(renderer: Renderer, tracker: LoadTracker, config: &Config, rotation_offset: f32) -> Self {
        Self {
            renderer,
            tracker,
            view: ViewState::new(config),
            rotation_offset,
            base_title: config.window.title.clone(),
            seen_state: LoadState::Initializing,
        }
    }

    /// 处理窗口事件
    pub fn handle_window_event(&mut self, event: &WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down...");
                elwt.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size.width, size.height);
                return;
            }
            WindowEvent::RedrawRequested => {
                self.redraw(elwt);
                return;
            }
            _ => {}
        }

        if self.renderer.handle_gui_event(event) {
            return;
        }

        let has_texture = self.renderer.has_texture();
        match self.view.handle_window_event(event, has_texture) {
            CommandEffect::None => {}
            CommandEffect::Quit => {
                info!("Escape pressed, shutting down...");
                elwt.exit();
            }
            CommandEffect::ToggleFullscreen => {
                let window = self.renderer.window();
                let next = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(next);
            }
        }
    }

    /// 每轮事件结束后调用：拉取加载进度并请求重绘
    pub fn about_to_wait(&mut self) {
        self.poll_load();
        self.renderer.window().request_redraw();
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let size = self.renderer.window().inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let gui = self.gui_content();
        let frame = FrameInput {
            camera: self.view.camera.state(),
            settings: &self.view.settings,
            rotation_offset: self.rotation_offset,
            gui: &gui,
        };
        if let Err(e) = self.renderer.render(&frame) {
            error!("Draw failed: {}", e);
            eprintln!("Draw failed: {}", e);
            elwt.exit();
        }
    }

    fn gui_content(&self) -> GuiContent {
        let snapshot = self.tracker.snapshot();
        let view = &self.view;
        match (&snapshot.state, view.stats) {
            (LoadState::Ready, Some(stats)) => GuiContent::Ready(OverlayStats {
                vertices: stats.vertices,
                faces: stats.faces,
                distance: view.camera.state().distance,
                opacity_percent: view.settings.opacity_percent(),
                texture_on: self.renderer.has_texture() && view.settings.texture_enabled,
                wireframe: view.settings.wireframe,
                grid: view.settings.grid_visible,
            }),
            (LoadState::Error(message), _) => GuiContent::Error {
                file_name: snapshot.file_name.clone(),
                message: message.clone(),
            },
            _ => GuiContent::Loading(snapshot),
        }
    }

    /// 处理后台加载的交付结果与状态变化
    fn poll_load(&mut self) {
        if let Some(loaded) = self.tracker.take_payload() {
            self.install(loaded);
        }

        let state = self.tracker.state();
        if state == self.seen_state {
            return;
        }
        if let LoadState::Error(message) = &state {
            error!("Load failed: {}", message);
            self.renderer.window().set_title("Error loading model");
        }
        self.seen_state = state;
    }

    fn install(&mut self, loaded: LoadedModel) {
        let upload_start = std::time::Instant::now();
        if let Err(e) = self.renderer.install(&loaded) {
            self.tracker.fail(e.to_string());
            return;
        }

        let timings = LoadTimings {
            gpu_upload: upload_start.elapsed(),
            total: loaded.started.elapsed(),
            ..loaded.timings
        };
        info!(elapsed_s = %format!("{:.2}", timings.gpu_upload.as_secs_f64()), "GPU upload");

        self.view.model_installed(&loaded.asset);
        self.tracker.advance(LoadState::Ready);

        let file_name = display_name(&loaded.model_path);
        self.renderer
            .window()
            .set_title(&format!("{} - {}", self.base_title, file_name));

        let mut prefs = Preferences::load();
        prefs.add_recent(&loaded.model_path);
        if let Err(e) = prefs.save() {
            warn!("Could not save recent files: {}", e);
        }

        log_success(&loaded, &timings, self.renderer.has_texture());
    }
}

fn log_success(loaded: &LoadedModel, timings: &LoadTimings, has_texture: bool) {
    info!(
        file_load_s = %format!("{:.2}", timings.file_load.as_secs_f64()),
        processing_s = %format!("{:.2}", timings.processing.as_secs_f64()),
        gpu_upload_s = %format!("{:.2}", timings.gpu_upload.as_secs_f64()),
        "Load timings"
    );
    info!(
        total_s = %format!("{:.2}", timings.total.as_secs_f64()),
        speed_mb_s = %format!("{:.1}", throughput_mb_per_s(loaded.file_size, timings.total)),
        vertices = loaded.asset.vertex_count(),
        faces = loaded.asset.face_count(),
        texture = if has_texture { "Yes" } else { "No" },
        "SUCCESS"
    );
    for line in CONTROLS_HELP {
        info!("{}", line);
    }
}

const CONTROLS_HELP: [&str; 13] = [
    "Controls:",
    "  Left drag:    Rotate",
    "  Right drag:   Pan",
    "  Scroll:       Zoom",
    "  +/- (=/_ ):   Opacity",
    "  1-9:          Opacity presets",
    "  0:            100% opaque",
    "  R:            Reset view",
    "  T:            Toggle texture",
    "  W:            Wireframe",
    "  G:            Grid",
    "  F:            Fullscreen",
    "  ESC:          Exit",
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_texture_toggle_needs_texture() {
        let mut camera = CameraController::default();
        let mut settings = RenderSettings::default();

        apply_command(ViewerCommand::ToggleTexture, &mut camera, &mut settings, false);
        assert!(settings.texture_enabled);

        apply_command(ViewerCommand::ToggleTexture, &mut camera, &mut settings, true);
        assert!(!settings.texture_enabled);
    }

    #[test]
    fn test_commands_update_settings() {
        let mut camera = CameraController::default();
        let mut settings = RenderSettings::default();

        apply_command(ViewerCommand::ToggleWireframe, &mut camera, &mut settings, false);
        apply_command(ViewerCommand::ToggleGrid, &mut camera, &mut settings, false);
        apply_command(ViewerCommand::SetOpacityDigit(3), &mut camera, &mut settings, false);
        assert!(settings.wireframe);
        assert!(!settings.grid_visible);
        assert_eq!(settings.opacity_percent(), 30);

        camera.orbit(40.0, 10.0);
        camera.zoom(2.0);
        let effect = apply_command(ViewerCommand::ResetCamera, &mut camera, &mut settings, false);
        assert_eq!(effect, CommandEffect::None);
        assert_eq!(*camera.state(), Default::default());
    }

    #[test]
    fn test_window_effects() {
        let mut camera = CameraController::default();
        let mut settings = RenderSettings::default();
        assert_eq!(
            apply_command(ViewerCommand::Quit, &mut camera, &mut settings, false),
            CommandEffect::Quit
        );
        assert_eq!(
            apply_command(ViewerCommand::ToggleFullscreen, &mut camera, &mut settings, false),
            CommandEffect::ToggleFullscreen
        );
    }

    #[test]
    fn test_model_arrival_keeps_view() {
        let mut view = ViewState::new(&Config::default());
        view.camera.orbit(40.0, 10.0);
        view.camera.zoom(2.0);
        view.camera.pan(15.0, 0.0);
        view.settings.texture_enabled = false;
        view.settings.step_opacity(-0.2);
        let camera_before = *view.camera.state();
        let settings_before = view.settings;

        let asset = MeshAsset {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            colors: vec![[0.75; 3]; 3],
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        view.model_installed(&asset);

        assert_eq!(*view.camera.state(), camera_before);
        assert_eq!(view.settings, settings_before);
        assert_eq!(view.stats, Some(ModelStats { vertices: 3, faces: 1 }));
    }

    #[test]
    fn test_throughput() {
        let ten_mb = 10 * 1024 * 1024;
        assert_relative_eq!(throughput_mb_per_s(ten_mb, Duration::from_secs(2)), 5.0);
        assert_eq!(throughput_mb_per_s(ten_mb, Duration::ZERO), 0.0);
    }
}
