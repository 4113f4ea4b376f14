//! GUI 面板模块
//!
//! - `stats`：就绪后叠加在背景条上的状态文字与 FPS
//! - `status`：加载界面与错误面板

pub mod stats;
pub mod status;

use crate::core::runtime::LoadSnapshot;
use crate::renderer::overlay::OverlayStats;

/// 本帧 GUI 要显示的内容
#[derive(Debug, Clone)]
pub enum GuiContent {
    Loading(LoadSnapshot),
    Error { file_name: String, message: String },
    Ready(OverlayStats),
}

/// 物理像素转换为 egui 逻辑点
pub(crate) fn px(ctx: &egui::Context, pixels: f32) -> f32 {
    pixels / ctx.pixels_per_point()
}
