//! GUI 系统模块
//!
//! 基于 egui + wgpu 绘制状态文字、加载界面与错误面板。

mod manager;
mod metrics;
pub mod panels;

pub use manager::GuiManager;
pub use metrics::PerformanceMetrics;
pub use panels::GuiContent;
