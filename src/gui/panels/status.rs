//! 加载界面与错误面板

use crate::core::log::megabytes;
use crate::core::runtime::LoadSnapshot;

/// 加载中：标题、当前阶段、文件大小
pub fn render_loading(ctx: &egui::Context, snapshot: &LoadSnapshot) {
    let center = ctx.screen_rect().center();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("loading_text"),
    ));

    painter.text(
        center + egui::vec2(0.0, -80.0),
        egui::Align2::CENTER_CENTER,
        "Loading 3D Model",
        egui::FontId::monospace(26.0),
        egui::Color32::WHITE,
    );
    painter.text(
        center,
        egui::Align2::CENTER_CENTER,
        snapshot.state.label(),
        egui::FontId::monospace(18.0),
        egui::Color32::from_rgb(220, 220, 220),
    );
    if snapshot.file_size > 0 {
        painter.text(
            center + egui::vec2(0.0, 80.0),
            egui::Align2::CENTER_CENTER,
            format!(
                "{} - {:.1} MB - Please wait...",
                snapshot.file_name,
                megabytes(snapshot.file_size)
            ),
            egui::FontId::monospace(14.0),
            egui::Color32::from_rgb(180, 180, 180),
        );
    }
}

/// 加载失败：居中的错误面板，直到下一次加载
pub fn render_error(ctx: &egui::Context, file_name: &str, message: &str) {
    egui::Window::new("Error loading model")
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .default_width(600.0)
        .show(ctx, |ui| {
            if !file_name.is_empty() {
                ui.label(egui::RichText::new(file_name).monospace());
                ui.separator();
            }
            ui.label(
                egui::RichText::new(message)
                    .monospace()
                    .size(16.0)
                    .color(egui::Color32::from_rgb(255, 150, 150)),
            );
        });
}
