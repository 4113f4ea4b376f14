//! 状态文字面板
//!
//! 文字直接画在前景层上，位置与背景条对齐（单位为物理像素，绘制前换算）。

use crate::renderer::overlay::{OverlayStats, CONTROLS_LINE};

use super::px;

const STATS_COLOR: egui::Color32 = egui::Color32::from_rgb(240, 240, 240);
const CONTROLS_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 220, 220);

/// 绘制顶部状态行、右上角 FPS 与底部操作提示
pub fn render(ctx: &egui::Context, stats: &OverlayStats, fps: f32) {
    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("overlay_text"),
    ));

    let left = px(ctx, 25.0);
    painter.text(
        egui::pos2(left, px(ctx, 35.0)),
        egui::Align2::LEFT_CENTER,
        stats.stats_line(),
        egui::FontId::monospace(14.0),
        STATS_COLOR,
    );
    painter.text(
        egui::pos2(screen.right() - left, px(ctx, 35.0)),
        egui::Align2::RIGHT_CENTER,
        format!("FPS: {:.0}", fps),
        egui::FontId::monospace(14.0),
        STATS_COLOR,
    );
    painter.text(
        egui::pos2(left, screen.bottom() - px(ctx, 27.0)),
        egui::Align2::LEFT_CENTER,
        CONTROLS_LINE,
        egui::FontId::monospace(12.0),
        CONTROLS_COLOR,
    );
}
