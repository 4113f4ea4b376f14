//! 2D 叠加层：顶部/底部半透明背景条与状态文字
//!
//! 背景条在像素坐标中生成（原点左下角），配合
//! `orthographic(0, w, 0, h, -1, 1)` 绘制。

use crate::geometry::vertex::ColorVertex;
use crate::math::{matrix, Matrix4};

/// 顶部条高度（像素）
pub const TOP_BAR_HEIGHT: f32 = 60.0;
/// 底部条高度（像素）
pub const BOTTOM_BAR_HEIGHT: f32 = 55.0;
/// 背景条颜色
pub const BAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.75];

/// 底部的操作提示
pub const CONTROLS_LINE: &str =
    "LMB: Rotate | RMB: Pan | Scroll: Zoom | +/-: Opacity | 1-9: Presets | 0: 100% | R: Reset | T: Tex | W: Wire | G: Grid";

/// 像素坐标的正交投影
pub fn overlay_projection(width: u32, height: u32) -> Matrix4 {
    matrix::orthographic(0.0, width.max(1) as f32, 0.0, height.max(1) as f32, -1.0, 1.0)
}

/// 两个背景条的三角形顶点（12 个）
pub fn bar_vertices(width: u32, height: u32) -> Vec<ColorVertex> {
    let w = width as f32;
    let h = height as f32;
    let top = (h - TOP_BAR_HEIGHT).max(0.0);
    let bottom = BOTTOM_BAR_HEIGHT.min(h);

    let mut vertices = Vec::with_capacity(12);
    push_rect(&mut vertices, 0.0, top, w, h);
    push_rect(&mut vertices, 0.0, 0.0, w, bottom);
    vertices
}

fn push_rect(out: &mut Vec<ColorVertex>, x0: f32, y0: f32, x1: f32, y1: f32) {
    let corner = |x, y| ColorVertex::new([x, y, 0.0], BAR_COLOR);
    out.extend_from_slice(&[
        corner(x0, y0),
        corner(x1, y0),
        corner(x1, y1),
        corner(x0, y0),
        corner(x1, y1),
        corner(x0, y1),
    ]);
}

/// 顶部状态行需要的数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStats {
    pub vertices: usize,
    pub faces: usize,
    /// 相机距离，按原样显示为 "Zoom"
    pub distance: f32,
    pub opacity_percent: u32,
    pub texture_on: bool,
    pub wireframe: bool,
    pub grid: bool,
}

impl OverlayStats {
    pub fn stats_line(&self) -> String {
        format!(
            "Vertices: {} | Faces: {} | Zoom: {:.1}x | Opacity: {}% | Texture: {} | Wire: {} | Grid: {}",
            group_thousands(self.vertices),
            group_thousands(self.faces),
            self.distance,
            self.opacity_percent,
            on_off(self.texture_on),
            on_off(self.wireframe),
            on_off(self.grid)
        )
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// 千分位分隔：1234567 -> "1,234,567"
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
