//! 地面网格
//!
//! XZ 平面上的线段列表，经过原点的两条线更亮。

use crate::core::config::GridConfig;
use crate::geometry::vertex::ColorVertex;

/// 过原点的线的灰度
pub const CENTER_LINE_SHADE: f32 = 0.5;
/// 其他线的灰度
pub const LINE_SHADE: f32 = 0.3;

/// 生成网格线顶点（LineList，每条线 2 个顶点）
///
/// 每个方向 `2 * half_lines + 1` 条线，半宽 `half_lines * spacing`。
pub fn grid_vertices(config: &GridConfig) -> Vec<ColorVertex> {
    let half = config.half_lines as i32;
    let extent = half as f32 * config.spacing;
    let mut vertices = Vec::with_capacity((2 * half as usize + 1) * 4);

    for i in -half..=half {
        let offset = i as f32 * config.spacing;
        let shade = if i == 0 { CENTER_LINE_SHADE } else { LINE_SHADE };
        let color = [shade, shade, shade, 1.0];

        // 平行于 Z 轴
        vertices.push(ColorVertex::new([offset, 0.0, -extent], color));
        vertices.push(ColorVertex::new([offset, 0.0, extent], color));
        // 平行于 X 轴
        vertices.push(ColorVertex::new([-extent, 0.0, offset], color));
        vertices.push(ColorVertex::new([extent, 0.0, offset], color));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let vertices = grid_vertices(&GridConfig::default());
        // 21 + 21 条线
        assert_eq!(vertices.len(), 42 * 2);
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(vertices.iter().all(|v| v.position[0].abs() <= 5.0 && v.position[2].abs() <= 5.0));

        let bright = vertices.iter().filter(|v| v.color[0] == CENTER_LINE_SHADE).count();
        assert_eq!(bright, 4);
        let dim = vertices.iter().filter(|v| v.color[0] == LINE_SHADE).count();
        assert_eq!(dim, 80);
    }

    #[test]
    fn test_zero_half_lines() {
        let config = GridConfig {
            half_lines: 0,
            spacing: 1.0,
        };
        let vertices = grid_vertices(&config);
        assert_eq!(vertices.len(), 4);
        assert!(vertices.iter().all(|v| v.color[0] == CENTER_LINE_SHADE));
    }
}
