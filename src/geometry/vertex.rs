/// GPU 顶点定义模块
///
/// 渲染器使用的交错顶点结构，包含位置、法线、颜色和UV坐标。

use bytemuck::{Pod, Zeroable};

/// 交错顶点结构
///
/// 内存布局与GPU兼容，使用 `#[repr(C)]` 保证顺序和对齐。
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - normal: 12 bytes (3 * f32)
/// - color: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - **总计**: 44 bytes
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量，归一化
    pub normal: [f32; 3],

    /// 顶点颜色 (r, g, b)，范围 [0, 1]
    pub color: [f32; 3],

    /// 纹理坐标 (u, v)，原点在左上角
    pub texcoord: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            color,
            texcoord,
        }
    }
}

/// 网格线 / 界面条使用的简单顶点：位置 + RGBA 颜色
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    #[inline]
    pub fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_vertex_size() {
        // 3*4 + 3*4 + 3*4 + 2*4 = 44 bytes
        assert_eq!(size_of::<Vertex>(), 44);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn test_color_vertex_size() {
        assert_eq!(size_of::<ColorVertex>(), 28);
    }

    #[test]
    fn test_vertex_bytes() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.75; 3], [0.5, 0.25]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 44);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats[9], 0.5);
        assert_eq!(floats[10], 0.25);
    }
}
