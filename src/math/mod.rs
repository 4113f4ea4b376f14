//! 数学库模块
//!
//! 基于 `nalgebra` 提供查看器用到的类型别名、常量和矩阵辅助函数。
//!
//! # 模块组织
//!
//! - **基础类型**：Vector3/4, Matrix4
//! - **常量**：PI, DEG_TO_RAD 等
//! - **工具函数**：clamp, deg_to_rad 等
//! - **矩阵辅助函数**：平移、旋转、投影（已换算到 wgpu 裁剪空间）
//! - **几何处理**：数组形式的向量运算与法线重建（见 geometry 子模块）

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 数学常量
pub mod constants {
    /// π
    pub const PI: f32 = std::f32::consts::PI;

    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// 浮点数比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 数学工具函数
pub mod utils {
    use super::constants;

    /// 限制值在范围内
    pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// 角度转弧度
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// 检查两个浮点数是否近似相等
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// OpenGL 风格 NDC（z ∈ [-1, 1]）到 wgpu NDC（z ∈ [0, 1]）的修正矩阵
    #[rustfmt::skip]
    pub fn opengl_to_wgpu() -> Matrix4 {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建绕 X 轴旋转的矩阵（弧度）
    pub fn rotation_x(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::x_axis(), angle)
    }

    /// 创建绕 Y 轴旋转的矩阵（弧度）
    pub fn rotation_y(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// 创建透视投影矩阵（wgpu 裁剪空间）
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        opengl_to_wgpu() * Matrix4::new_perspective(aspect, fov_y, near, far)
    }

    /// 创建正交投影矩阵（wgpu 裁剪空间）
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Matrix4 {
        opengl_to_wgpu() * Matrix4::new_orthographic(left, right, bottom, top, near, far)
    }
}

// 几何处理模块（数组向量运算、法线重建）
pub mod geometry;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_translation() {
        let mat = matrix::translation(1.0, 2.0, 3.0);
        let result = mat * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert_relative_eq!(result.x, 1.0);
        assert_relative_eq!(result.y, 2.0);
        assert_relative_eq!(result.z, 3.0);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = matrix::perspective(utils::deg_to_rad(45.0), 1.5, 0.1, 100.0);

        let near = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_maps_screen_corners() {
        // 像素坐标系：左上角 (0,0)，右下角 (w,h)
        let proj = matrix::orthographic(0.0, 800.0, 600.0, 0.0, -1.0, 1.0);
        let top_left = proj * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = proj * Vector4::new(800.0, 600.0, 0.0, 1.0);

        assert_relative_eq!(top_left.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(top_left.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(bottom_right.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(bottom_right.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(top_left.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(utils::clamp(60.0, 1.0, 50.0), 50.0);
        assert_eq!(utils::clamp(0.5, 1.0, 50.0), 1.0);
        assert_eq!(utils::clamp(7, 1, 50), 7);
    }
}
