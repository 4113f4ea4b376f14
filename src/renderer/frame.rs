//! 每帧的 Uniform 数据
//!
//! 结构体布局与 `shaders/*.wgsl` 中的声明一一对应，使用 `#[repr(C)]`。

use bytemuck::{Pod, Zeroable};

use crate::component::camera::CameraState;
use crate::component::settings::RenderSettings;
use crate::core::config::GraphicsConfig;
use crate::math::{matrix, utils, Matrix4};

/// 点光源位置
pub const LIGHT_POSITION: [f32; 3] = [5.0, 5.0, 5.0];

/// 网格着色器的 Uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    pub view_pos: [f32; 4],
    /// x: 不透明度，y: 是否采样纹理（0 / 1）
    pub params: [f32; 4],
}

/// 网格线与界面条共用的 Uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LineUniforms {
    pub mvp: [[f32; 4]; 4],
}

impl LineUniforms {
    pub fn new(mvp: &Matrix4) -> Self {
        Self { mvp: *mvp.as_ref() }
    }
}

/// 一帧的变换矩阵
#[derive(Debug, Clone, Copy)]
pub struct FrameTransforms {
    pub model: Matrix4,
    pub view: Matrix4,
    pub projection: Matrix4,
}

impl FrameTransforms {
    /// `rotation_offset` 为模型绕 Y 轴的附加旋转（度）
    pub fn new(
        camera: &CameraState,
        graphics: &GraphicsConfig,
        width: u32,
        height: u32,
        rotation_offset: f32,
    ) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self {
            model: matrix::rotation_y(utils::deg_to_rad(rotation_offset)),
            view: camera.view_matrix(),
            projection: matrix::perspective(
                utils::deg_to_rad(graphics.fov_degrees),
                aspect,
                graphics.near,
                graphics.far,
            ),
        }
    }

    pub fn mesh_uniforms(&self, camera: &CameraState, settings: &RenderSettings, use_texture: bool) -> MeshUniforms {
        let eye = camera.eye_position();
        MeshUniforms {
            model: *self.model.as_ref(),
            view: *self.view.as_ref(),
            projection: *self.projection.as_ref(),
            light_pos: [LIGHT_POSITION[0], LIGHT_POSITION[1], LIGHT_POSITION[2], 1.0],
            view_pos: [eye.x, eye.y, eye.z, 1.0],
            params: [settings.opacity(), if use_texture { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }

    /// 网格线不受模型旋转影响
    pub fn grid_uniforms(&self) -> LineUniforms {
        LineUniforms::new(&(self.projection * self.view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector4;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 240);
        assert_eq!(std::mem::size_of::<LineUniforms>(), 64);
    }

    #[test]
    fn test_origin_projects_inside_depth_range() {
        let camera = CameraState::default();
        let frame = FrameTransforms::new(&camera, &GraphicsConfig::default(), 1400, 900, 0.0);
        let clip = frame.projection * frame.view * frame.model * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(ndc_z > 0.0 && ndc_z < 1.0, "depth {}", ndc_z);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_offset_only_moves_model() {
        let camera = CameraState::default();
        let graphics = GraphicsConfig::default();
        let a = FrameTransforms::new(&camera, &graphics, 800, 600, 0.0);
        let b = FrameTransforms::new(&camera, &graphics, 800, 600, 90.0);
        assert_eq!(a.view, b.view);
        let x = b.model * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(x.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mesh_uniform_params() {
        let camera = CameraState::default();
        let mut settings = RenderSettings::default();
        settings.set_opacity(0.4);
        let frame = FrameTransforms::new(&camera, &GraphicsConfig::default(), 800, 600, 0.0);
        let uniforms = frame.mesh_uniforms(&camera, &settings, true);
        assert_relative_eq!(uniforms.params[0], 0.4);
        assert_eq!(uniforms.params[1], 1.0);
        assert_eq!(uniforms.view_pos, [0.0, 0.0, 5.0, 1.0]);
    }
}
