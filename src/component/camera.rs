//! 轨道相机
//!
//! 相机状态只有旋转、平移和距离五个量，所有修改都是纯函数式的状态更新，
//! 由输入层在事件回调中同步调用。

use crate::core::config::CameraConfig;
use crate::math::{matrix, utils, Matrix4, Vector3};

/// 距离下限
pub const MIN_DISTANCE: f32 = 1.0;
/// 距离上限
pub const MAX_DISTANCE: f32 = 50.0;

/// 相机状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// 绕 X 轴旋转（度）
    pub rot_x: f32,
    /// 绕 Y 轴旋转（度）
    pub rot_y: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    /// 到观察中心的距离，范围 [1, 50]
    pub distance: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rot_x: 20.0,
            rot_y: 30.0,
            pan_x: 0.0,
            pan_y: 0.0,
            distance: 5.0,
        }
    }
}

impl CameraState {
    /// 视图矩阵：T(pan_x, pan_y, -distance) · Rx(rot_x) · Ry(rot_y)
    pub fn view_matrix(&self) -> Matrix4 {
        matrix::translation(self.pan_x, self.pan_y, -self.distance)
            * matrix::rotation_x(utils::deg_to_rad(self.rot_x))
            * matrix::rotation_y(utils::deg_to_rad(self.rot_y))
    }

    /// 高光计算使用的观察点
    pub fn eye_position(&self) -> Vector3 {
        Vector3::new(self.pan_x, self.pan_y, self.distance)
    }
}

/// 相机控制器
///
/// 持有相机状态与灵敏度参数。指针增量约定为 y 轴向上。
#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            state: CameraState::default(),
            rotate_speed: config.rotate_speed,
            pan_speed: config.pan_speed,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    // ========== 状态更新 ==========

    /// 主键拖动：旋转
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.state.rot_y += dx * self.rotate_speed;
        self.state.rot_x += dy * self.rotate_speed;
    }

    /// 副键拖动：平移，速度随距离缩放
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let scale = self.pan_speed * (self.state.distance / 5.0);
        self.state.pan_x += dx * scale;
        self.state.pan_y += dy * scale;
    }

    /// 滚轮缩放（单位：行）
    pub fn zoom(&mut self, scroll_y: f32) {
        if !scroll_y.is_finite() {
            return;
        }
        self.state.distance = utils::clamp(
            self.state.distance - scroll_y * self.zoom_speed,
            MIN_DISTANCE,
            MAX_DISTANCE,
        );
    }

    /// 恢复默认视角
    pub fn reset(&mut self) {
        self.state = CameraState::default();
    }
}
