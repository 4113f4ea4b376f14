//! 查看器状态组件
//!
//! - `camera`：轨道相机状态与操控
//! - `settings`：不透明度、线框、网格、纹理开关

pub mod camera;
pub mod settings;

pub use camera::{CameraController, CameraState};
pub use settings::RenderSettings;
