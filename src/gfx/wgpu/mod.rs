//! wgpu 图形后端实现
//!
//! # 模块结构
//!
//! - `backend` - WgpuBackend 结构（窗口、设备、交换链）
//! - `pipelines` - 网格管线缓存与顶点色管线
//! - `upload` - 网格与纹理的 GPU 上传
//! - `renderer` - Renderer 结构（逐帧绘制）

pub mod backend;
pub mod pipelines;
pub mod upload;
mod renderer;

pub use backend::WgpuBackend;
pub use renderer::{FrameInput, Renderer};
