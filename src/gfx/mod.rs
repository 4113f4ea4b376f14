//! 图形后端模块
//!
//! 所有 GPU 相关代码都基于 wgpu（可运行在 Vulkan、Metal、DirectX 12、OpenGL 上）。

pub mod wgpu;

pub use self::wgpu::{FrameInput, Renderer};
