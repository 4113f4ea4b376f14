//! 渲染器模块
//!
//! 与具体图形 API 无关的渲染数据：绘制状态描述、网格线与叠加层几何、
//! 每帧 Uniform。GPU 资源与绘制命令在 `gfx::wgpu` 中实现。
//!
//! # 模块组织
//!
//! - `render_state`：由渲染设置推导出的 [`MeshRenderState`]
//! - `grid`：地面网格线
//! - `overlay`：背景条与状态文字
//! - `frame`：变换矩阵与 Uniform 布局

pub mod frame;
pub mod grid;
pub mod overlay;
pub mod render_state;

pub use frame::{FrameTransforms, LineUniforms, MeshUniforms};
pub use render_state::{MeshRenderState, WireframeMode};
