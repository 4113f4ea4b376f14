//! MeshView - 3D 模型查看器
//!
//! 基于 wgpu 的 OBJ / GLB / GLTF 查看器，附带 OBJ → GLB 转换器。
//! 模型在后台线程中加载和处理，渲染线程每帧拉取进度，完成后一次性上传到 GPU。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（配置、命令行、日志、错误处理、输入、加载状态）
//! - `math`: 数学类型与几何辅助函数
//! - `geometry`: 模型加载与处理（顶点、网格、OBJ/GLTF 加载器、纹理）
//! - `component`: 轨道相机与渲染设置
//! - `renderer`: 与图形 API 无关的绘制数据（绘制状态、网格线、叠加层、Uniform）
//! - `gfx`: wgpu 设备、管线与逐帧绘制
//! - `gui`: egui 状态文字、加载界面与错误面板
//! - `convert`: OBJ → GLB 转换服务
//! - `viewer`: 把以上模块串起来的应用状态
//!
//! # 使用示例
//!
//! ```no_run
//! use mesh_view::convert::ConverterService;
//! use std::path::Path;
//!
//! let report = ConverterService::convert(
//!     Path::new("scan.obj"),
//!     Path::new("scan.glb"),
//!     &mut |stage| println!("{} ({:.0}%)", stage.label(), stage.fraction() * 100.0),
//! )?;
//! println!("{}", report);
//! # Ok::<(), mesh_view::core::MeshViewError>(())
//! ```

pub mod component;
pub mod convert;
pub mod core;
pub mod geometry;
pub mod gfx;
pub mod gui;
pub mod math;
pub mod renderer;
pub mod viewer;
