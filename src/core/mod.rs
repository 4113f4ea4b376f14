//! 核心功能模块
//!
//! 与具体图形 API 无关的基础设施：配置、命令行、日志、错误处理、
//! 输入映射、最近文件列表，以及后台加载的状态机。
//!
//! # 模块组织
//!
//! - `config`：配置管理，支持从 config.toml 加载并由命令行覆盖
//! - `cli`：查看器与转换器的命令行参数
//! - `log`：基于 tracing 的日志初始化
//! - `error`：统一的错误类型
//! - `input`：窗口事件到相机操作与查看器命令的映射
//! - `prefs`：最近打开的文件
//! - `runtime`：加载状态机与后台加载线程

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod prefs;
pub mod runtime;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use error::{MeshViewError, Result};
