//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//! 默认输出到 stdout（逐行刷新），外部控制面板可以直接读取进度行。
//!
//! # 使用示例
//!
//! ```no_run
//! use mesh_view::core::log;
//! use mesh_view::core::config::LogLevel;
//!
//! log::init_logger(LogLevel::Info, false, None);
//!
//! tracing::info!(file = "bunny.obj", size_mb = 12.5, "Loading geometry");
//! ```

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::path::Path;

use super::config::LogLevel;

/// 初始化日志系统
///
/// 必须在程序开始时调用一次。`RUST_LOG` 环境变量存在时优先生效。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否同时输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "mesh_view.log"）
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    // 控制台层：只打印消息与字段，便于逐行解析
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .with_writer(std::io::stdout);

    if file_output {
        let log_path = log_file_path.unwrap_or("mesh_view.log");
        let path = Path::new(log_path);
        let directory = path.parent().unwrap_or(Path::new("."));
        let filename = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("mesh_view.log");

        // 创建滚动文件 appender（每天滚动）
        let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(file_appender);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init();
    }
}

impl LogLevel {
    /// EnvFilter 指令字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info,wgpu_core=warn,wgpu_hal=warn,naga=warn",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 日志级别转换
impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 字节数转 MB
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }

    #[test]
    fn test_info_filter_quiets_wgpu() {
        assert!(LogLevel::Info.as_filter().starts_with("info"));
        assert!(LogLevel::Info.as_filter().contains("wgpu_core=warn"));
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(megabytes(1024 * 1024), 1.0);
        assert_eq!(megabytes(0), 0.0);
    }
}
