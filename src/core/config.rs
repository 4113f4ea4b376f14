//! 配置管理模块
//!
//! 提供查看器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 1400
//! height = 900
//! title = "MeshView"
//! resizable = true
//!
//! [graphics]
//! vsync = true
//! msaa_samples = 4
//! fov_degrees = 45.0
//! upload_strategy = "indexed"   # 或 "flattened"
//!
//! [camera]
//! rotate_speed = 0.5
//! pan_speed = 0.01
//! zoom_speed = 0.3
//!
//! [grid]
//! half_lines = 10
//! spacing = 0.5
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cli::ViewerArgs;
use super::error::{ConfigError, Result};

/// 查看器配置
///
/// 所有字段都有默认值，缺失的配置文件等价于默认配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 相机操控配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 地面网格配置
    #[serde(default)]
    pub grid: GridConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// MSAA 采样数（1 或 4）
    #[serde(default = "default_msaa")]
    pub msaa_samples: u32,

    /// 垂直视场角（度）
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,

    /// 近裁剪面
    #[serde(default = "default_near")]
    pub near: f32,

    /// 远裁剪面
    #[serde(default = "default_far")]
    pub far: f32,

    /// 清屏颜色 (RGB)
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 3],

    /// 网格上传策略
    #[serde(default)]
    pub upload_strategy: UploadStrategyConfig,
}

/// 网格上传策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStrategyConfig {
    /// 交错顶点缓冲 + 索引缓冲
    #[default]
    Indexed,
    /// 每个面角一个顶点，非索引绘制
    Flattened,
}

/// 相机操控配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 旋转灵敏度（度/像素）
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,

    /// 平移灵敏度（单位/像素，距离为 5 时）
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f32,

    /// 缩放灵敏度（单位/滚轮格）
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,

    /// 像素滚动量折算为滚轮格时的除数
    #[serde(default = "default_pixels_per_line")]
    pub pixels_per_line: f32,
}

/// 地面网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// 原点一侧的线条数
    #[serde(default = "default_half_lines")]
    pub half_lines: u32,

    /// 线间距
    #[serde(default = "default_spacing")]
    pub spacing: f32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 1400 }
fn default_height() -> u32 { 900 }
fn default_title() -> String { "MeshView".to_string() }
fn default_resizable() -> bool { true }
fn default_vsync() -> bool { true }
fn default_msaa() -> u32 { 4 }
fn default_fov() -> f32 { 45.0 }
fn default_near() -> f32 { 0.1 }
fn default_far() -> f32 { 100.0 }
fn default_clear_color() -> [f32; 3] { [0.1, 0.12, 0.15] }
fn default_rotate_speed() -> f32 { 0.5 }
fn default_pan_speed() -> f32 { 0.01 }
fn default_zoom_speed() -> f32 { 0.3 }
fn default_pixels_per_line() -> f32 { 40.0 }
fn default_half_lines() -> u32 { 10 }
fn default_spacing() -> f32 { 0.5 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "mesh_view.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            msaa_samples: default_msaa(),
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            clear_color: default_clear_color(),
            upload_strategy: UploadStrategyConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotate_speed: default_rotate_speed(),
            pan_speed: default_pan_speed(),
            zoom_speed: default_zoom_speed(),
            pixels_per_line: default_pixels_per_line(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_lines: default_half_lines(),
            spacing: default_spacing(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use mesh_view::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), mesh_view::core::MeshViewError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    ///
    /// 文件存在但解析失败时同样回退到默认配置，并在 stderr 上提示
    /// （此时日志系统尚未初始化）。
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(crate::core::MeshViewError::Config(ConfigError::FileNotFound(_))) => Self::default(),
            Err(e) => {
                eprintln!("{}, falling back to defaults", e);
                Self::default()
            }
        }
    }

    /// 用命令行参数覆盖配置
    pub fn apply_args(&mut self, args: &ViewerArgs) {
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if args.no_vsync {
            self.graphics.vsync = false;
        }
        if let Some(level) = args.log_level {
            self.logging.level = level;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        // 验证窗口尺寸
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        // 验证 MSAA 采样数（wgpu 对多重采样只保证 1 和 4）
        if !matches!(self.graphics.msaa_samples, 1 | 4) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.msaa_samples".to_string(),
                reason: "MSAA samples must be 1 or 4".to_string(),
            }.into());
        }

        if !(self.graphics.fov_degrees > 1.0 && self.graphics.fov_degrees < 179.0) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.fov_degrees".to_string(),
                reason: "Field of view must be between 1 and 179 degrees".to_string(),
            }.into());
        }

        if !(self.graphics.near > 0.0 && self.graphics.far > self.graphics.near) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.near/far".to_string(),
                reason: "Clip planes must satisfy 0 < near < far".to_string(),
            }.into());
        }

        if self.grid.spacing <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "grid.spacing".to_string(),
                reason: "Grid spacing must be positive".to_string(),
            }.into());
        }

        if self.camera.pixels_per_line <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "camera.pixels_per_line".to_string(),
                reason: "Scroll divisor must be positive".to_string(),
            }.into());
        }

        Ok(())
    }
}
