//! 错误处理模块
//!
//! 定义了查看器与转换器中使用的统一错误类型。
//!
//! # 错误分类
//!
//! - 配置错误：配置文件解析失败、配置值无效
//! - 网格加载错误：文件不存在、格式不支持、解析失败、几何无效
//! - 纹理错误：可恢复，降级为无纹理渲染
//! - 图形错误：设备创建、交换链、GPU 上传
//! - 转换错误：输入不可读、输出不可写、导出失败

use std::fmt;
use std::path::PathBuf;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, MeshViewError>;

/// MeshView 的错误类型
#[derive(Debug)]
pub enum MeshViewError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 网格加载错误
    MeshLoading(MeshLoadError),

    /// 纹理加载错误（非致命）
    TextureLoad { path: PathBuf, reason: String },

    /// 几何退化（所有顶点重合等），处理继续但不缩放
    GeometryDegenerate(String),

    /// 格式转换错误
    Conversion(ConversionError),

    /// 已有加载任务在进行中
    LoadInFlight,

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 设备创建失败
    DeviceCreation(String),

    /// 交换链错误
    SwapchainError(String),

    /// 网格或纹理上传失败（超出设备限制等）
    GpuUpload(String),
}

/// 网格加载相关的错误
#[derive(Debug)]
pub enum MeshLoadError {
    /// 文件不存在
    FileNotFound(PathBuf),

    /// 不支持的文件格式
    UnsupportedFormat(String),

    /// 解析失败
    ParseError(String),

    /// 几何数据无效
    InvalidGeometry(String),
}

/// 格式转换相关的错误
#[derive(Debug)]
pub enum ConversionError {
    /// 输入文件不可读或不是 OBJ
    InputUnreadable(String),

    /// 输出路径不可写
    OutputUnwritable(String),

    /// GLB 序列化失败
    Export(String),

    /// 已有转换任务在进行中
    Busy,
}

impl fmt::Display for MeshViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshViewError::Config(e) => write!(f, "Configuration error: {}", e),
            MeshViewError::Graphics(e) => write!(f, "Graphics error: {}", e),
            MeshViewError::MeshLoading(e) => write!(f, "Mesh loading error: {}", e),
            MeshViewError::TextureLoad { path, reason } => {
                write!(f, "Texture load error ({}): {}", path.display(), reason)
            }
            MeshViewError::GeometryDegenerate(msg) => write!(f, "Degenerate geometry: {}", msg),
            MeshViewError::Conversion(e) => write!(f, "Conversion error: {}", e),
            MeshViewError::LoadInFlight => write!(f, "A model load is already in progress"),
            MeshViewError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SwapchainError(msg) => write!(f, "Swapchain error: {}", msg),
            GraphicsError::GpuUpload(msg) => write!(f, "GPU upload failed: {}", msg),
        }
    }
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLoadError::FileNotFound(path) => write!(f, "Mesh file not found: {}", path.display()),
            MeshLoadError::UnsupportedFormat(msg) => write!(f, "Unsupported mesh format: {}", msg),
            MeshLoadError::ParseError(msg) => write!(f, "Failed to parse mesh: {}", msg),
            MeshLoadError::InvalidGeometry(msg) => write!(f, "Invalid geometry data: {}", msg),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InputUnreadable(msg) => write!(f, "Input unreadable: {}", msg),
            ConversionError::OutputUnwritable(msg) => write!(f, "Output unwritable: {}", msg),
            ConversionError::Export(msg) => write!(f, "GLB export failed: {}", msg),
            ConversionError::Busy => write!(f, "A conversion is already in progress"),
        }
    }
}

impl std::error::Error for MeshViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshViewError::Io(e) => Some(e),
            MeshViewError::Config(e) => Some(e),
            MeshViewError::Graphics(e) => Some(e),
            MeshViewError::MeshLoading(e) => Some(e),
            MeshViewError::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}
impl std::error::Error for MeshLoadError {}
impl std::error::Error for ConversionError {}

// From 转换，配合 `?` 使用
impl From<std::io::Error> for MeshViewError {
    fn from(err: std::io::Error) -> Self {
        MeshViewError::Io(err)
    }
}

impl From<ConfigError> for MeshViewError {
    fn from(err: ConfigError) -> Self {
        MeshViewError::Config(err)
    }
}

impl From<GraphicsError> for MeshViewError {
    fn from(err: GraphicsError) -> Self {
        MeshViewError::Graphics(err)
    }
}

impl From<MeshLoadError> for MeshViewError {
    fn from(err: MeshLoadError) -> Self {
        MeshViewError::MeshLoading(err)
    }
}

impl From<ConversionError> for MeshViewError {
    fn from(err: ConversionError) -> Self {
        MeshViewError::Conversion(err)
    }
}
