//! 命令行参数定义
//!
//! 查看器与转换器各有一个参数结构，使用 clap derive。

use clap::Parser;
use std::path::PathBuf;

use super::config::LogLevel;

/// 查看器命令行
#[derive(Parser, Debug, Clone)]
#[command(name = "mesh_view", version)]
#[command(about = "Interactive viewer for OBJ, GLB and GLTF meshes")]
pub struct ViewerArgs {
    /// Model file (.glb, .gltf, .obj). Auto-discovered in the working directory when omitted
    pub model: Option<PathBuf>,

    /// Texture image (.png, .jpg, .jpeg, .webp, .bmp, .tga)
    pub texture: Option<PathBuf>,

    /// Model rotation around the Y axis in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotation_offset: f32,

    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Window width override
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height override
    #[arg(long)]
    pub height: Option<u32>,

    /// Disable vertical sync
    #[arg(long)]
    pub no_vsync: bool,

    /// Log level override
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// 转换器命令行
#[derive(Parser, Debug, Clone)]
#[command(name = "mesh_convert", version)]
#[command(about = "Convert an OBJ mesh into a binary glTF (GLB) file")]
pub struct ConvertArgs {
    /// Input OBJ file
    pub input: PathBuf,

    /// Output GLB file (defaults to the input path with a .glb extension)
    pub output: Option<PathBuf>,

    /// Log level override
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl ConvertArgs {
    /// 输出路径，未指定时与输入同名、扩展名为 .glb
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("glb"))
    }
}
