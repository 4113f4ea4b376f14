//! 纹理加载与自动查找
//!
//! 纹理在工作线程中解码为 RGBA8，渲染线程只负责上传。
//! 纹理失败永远不是致命错误：调用方记录警告后按无纹理继续。

use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::error::{MeshViewError, Result};
use crate::geometry::format::is_texture_path;

/// 解码后的 RGBA8 图片
#[derive(Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// 行优先，首行为图片顶部
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl TextureImage {
    /// 1x1 白色纹理，无纹理时绑定到纹理槽
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }
}

/// 解码纹理文件
///
/// 任一边超过 `max_dimension` 时按比例缩小。
pub fn load_texture(path: &Path, max_dimension: u32) -> Result<TextureImage> {
    let texture_error = |reason: String| MeshViewError::TextureLoad {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(texture_error("file not found".to_string()));
    }
    if !is_texture_path(path) {
        return Err(texture_error("unsupported texture format".to_string()));
    }

    let mut img = image::open(path).map_err(|e| texture_error(e.to_string()))?;

    if img.width() > max_dimension || img.height() > max_dimension {
        info!(
            width = img.width(),
            height = img.height(),
            max_dimension,
            "Texture exceeds device limit, downscaling"
        );
        img = img.resize(max_dimension, max_dimension, FilterType::Triangle);
    }

    let rgba = img.to_rgba8();
    Ok(TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// 按优先级列出模型目录中的候选纹理
///
/// 顺序：`<模型名>.*`、`texture.*`、`diffuse.*`、`*.png`、`*.jpg`、`*.jpeg`。
/// 每一组内部按文件名排序，模型文件本身永远不会入选。
pub fn texture_candidates(model_path: &Path) -> Vec<PathBuf> {
    let dir = match model_path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let model_stem = model_path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let model_name = model_path.file_name();

    let rank = |p: &Path| -> Option<usize> {
        let stem = p.file_stem().and_then(|s| s.to_str())?;
        let ext = p.extension().and_then(|s| s.to_str())?.to_ascii_lowercase();
        if stem == model_stem {
            Some(0)
        } else if stem == "texture" {
            Some(1)
        } else if stem == "diffuse" {
            Some(2)
        } else {
            match ext.as_str() {
                "png" => Some(3),
                "jpg" => Some(4),
                "jpeg" => Some(5),
                _ => None,
            }
        }
    };

    let mut ranked: Vec<(usize, PathBuf)> = match std::fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.file_name() != model_name && is_texture_path(p))
            .filter_map(|p| rank(&p).map(|r| (r, p)))
            .collect(),
        Err(_) => return Vec::new(),
    };
    ranked.sort();
    ranked.into_iter().map(|(_, p)| p).collect()
}

/// 自动查找纹理：返回第一个能成功解码的候选
pub fn find_texture(model_path: &Path, max_dimension: u32) -> Option<(PathBuf, TextureImage)> {
    for candidate in texture_candidates(model_path) {
        match load_texture(&candidate, max_dimension) {
            Ok(image) => return Some((candidate, image)),
            Err(e) => debug!("Skipping texture candidate: {}", e),
        }
    }
    None
}
