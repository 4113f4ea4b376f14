//! 模型加载流水线（在工作线程中运行）
//!
//! 纹理 → 几何 → 处理，每进入一个阶段通过回调汇报一次。
//! 只产出 CPU 数据，GPU 上传由渲染线程完成。

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::error::{MeshLoadError, Result};
use crate::core::log::megabytes;
use crate::core::runtime::LoadState;

use super::format::ModelFormat;
use super::loaders::load_mesh_as;
use super::mesh::MeshAsset;
use super::processor;
use super::texture::{find_texture, load_texture, TextureImage};

/// 一次加载请求
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model_path: PathBuf,
    /// 显式指定的纹理；为 None 时自动查找
    pub texture_path: Option<PathBuf>,
    /// 设备支持的最大纹理边长
    pub max_texture_dimension: u32,
}

impl ModelRequest {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            texture_path: None,
            max_texture_dimension: 8192,
        }
    }

    pub fn with_texture(mut self, texture_path: Option<PathBuf>) -> Self {
        self.texture_path = texture_path;
        self
    }

    /// 显示用文件名
    pub fn file_name(&self) -> String {
        display_name(&self.model_path)
    }
}

/// 各阶段耗时
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadTimings {
    pub file_load: Duration,
    pub processing: Duration,
    pub gpu_upload: Duration,
    pub total: Duration,
}

/// 工作线程的产出
#[derive(Debug)]
pub struct LoadedModel {
    pub model_path: PathBuf,
    pub format: ModelFormat,
    pub file_size: u64,
    pub asset: MeshAsset,
    pub texture: Option<(PathBuf, TextureImage)>,
    pub timings: LoadTimings,
    /// 计时起点，渲染线程上传完成后据此计算总耗时
    pub started: Instant,
}

/// 执行加载
///
/// `progress` 在进入每个阶段时被调用一次，顺序单调。
pub fn load_model(request: &ModelRequest, progress: &mut dyn FnMut(LoadState)) -> Result<LoadedModel> {
    let started = Instant::now();
    let path = request.model_path.as_path();

    if !path.is_file() {
        return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
    }
    let format = ModelFormat::from_path(path)?;
    let file_size = std::fs::metadata(path)?.len();

    info!(
        file = %display_name(path),
        format = %format,
        size_mb = %format!("{:.1}", megabytes(file_size)),
        "Loading model"
    );

    // 纹理
    progress(LoadState::LoadingTexture);
    let texture = resolve_texture(request);

    // 几何
    progress(LoadState::LoadingGeometry);
    let geometry_start = Instant::now();
    let raw = load_mesh_as(path, format)?;
    let file_load = geometry_start.elapsed();
    info!(
        elapsed_s = %format!("{:.2}", file_load.as_secs_f64()),
        vertices = raw.vertex_count(),
        faces = raw.face_count(),
        objects = raw.object_count,
        "File loaded"
    );
    if raw.object_count > 1 {
        info!(objects = raw.object_count, "Scene merged into a single mesh");
    }

    // 处理
    progress(LoadState::Processing);
    let processing_start = Instant::now();
    let asset = processor::process(raw);
    let processing = processing_start.elapsed();
    if asset.has_uvs {
        info!("UV mapping found");
    } else {
        info!("No UV coordinates");
    }
    info!(elapsed_s = %format!("{:.2}", processing.as_secs_f64()), "Processed");

    Ok(LoadedModel {
        model_path: path.to_path_buf(),
        format,
        file_size,
        asset,
        texture,
        timings: LoadTimings {
            file_load,
            processing,
            ..Default::default()
        },
        started,
    })
}

fn resolve_texture(request: &ModelRequest) -> Option<(PathBuf, TextureImage)> {
    match &request.texture_path {
        Some(explicit) => match load_texture(explicit, request.max_texture_dimension) {
            Ok(image) => {
                info!(texture = %display_name(explicit), width = image.width, height = image.height, "Texture loaded");
                Some((explicit.clone(), image))
            }
            Err(e) => {
                warn!("{}, continuing without texture", e);
                None
            }
        },
        None => {
            let found = find_texture(&request.model_path, request.max_texture_dimension);
            match &found {
                Some((path, image)) => info!(
                    texture = %display_name(path),
                    width = image.width,
                    height = image.height,
                    "Texture auto-detected"
                ),
                None => info!("No texture found"),
            }
            found
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MeshViewError;
    use std::fs;

    #[test]
    fn test_stage_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut stages = Vec::new();
        let loaded = load_model(&ModelRequest::new(&path), &mut |s| stages.push(s)).unwrap();
        assert_eq!(
            stages,
            vec![LoadState::LoadingTexture, LoadState::LoadingGeometry, LoadState::Processing]
        );
        assert_eq!(loaded.asset.face_count(), 1);
        assert_eq!(loaded.format, ModelFormat::Obj);
        assert!(loaded.texture.is_none());
    }

    #[test]
    fn test_missing_model_reports_no_stages() {
        let mut stages = Vec::new();
        let err = load_model(&ModelRequest::new("missing/thing.obj"), &mut |s| stages.push(s)).unwrap_err();
        assert!(stages.is_empty());
        assert!(matches!(err, MeshViewError::MeshLoading(MeshLoadError::FileNotFound(_))));
    }

    #[test]
    fn test_bad_explicit_texture_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let request = ModelRequest::new(&path).with_texture(Some(dir.path().join("missing.png")));
        let loaded = load_model(&request, &mut |_| {}).unwrap();
        assert!(loaded.texture.is_none());
    }

    #[test]
    fn test_missing_explicit_texture_skips_auto_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
            .save(dir.path().join("texture.png"))
            .unwrap();

        // 没有显式纹理时会找到同目录的 texture.png
        let auto = load_model(&ModelRequest::new(&path), &mut |_| {}).unwrap();
        assert!(auto.texture.is_some());

        let request = ModelRequest::new(&path).with_texture(Some(dir.path().join("gone.png")));
        let loaded = load_model(&request, &mut |_| {}).unwrap();
        assert!(loaded.texture.is_none());
    }
}
