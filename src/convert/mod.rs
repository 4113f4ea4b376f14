//! OBJ → GLB 转换服务
//!
//! 读取 OBJ（与查看器相同的拼接规则），原样导出几何到 GLB。
//! 输出先写入 `<output>.tmp`，成功后再重命名，失败时删除临时文件。

pub mod glb;

use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::core::error::{ConversionError, MeshViewError, Result};
use crate::geometry::format::ModelFormat;
use crate::geometry::loaders::{MeshLoader, ObjLoader};
use crate::geometry::mesh::RawMesh;
use crate::geometry::pipeline::display_name;

/// 转换阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Loading,
    Processing,
    Saving,
    Done,
}

impl ConversionStage {
    /// 进度条位置
    pub fn fraction(&self) -> f32 {
        match self {
            ConversionStage::Loading => 0.2,
            ConversionStage::Processing => 0.5,
            ConversionStage::Saving => 0.8,
            ConversionStage::Done => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConversionStage::Loading => "Loading",
            ConversionStage::Processing => "Processing",
            ConversionStage::Saving => "Saving",
            ConversionStage::Done => "Done",
        }
    }
}

/// 转换结果统计
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// `(1 - out/in) * 100`，输出更大时为负
    pub reduction_percent: f64,
    pub vertices: usize,
    pub faces: usize,
}

impl ConversionReport {
    fn new(input_bytes: u64, output_bytes: u64, vertices: usize, faces: usize) -> Self {
        let reduction_percent = if input_bytes == 0 {
            0.0
        } else {
            (1.0 - output_bytes as f64 / input_bytes as f64) * 100.0
        };
        Self {
            input_bytes,
            output_bytes,
            reduction_percent,
            vertices,
            faces,
        }
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::core::log::megabytes;
        write!(
            f,
            "{:.2} MB -> {:.2} MB ({:.1}% smaller), {} vertices, {} faces",
            megabytes(self.input_bytes),
            megabytes(self.output_bytes),
            self.reduction_percent,
            self.vertices,
            self.faces
        )
    }
}

#[derive(Debug, Default)]
struct ConvertSlot {
    in_flight: bool,
    stage: Option<ConversionStage>,
}

/// 转换服务；同一时间只运行一个后台转换
#[derive(Debug, Clone, Default)]
pub struct ConverterService {
    slot: Arc<Mutex<ConvertSlot>>,
}

impl ConverterService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同步转换
    ///
    /// `progress` 依次收到 Loading、Processing、Saving、Done。
    pub fn convert(
        input: &Path,
        output: &Path,
        progress: &mut dyn FnMut(ConversionStage),
    ) -> Result<ConversionReport> {
        let started = Instant::now();

        if !input.is_file() {
            return Err(ConversionError::InputUnreadable(format!("{} does not exist", input.display())).into());
        }
        match ModelFormat::from_path(input) {
            Ok(ModelFormat::Obj) => {}
            _ => {
                return Err(ConversionError::InputUnreadable(format!(
                    "{} is not an OBJ file",
                    input.display()
                ))
                .into())
            }
        }
        let input_bytes = std::fs::metadata(input)
            .map_err(|e| ConversionError::InputUnreadable(e.to_string()))?
            .len();

        progress(ConversionStage::Loading);
        info!(file = %display_name(input), size_mb = %format!("{:.1}", crate::core::log::megabytes(input_bytes)), "Converting");
        let raw = ObjLoader::load_from_file(input)
            .map_err(|e| ConversionError::InputUnreadable(e.to_string()))?;

        progress(ConversionStage::Processing);
        let mesh = prepare_for_export(raw);
        debug!(vertices = mesh.vertex_count(), faces = mesh.face_count(), "Prepared mesh for export");

        progress(ConversionStage::Saving);
        let temp = temp_path(output);
        if let Err(e) = glb::write_glb(&mesh, &temp).and_then(|_| {
            std::fs::rename(&temp, output).map_err(|e| {
                MeshViewError::from(ConversionError::OutputUnwritable(format!("{}: {}", output.display(), e)))
            })
        }) {
            if temp.exists() {
                if let Err(remove_err) = std::fs::remove_file(&temp) {
                    warn!("Failed to remove {}: {}", temp.display(), remove_err);
                }
            }
            return Err(e);
        }

        let output_bytes = std::fs::metadata(output)?.len();
        let report = ConversionReport::new(input_bytes, output_bytes, mesh.vertex_count(), mesh.face_count());
        progress(ConversionStage::Done);
        info!(
            output = %display_name(output),
            elapsed_s = %format!("{:.2}", started.elapsed().as_secs_f64()),
            reduction = %format!("{:.1}%", report.reduction_percent),
            "Conversion finished"
        );
        Ok(report)
    }

    /// 在后台线程中转换；已有任务时返回 `Busy`
    ///
    /// 失败（包括工作线程 panic）时阶段清空为 `None`。
    pub fn spawn(&self, input: PathBuf, output: PathBuf) -> Result<JoinHandle<Result<ConversionReport>>> {
        {
            let mut slot = self.slot.lock();
            if slot.in_flight {
                return Err(ConversionError::Busy.into());
            }
            slot.in_flight = true;
            slot.stage = None;
        }

        let slot = Arc::clone(&self.slot);
        let spawned = std::thread::Builder::new()
            .name("mesh-converter".to_string())
            .spawn(move || {
                let progress_slot = Arc::clone(&slot);
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    Self::convert(&input, &output, &mut |stage| {
                        progress_slot.lock().stage = Some(stage);
                    })
                }));
                let result = outcome.unwrap_or_else(|_| {
                    error!("Converter panicked");
                    Err(ConversionError::Export("converter crashed while writing the file".to_string()).into())
                });

                let mut guard = slot.lock();
                guard.in_flight = false;
                if result.is_err() {
                    guard.stage = None;
                }
                drop(guard);
                result
            });

        spawned.map_err(|e| {
            self.slot.lock().in_flight = false;
            e.into()
        })
    }

    /// 最近一次报告的阶段
    pub fn stage(&self) -> Option<ConversionStage> {
        self.slot.lock().stage
    }

    pub fn is_busy(&self) -> bool {
        self.slot.lock().in_flight
    }
}

/// 导出前的清理：丢弃越界面
///
/// 坐标与属性保持原样，缺失的法线留给读取方重建。
fn prepare_for_export(mut mesh: RawMesh) -> RawMesh {
    let n = mesh.positions.len() as u32;
    let before = mesh.face_count();
    let indices: Vec<u32> = mesh
        .indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| i < n))
        .flatten()
        .copied()
        .collect();
    mesh.indices = indices;
    if mesh.face_count() < before {
        warn!(dropped = before - mesh.face_count(), "Dropped faces with out-of-range indices");
    }
    mesh
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::loaders::GltfLoader;
    use std::fmt::Write as _;
    use std::fs;

    /// n×n 个四边形的网格平面
    fn grid_obj(n: usize) -> String {
        let mut obj = String::new();
        for y in 0..=n {
            for x in 0..=n {
                let h = ((x * 7 + y * 13) % 10) as f64 * 0.012345;
                writeln!(obj, "v {:.6} {:.6} {:.6}", x as f64 * 0.1, h, y as f64 * 0.1).unwrap();
            }
        }
        let row = n + 1;
        for y in 0..n {
            for x in 0..n {
                let a = y * row + x + 1;
                let b = a + 1;
                let c = a + row + 1;
                let d = a + row;
                writeln!(obj, "f {} {} {} {}", a, b, c, d).unwrap();
            }
        }
        obj
    }

    #[test]
    fn test_grid_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("grid.obj");
        let output = dir.path().join("grid.glb");
        fs::write(&input, grid_obj(50)).unwrap();

        let mut stages = Vec::new();
        let report = ConverterService::convert(&input, &output, &mut |s| stages.push(s)).unwrap();
        assert_eq!(
            stages,
            vec![
                ConversionStage::Loading,
                ConversionStage::Processing,
                ConversionStage::Saving,
                ConversionStage::Done
            ]
        );

        assert_eq!(report.vertices, 51 * 51);
        assert_eq!(report.faces, 50 * 50 * 2);
        assert!(report.output_bytes < report.input_bytes);
        assert!(report.reduction_percent > 0.0);
        assert!(!temp_path(&output).exists());

        let reloaded = GltfLoader::load_from_file(&output).unwrap();
        assert_eq!(reloaded.vertex_count(), report.vertices);
        assert_eq!(reloaded.face_count(), report.faces);
        // 坐标未归一化
        let max_x = reloaded.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_non_obj_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("model.glb");
        fs::write(&input, b"glTF").unwrap();
        let err = ConverterService::convert(&input, &dir.path().join("out.glb"), &mut |_| {}).unwrap_err();
        assert!(matches!(err, MeshViewError::Conversion(ConversionError::InputUnreadable(_))));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut stages = Vec::new();
        let err = ConverterService::convert(
            &dir.path().join("nope.obj"),
            &dir.path().join("nope.glb"),
            &mut |s| stages.push(s),
        )
        .unwrap_err();
        assert!(matches!(err, MeshViewError::Conversion(ConversionError::InputUnreadable(_))));
        assert!(stages.is_empty());
    }

    #[test]
    fn test_unwritable_output_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tri.obj");
        fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let output = dir.path().join("missing_dir").join("tri.glb");

        let err = ConverterService::convert(&input, &output, &mut |_| {}).unwrap_err();
        assert!(matches!(err, MeshViewError::Conversion(ConversionError::OutputUnwritable(_))));
        assert!(!temp_path(&output).exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_spawn_and_busy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tri.obj");
        fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let service = ConverterService::new();
        service.slot.lock().in_flight = true;
        let busy = service.spawn(input.clone(), dir.path().join("a.glb"));
        assert!(matches!(busy, Err(MeshViewError::Conversion(ConversionError::Busy))));
        service.slot.lock().in_flight = false;

        let report = service
            .spawn(input, dir.path().join("b.glb"))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(report.faces, 1);
        assert_eq!(service.stage(), Some(ConversionStage::Done));
        assert!(!service.is_busy());
    }

    #[test]
    fn test_failed_spawn_clears_progress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tri.obj");
        fs::write(&input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let service = ConverterService::new();
        let result = service
            .spawn(input, dir.path().join("no_dir").join("tri.glb"))
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(result, Err(MeshViewError::Conversion(ConversionError::OutputUnwritable(_)))));
        assert_eq!(service.stage(), None);
        assert!(!service.is_busy());
    }

    #[test]
    fn test_stage_fractions() {
        assert_eq!(ConversionStage::Loading.fraction(), 0.2);
        assert_eq!(ConversionStage::Done.fraction(), 1.0);
    }
}
