//! 加载状态与后台加载线程
//!
//! 工作线程与渲染线程之间只共享一个由 `parking_lot::Mutex` 保护的状态槽：
//! 工作线程写入阶段和处理结果，渲染线程每帧轮询一次。
//! 同一时间只允许一个加载任务。

use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::{MeshViewError, Result};
use crate::geometry::pipeline::{load_model, LoadedModel, ModelRequest};

/// 单次加载的阶段
///
/// 只能向前推进；`Ready` 与 `Error` 是终态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Initializing,
    LoadingTexture,
    LoadingGeometry,
    Processing,
    UploadingToGpu,
    Ready,
    Error(String),
}

impl LoadState {
    fn rank(&self) -> u8 {
        match self {
            LoadState::Initializing => 0,
            LoadState::LoadingTexture => 1,
            LoadState::LoadingGeometry => 2,
            LoadState::Processing => 3,
            LoadState::UploadingToGpu => 4,
            LoadState::Ready | LoadState::Error(_) => 5,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Error(_))
    }

    /// 是否允许迁移到 `next`
    pub fn can_advance_to(&self, next: &LoadState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            LoadState::Error(_) => true,
            _ => next.rank() > self.rank(),
        }
    }

    /// 加载界面显示的阶段文字
    pub fn label(&self) -> &str {
        match self {
            LoadState::Initializing => "Initializing...",
            LoadState::LoadingTexture => "Loading texture...",
            LoadState::LoadingGeometry => "Loading geometry...",
            LoadState::Processing => "Processing...",
            LoadState::UploadingToGpu => "Uploading to GPU...",
            LoadState::Ready => "Ready",
            LoadState::Error(msg) => msg,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Error(msg) => write!(f, "Error: {}", msg),
            other => f.write_str(other.label()),
        }
    }
}

/// 渲染线程读取的状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSnapshot {
    pub state: LoadState,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug)]
struct Slot {
    state: LoadState,
    file_name: String,
    file_size: u64,
    payload: Option<LoadedModel>,
    in_flight: bool,
}

/// 加载状态槽（可跨线程克隆）
#[derive(Debug, Clone)]
pub struct LoadTracker {
    inner: Arc<Mutex<Slot>>,
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slot {
                state: LoadState::Initializing,
                file_name: String::new(),
                file_size: 0,
                payload: None,
                in_flight: false,
            })),
        }
    }

    /// 开始新的加载；已有任务进行中时拒绝
    pub fn begin(&self, file_name: impl Into<String>, file_size: u64) -> Result<()> {
        let mut slot = self.inner.lock();
        if slot.in_flight {
            return Err(MeshViewError::LoadInFlight);
        }
        slot.state = LoadState::Initializing;
        slot.file_name = file_name.into();
        slot.file_size = file_size;
        slot.payload = None;
        slot.in_flight = true;
        Ok(())
    }

    /// 推进阶段；非法迁移被忽略并返回 false
    pub fn advance(&self, next: LoadState) -> bool {
        let mut slot = self.inner.lock();
        if !slot.state.can_advance_to(&next) {
            warn!(from = ?slot.state, to = ?next, "Ignoring backward load state transition");
            return false;
        }
        debug!(stage = %next, "Load stage");
        if next.is_terminal() {
            slot.in_flight = false;
        }
        slot.state = next;
        true
    }

    /// 进入错误态
    pub fn fail(&self, message: impl Into<String>) {
        self.advance(LoadState::Error(message.into()));
    }

    /// 工作线程交付处理结果，同时进入 UploadingToGpu
    pub fn publish(&self, model: LoadedModel) {
        let mut slot = self.inner.lock();
        if !slot.state.can_advance_to(&LoadState::UploadingToGpu) {
            return;
        }
        slot.file_size = model.file_size;
        slot.payload = Some(model);
        slot.state = LoadState::UploadingToGpu;
    }

    /// 渲染线程取走待上传的结果
    pub fn take_payload(&self) -> Option<LoadedModel> {
        self.inner.lock().payload.take()
    }

    pub fn snapshot(&self) -> LoadSnapshot {
        let slot = self.inner.lock();
        LoadSnapshot {
            state: slot.state.clone(),
            file_name: slot.file_name.clone(),
            file_size: slot.file_size,
        }
    }

    pub fn state(&self) -> LoadState {
        self.inner.lock().state.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().in_flight
    }
}

/// 在后台线程中加载模型
///
/// 返回的句柄可以丢弃；结果通过 `tracker` 交付。
pub fn spawn_model_load(tracker: &LoadTracker, request: ModelRequest) -> Result<JoinHandle<()>> {
    let file_size = std::fs::metadata(&request.model_path).map(|m| m.len()).unwrap_or(0);
    tracker.begin(request.file_name(), file_size)?;
    info!(file = %request.model_path.display(), "Load requested");

    let worker_tracker = tracker.clone();
    let spawned = std::thread::Builder::new()
        .name("model-loader".to_string())
        .spawn(move || {
            let progress_tracker = worker_tracker.clone();
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                load_model(&request, &mut |stage| {
                    progress_tracker.advance(stage);
                })
            }));

            match outcome {
                Ok(Ok(model)) => worker_tracker.publish(model),
                Ok(Err(e)) => {
                    error!("{}", e);
                    worker_tracker.fail(e.to_string());
                }
                Err(_) => {
                    error!("Model loader panicked");
                    worker_tracker.fail("Model loader crashed while reading the file");
                }
            }
        });

    match spawned {
        Ok(handle) => Ok(handle),
        Err(e) => {
            tracker.fail(format!("Failed to start loader thread: {}", e));
            Err(e.into())
        }
    }
}
