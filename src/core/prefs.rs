//! 最近文件列表
//!
//! 以 JSON 保存在 `<config_dir>/mesh_view/preferences.json`：
//!
//! ```json
//! { "recent_files": ["/models/bunny.glb", "/models/cube.obj"] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::Result;

/// 列表最大长度
pub const MAX_RECENT_FILES: usize = 10;

/// 用户偏好（目前只有最近文件）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,
}

impl Preferences {
    /// 默认偏好文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mesh_view").join("preferences.json"))
    }

    /// 从默认路径加载；无法确定路径时返回空列表
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Could not determine config directory, recent files disabled");
                Self::default()
            }
        }
    }

    /// 从指定路径加载
    ///
    /// 文件缺失或损坏都视为空列表；已经不存在的条目会被剔除。
    pub fn load_from(path: &Path) -> Self {
        let mut prefs = match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str::<Preferences>(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        let before = prefs.recent_files.len();
        prefs.recent_files.retain(|p| p.exists());
        prefs.recent_files.truncate(MAX_RECENT_FILES);
        if prefs.recent_files.len() != before {
            debug!(pruned = before - prefs.recent_files.len(), "Pruned stale recent files");
        }
        prefs
    }

    /// 保存到默认路径
    pub fn save(&self) -> Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// 保存到指定路径（自动创建父目录）
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 记录一个文件为最近使用：去重、置顶、截断到上限
    pub fn add_recent(&mut self, file: &Path) {
        let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        self.recent_files.retain(|p| p != &file);
        self.recent_files.insert(0, file);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"v 0 0 0\n").unwrap();
        path.canonicalize().unwrap()
    }

    #[test]
    fn test_add_recent_most_recent_first_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::default();
        let files: Vec<PathBuf> = (0..12).map(|i| touch(dir.path(), &format!("m{}.obj", i))).collect();
        for f in &files {
            prefs.add_recent(f);
        }
        assert_eq!(prefs.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(prefs.recent_files[0], files[11]);

        // 重复添加只会置顶
        prefs.add_recent(&files[5]);
        assert_eq!(prefs.recent_files[0], files[5]);
        assert_eq!(prefs.recent_files.iter().filter(|p| **p == files[5]).count(), 1);
    }

    #[test]
    fn test_load_prunes_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = touch(dir.path(), "kept.glb");
        let gone = touch(dir.path(), "gone.glb");

        let mut prefs = Preferences::default();
        prefs.add_recent(&gone);
        prefs.add_recent(&kept);
        let json_path = dir.path().join("prefs").join("preferences.json");
        prefs.save_to(&json_path).unwrap();

        fs::remove_file(&gone).unwrap();
        let loaded = Preferences::load_from(&json_path);
        assert_eq!(loaded.recent_files, vec![kept]);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Preferences::load_from(&path).recent_files.is_empty());
        assert!(Preferences::load_from(&dir.path().join("missing.json")).recent_files.is_empty());
    }
}
