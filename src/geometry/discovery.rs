//! 未指定模型时在目录中自动查找
//!
//! 依次查找 `*.glb`、`*.obj`、`*.gltf`，同一格式内按文件名排序取第一个。

use std::path::{Path, PathBuf};

use super::format::ModelFormat;

/// 在 `dir` 中查找第一个可加载的模型
pub fn discover_model(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    ModelFormat::DISCOVERY_ORDER.iter().find_map(|format| {
        files
            .iter()
            .find(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ModelFormat::from_extension)
                    == Some(*format)
            })
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_glb_preferred_over_obj() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.obj", "a.gltf", "z.glb", "y.GLB", "readme.md"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = discover_model(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "y.GLB");
    }

    #[test]
    fn test_obj_before_gltf() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.gltf", "m.obj"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        assert_eq!(discover_model(dir.path()).unwrap().file_name().unwrap(), "m.obj");
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        assert!(discover_model(dir.path()).is_none());
        assert!(discover_model(&dir.path().join("missing")).is_none());
    }
}
