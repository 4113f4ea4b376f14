//! 文件格式识别
//!
//! 模型格式在加载开始时由扩展名一次性解析为 [`ModelFormat`]，
//! 之后的分发都基于这个封闭枚举。

use std::fmt;
use std::path::Path;

use crate::core::error::{MeshLoadError, Result};

/// 支持的模型格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    /// Wavefront OBJ
    Obj,
    /// glTF 2.0（JSON + 外部缓冲）
    Gltf,
    /// glTF 2.0 二进制容器
    Glb,
}

impl ModelFormat {
    /// 自动发现模型时的优先顺序
    pub const DISCOVERY_ORDER: [ModelFormat; 3] = [ModelFormat::Glb, ModelFormat::Obj, ModelFormat::Gltf];

    /// 从扩展名解析（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "obj" => Some(ModelFormat::Obj),
            "gltf" => Some(ModelFormat::Gltf),
            "glb" => Some(ModelFormat::Glb),
            _ => None,
        }
    }

    /// 从路径解析，无法识别时返回 `UnsupportedFormat`
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                MeshLoadError::UnsupportedFormat(format!("无法确定文件扩展名: {}", path.display()))
            })?;

        Self::from_extension(ext)
            .ok_or_else(|| MeshLoadError::UnsupportedFormat(format!(".{}", ext)).into())
    }

    /// 小写扩展名（不含点号）
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Obj => "obj",
            ModelFormat::Gltf => "gltf",
            ModelFormat::Glb => "glb",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelFormat::Obj => "OBJ",
            ModelFormat::Gltf => "GLTF",
            ModelFormat::Glb => "GLB",
        })
    }
}

/// 可识别的纹理扩展名
pub const TEXTURE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "tga"];

/// 判断路径是否是支持的纹理格式
pub fn is_texture_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            TEXTURE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_case_insensitive() {
        assert_eq!(ModelFormat::from_path(Path::new("a/b/Model.GLB")).unwrap(), ModelFormat::Glb);
        assert_eq!(ModelFormat::from_path(Path::new("cube.obj")).unwrap(), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_path(Path::new("scene.Gltf")).unwrap(), ModelFormat::Gltf);
    }

    #[test]
    fn test_unknown_extension() {
        let err = ModelFormat::from_path(Path::new("model.fbx")).unwrap_err();
        assert!(err.to_string().contains(".fbx"));
        assert!(ModelFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_texture_extensions() {
        assert!(is_texture_path(Path::new("diffuse.PNG")));
        assert!(is_texture_path(Path::new("t.tga")));
        assert!(!is_texture_path(Path::new("model.obj")));
        assert!(!is_texture_path(Path::new("noext")));
    }
}
