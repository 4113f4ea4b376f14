/// 模型加载器模块
///
/// 提供统一的模型加载接口和各种格式的具体实现。
///
/// # 支持的格式
///
/// - **OBJ**: Wavefront OBJ 格式（使用 tobj crate）
/// - **GLB / GLTF**: glTF 2.0（使用 gltf crate，不解码内嵌图片）
///
/// 多对象文件统一拼接为一个 [`RawMesh`]，节点变换与材质被丢弃。
///
/// # 使用示例
///
/// ```rust,no_run
/// use mesh_view::geometry::loaders::load_mesh;
/// use std::path::Path;
///
/// let mesh = load_mesh(Path::new("model.glb"))?;
/// println!("{} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
/// # Ok::<(), mesh_view::core::MeshViewError>(())
/// ```
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::format::ModelFormat;
use crate::geometry::mesh::RawMesh;
use std::path::Path;

pub mod obj_loader;
pub mod gltf_loader;

// 重新导出加载器
pub use obj_loader::ObjLoader;
pub use gltf_loader::GltfLoader;

/// 网格加载器 trait
///
/// 所有格式的加载器都实现此 trait。
///
/// # 实现要求
///
/// - 加载器是无状态的（使用关联函数）
/// - 返回 CPU 侧的 `RawMesh`，不涉及 GPU 资源，不做几何处理
/// - 多个对象按顺序拼接
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件不存在：`MeshLoadError::FileNotFound`
    /// - 文件格式错误或损坏：`MeshLoadError::ParseError`
    /// - 没有可用的三角形数据：`MeshLoadError::InvalidGeometry`
    fn load_from_file(path: &Path) -> Result<RawMesh>;
}

/// 根据文件扩展名选择合适的加载器
pub fn load_mesh(path: &Path) -> Result<RawMesh> {
    if !path.exists() {
        return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
    }
    let format = ModelFormat::from_path(path)?;
    load_mesh_as(path, format)
}

/// 按已解析的格式加载
pub fn load_mesh_as(path: &Path, format: ModelFormat) -> Result<RawMesh> {
    match format {
        ModelFormat::Obj => ObjLoader::load_from_file(path),
        ModelFormat::Gltf | ModelFormat::Glb => GltfLoader::load_from_file(path),
    }
}

/// 网格名称：取文件名（不含扩展名）
pub(crate) fn mesh_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unnamed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MeshViewError;

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = load_mesh(Path::new("no/such/model.glb")).unwrap_err();
        assert!(matches!(err, MeshViewError::MeshLoading(MeshLoadError::FileNotFound(_))));
        assert!(err.to_string().contains("no/such/model.glb"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.stl");
        std::fs::write(&path, b"solid").unwrap();
        let err = load_mesh(&path).unwrap_err();
        assert!(matches!(err, MeshViewError::MeshLoading(MeshLoadError::UnsupportedFormat(_))));
    }
}
