/// glTF 2.0 加载器（.gltf / .glb）
///
/// 只读取几何：文档与缓冲通过 `gltf::Gltf::open` + `gltf::import_buffers` 获取，
/// 内嵌图片不解码。所有网格的三角形图元按文档顺序拼接，节点变换被忽略。
use super::{mesh_name, MeshLoader};
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::RawMesh;
use std::path::Path;
use tracing::{debug, warn};

/// GLB / GLTF 加载器
pub struct GltfLoader;

impl MeshLoader for GltfLoader {
    fn load_from_file(path: &Path) -> Result<RawMesh> {
        if !path.exists() {
            return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
        }

        let gltf::Gltf { document, blob } = gltf::Gltf::open(path)
            .map_err(|e| MeshLoadError::ParseError(format!("glTF 解析失败: {}", e)))?;

        let buffers = gltf::import_buffers(&document, path.parent(), blob)
            .map_err(|e| MeshLoadError::ParseError(format!("glTF 缓冲读取失败: {}", e)))?;

        let mut combined = RawMesh::with_name(mesh_name(path));
        let mut skipped = 0usize;

        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    skipped += 1;
                    continue;
                }

                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let Some(positions) = reader.read_positions() else {
                    skipped += 1;
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let vertex_count = positions.len();

                let indices: Vec<u32> = match reader.read_indices() {
                    Some(idx) => idx.into_u32().collect(),
                    None => (0..vertex_count as u32).collect(),
                };

                let normals: Option<Vec<[f32; 3]>> = reader
                    .read_normals()
                    .map(|iter| iter.collect());

                let colors: Option<Vec<[f32; 3]>> = reader
                    .read_colors(0)
                    .map(|c| c.into_rgb_f32().collect());

                let uvs: Option<Vec<[f32; 2]>> = reader
                    .read_tex_coords(0)
                    .map(|tc| tc.into_f32().collect());

                combined.append(RawMesh {
                    name: mesh.name().map(str::to_string),
                    positions,
                    indices,
                    normals,
                    colors,
                    uvs,
                    object_count: 1,
                })?;
            }
        }

        if skipped > 0 {
            warn!(skipped, "Skipped non-triangle glTF primitives");
        }

        if combined.positions.is_empty() {
            return Err(MeshLoadError::InvalidGeometry("glTF 文件不包含三角形网格".to_string()).into());
        }

        debug!(
            vertices = combined.vertex_count(),
            faces = combined.face_count(),
            primitives = combined.object_count,
            "Parsed glTF"
        );

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh::MeshAsset;
    use crate::convert::glb::write_glb;

    #[test]
    fn test_reads_glb_written_by_exporter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.glb");
        let asset = MeshAsset {
            name: Some("tri".to_string()),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            colors: vec![[0.75; 3]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
            has_uvs: true,
        };
        let raw = asset.into_raw();
        write_glb(&raw, &path).unwrap();

        let loaded = GltfLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded.positions, raw.positions);
        assert_eq!(loaded.indices, vec![0, 1, 2]);
        assert_eq!(loaded.normals.as_ref().map(|n| n.len()), Some(3));
        assert_eq!(loaded.uvs.as_ref().map(|u| u[1]), Some([1.0, 0.0]));
        assert_eq!(loaded.name.as_deref(), Some("tri"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.glb");
        std::fs::write(&path, b"definitely not a glb").unwrap();
        let err = GltfLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::core::MeshViewError::MeshLoading(MeshLoadError::ParseError(_))
        ));
    }
}
