/// OBJ 文件加载器
///
/// 使用 tobj crate 加载 Wavefront OBJ 格式的3D模型。
/// 读取位置、法线、UV 和顶点色（`v x y z r g b` 扩展写法），不做任何几何处理。
use super::{mesh_name, MeshLoader};
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::RawMesh;
use std::path::Path;

/// OBJ 格式加载器
///
/// # 特性
///
/// - 自动三角化多边形
/// - 单一索引（位置/法线/UV 组合去重后共用一个索引）
/// - UV 坐标翻转（V轴：1.0 - v），与图片左上角原点一致
/// - 多个 `o`/`g` 对象按顺序拼接
pub struct ObjLoader;

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<RawMesh> {
        // 检查文件是否存在
        if !path.exists() {
            return Err(MeshLoadError::FileNotFound(path.to_path_buf()).into());
        }

        let load_options = tobj::LoadOptions {
            triangulate: true,    // 自动三角化
            single_index: true,   // 使用单一索引
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        // 材质被忽略，mtllib 缺失不算错误
        let (models, _materials) = tobj::load_obj(path, &load_options)
            .map_err(|e| MeshLoadError::ParseError(format!("tobj 解析失败: {}", e)))?;

        if models.is_empty() {
            return Err(MeshLoadError::InvalidGeometry("OBJ 文件不包含任何模型".to_string()).into());
        }

        let mut combined = RawMesh::with_name(mesh_name(path));
        for model in models {
            combined.append(convert_model(model)?)?;
        }

        if combined.positions.is_empty() {
            return Err(MeshLoadError::InvalidGeometry("OBJ 文件不包含顶点".to_string()).into());
        }

        tracing::debug!(
            vertices = combined.vertex_count(),
            faces = combined.face_count(),
            objects = combined.object_count,
            "Parsed OBJ"
        );

        Ok(combined)
    }
}

/// tobj 模型转为 RawMesh
fn convert_model(model: tobj::Model) -> Result<RawMesh> {
    let mesh = model.mesh;

    if mesh.positions.len() % 3 != 0 {
        return Err(MeshLoadError::InvalidGeometry(
            format!("顶点位置数据不完整: {} 个浮点数", mesh.positions.len())
        ).into());
    }
    let vertex_count = mesh.positions.len() / 3;

    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals = (mesh.normals.len() == vertex_count * 3 && vertex_count > 0).then(|| {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    });

    let colors = (mesh.vertex_color.len() == vertex_count * 3 && vertex_count > 0).then(|| {
        mesh.vertex_color
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    });

    // 翻转V坐标
    let uvs = (mesh.texcoords.len() == vertex_count * 2 && vertex_count > 0).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], 1.0 - t[1]])
            .collect()
    });

    Ok(RawMesh {
        name: Some(model.name),
        positions,
        indices: mesh.indices,
        normals,
        colors,
        uvs,
        object_count: 1,
    })
}
