//! GLB 导出
//!
//! 单网格、单图元、单节点；每个属性一个紧密排列的 buffer view，
//! 全部放在 GLB 的 BIN 块中。

use gltf::json;
use gltf::json::validation::{Checked::Valid, USize64};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::core::error::{ConversionError, Result};
use crate::geometry::mesh::RawMesh;

/// BIN 块累加器
struct BinBuilder {
    bytes: Vec<u8>,
    views: Vec<json::buffer::View>,
}

impl BinBuilder {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            views: Vec::new(),
        }
    }

    /// 追加一段数据，返回对应 view 的索引
    fn push_view(&mut self, data: &[u8], target: json::buffer::Target) -> json::Index<json::buffer::View> {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(data);
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64::from(data.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        });
        json::Index::new(self.views.len() as u32 - 1)
    }
}

fn accessor(
    view: json::Index<json::buffer::View>,
    count: usize,
    component: json::accessor::ComponentType,
    type_: json::accessor::Type,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Valid(json::accessor::GenericComponentType(component)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: None,
        max: None,
        name: None,
        normalized: false,
        sparse: None,
    }
}

fn vec3_bytes(data: &[[f32; 3]]) -> &[u8] {
    bytemuck::cast_slice(data)
}

/// 把网格写为 GLB 文件
///
/// 写入 POSITION（带 min/max）、可用的 NORMAL / COLOR_0 / TEXCOORD_0
/// 以及 u32 索引。坐标原样写出，不做归一化。
pub fn write_glb(mesh: &RawMesh, path: &Path) -> Result<()> {
    let bytes = encode_glb(mesh)?;

    let file = File::create(path)
        .map_err(|e| ConversionError::OutputUnwritable(format!("{}: {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    std::io::Write::write_all(&mut writer, &bytes)
        .and_then(|_| std::io::Write::flush(&mut writer))
        .map_err(|e| ConversionError::OutputUnwritable(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// 在内存中编码 GLB
pub fn encode_glb(mesh: &RawMesh) -> Result<Vec<u8>> {
    if mesh.positions.is_empty() {
        return Err(ConversionError::Export("mesh has no vertices".to_string()).into());
    }

    let vertex_count = mesh.positions.len();
    let mut bin = BinBuilder::new();
    let mut accessors: Vec<json::Accessor> = Vec::new();
    let mut attributes = BTreeMap::new();

    // POSITION 必须带 min/max
    let position_view = bin.push_view(vec3_bytes(&mesh.positions), json::buffer::Target::ArrayBuffer);
    let mut position_accessor = accessor(
        position_view,
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec3,
    );
    if let Some((min, max)) = crate::math::geometry::bounds(&mesh.positions) {
        position_accessor.min = Some(json::Value::from(min.to_vec()));
        position_accessor.max = Some(json::Value::from(max.to_vec()));
    }
    accessors.push(position_accessor);
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));

    let mut push_vec3 = |data: &Option<Vec<[f32; 3]>>, semantic: json::mesh::Semantic| {
        if let Some(values) = data.as_ref().filter(|v| v.len() == vertex_count) {
            let view = bin.push_view(vec3_bytes(values), json::buffer::Target::ArrayBuffer);
            accessors.push(accessor(
                view,
                vertex_count,
                json::accessor::ComponentType::F32,
                json::accessor::Type::Vec3,
            ));
            attributes.insert(Valid(semantic), json::Index::new(accessors.len() as u32 - 1));
        }
    };
    push_vec3(&mesh.normals, json::mesh::Semantic::Normals);
    push_vec3(&mesh.colors, json::mesh::Semantic::Colors(0));

    if let Some(uvs) = mesh.uvs.as_ref().filter(|v| v.len() == vertex_count) {
        let view = bin.push_view(bytemuck::cast_slice(uvs), json::buffer::Target::ArrayBuffer);
        accessors.push(accessor(
            view,
            vertex_count,
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(0)),
            json::Index::new(accessors.len() as u32 - 1),
        );
    }

    let indices = if mesh.indices.is_empty() {
        None
    } else {
        let view = bin.push_view(
            bytemuck::cast_slice(&mesh.indices),
            json::buffer::Target::ElementArrayBuffer,
        );
        accessors.push(accessor(
            view,
            mesh.indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
        ));
        Some(json::Index::new(accessors.len() as u32 - 1))
    };

    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices,
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let mut root = json::Root::default();
    root.asset.generator = Some(format!("mesh_view {}", env!("CARGO_PKG_VERSION")));
    root.buffers.push(json::Buffer {
        byte_length: USize64::from(bin.bytes.len()),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    });
    root.buffer_views = bin.views;
    root.accessors = accessors;
    let mesh_index = root.push(json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: mesh.name.clone(),
        primitives: vec![primitive],
        weights: None,
    });
    let node = root.push(json::Node {
        mesh: Some(mesh_index),
        ..Default::default()
    });
    let scene = root.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes: vec![node],
    });
    root.scene = Some(scene);

    let json_string =
        json::serialize::to_string(&root).map_err(|e| ConversionError::Export(e.to_string()))?;

    // 12 字节文件头 + 两个 8 字节块头，块内容 4 字节对齐
    let padded = |n: usize| (n + 3) & !3;
    let total = 12 + 8 + padded(json_string.len()) + 8 + bin.bytes.len();
    let length = u32::try_from(total)
        .map_err(|_| ConversionError::Export(format!("GLB size {} exceeds 4 GiB", total)))?;

    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length,
        },
        json: Cow::Owned(json_string.into_bytes()),
        bin: Some(Cow::Owned(bin.bytes)),
    };
    glb.to_vec().map_err(|e| ConversionError::Export(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> RawMesh {
        RawMesh {
            name: Some("quad".to_string()),
            positions: vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 3.0, 0.0], [0.0, 3.0, 0.0]],
            indices: vec![0, 1, 2, 0, 2, 3],
            normals: None,
            colors: None,
            uvs: Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
            object_count: 1,
        }
    }

    #[test]
    fn test_header_and_alignment() {
        let bytes = encode_glb(&quad()).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
        let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        assert_eq!(length, bytes.len());
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_document_contents() {
        let bytes = encode_glb(&quad()).unwrap();
        let gltf = gltf::Gltf::from_slice(&bytes).unwrap();
        let mesh = gltf.meshes().next().unwrap();
        assert_eq!(mesh.name(), Some("quad"));

        let primitive = mesh.primitives().next().unwrap();
        let bounds = primitive.bounding_box();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [2.0, 3.0, 0.0]);
        assert!(primitive.get(&gltf::Semantic::TexCoords(0)).is_some());
        assert!(primitive.get(&gltf::Semantic::Normals).is_none());
        assert_eq!(primitive.indices().unwrap().count(), 6);
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = encode_glb(&RawMesh::default()).unwrap_err();
        assert!(err.to_string().contains("no vertices"));
    }
}
