/// 网格数据结构模块
///
/// - [`RawMesh`]：加载器的直接输出，坐标未处理，属性可缺失
/// - [`MeshAsset`]：经过几何处理、可直接上传的网格
///
/// 两者都只持有 CPU 侧数据，不涉及 GPU 资源。

use super::vertex::Vertex;
use crate::core::error::{MeshLoadError, Result};

/// 加载器输出的原始网格
///
/// 多对象文件在加载阶段已经被拼接为一个网格。
/// 可选属性只要存在，长度就与 `positions` 相同。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    /// 网格名称（通常取自文件名）
    pub name: Option<String>,

    /// 顶点位置
    pub positions: Vec<[f32; 3]>,

    /// 三角形索引，每 3 个一组
    pub indices: Vec<u32>,

    /// 顶点法线
    pub normals: Option<Vec<[f32; 3]>>,

    /// 顶点颜色，范围 [0, 1]
    pub colors: Option<Vec<[f32; 3]>>,

    /// 纹理坐标，原点在左上角
    pub uvs: Option<Vec<[f32; 2]>>,

    /// 拼接进来的对象数量
    pub object_count: usize,
}

impl RawMesh {
    /// 创建一个指定名称的空网格
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 获取三角形数量
    #[inline]
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 把另一个对象拼接到当前网格末尾
    ///
    /// 索引按当前顶点数偏移；某个属性只要有一方缺失，拼接结果就不再携带它。
    /// 已有名称时保留原名称。偏移后的索引超出 `u32` 时返回 `InvalidGeometry`，
    /// 当前网格保持不变。
    pub fn append(&mut self, other: RawMesh) -> Result<()> {
        if self.object_count == 0 && self.positions.is_empty() {
            let name = self.name.take();
            *self = other;
            if name.is_some() {
                self.name = name;
            }
            self.object_count = self.object_count.max(1);
            return Ok(());
        }

        let base = u32::try_from(self.positions.len()).map_err(|_| index_overflow(self.positions.len()))?;
        let rebased = other
            .indices
            .iter()
            .map(|&i| i.checked_add(base).ok_or_else(|| index_overflow(i as usize + base as usize)))
            .collect::<Result<Vec<u32>>>()?;
        self.indices.extend(rebased);
        self.positions.extend(other.positions);
        self.normals = merge_attribute(self.normals.take(), other.normals);
        self.colors = merge_attribute(self.colors.take(), other.colors);
        self.uvs = merge_attribute(self.uvs.take(), other.uvs);
        self.object_count += other.object_count.max(1);
        Ok(())
    }
}

fn index_overflow(index: usize) -> crate::core::MeshViewError {
    MeshLoadError::InvalidGeometry(format!("merged mesh index {} does not fit in 32 bits", index)).into()
}

fn merge_attribute<T>(a: Option<Vec<T>>, b: Option<Vec<T>>) -> Option<Vec<T>> {
    match (a, b) {
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
        _ => None,
    }
}

/// 处理完成的网格
///
/// 所有属性数组长度与 `positions` 相同；索引全部在范围内；
/// 法线为单位向量；坐标以原点为中心，最大绝对分量为 2.0。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAsset {
    pub name: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,

    /// 源文件是否提供了纹理坐标
    pub has_uvs: bool,
}

impl MeshAsset {
    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// 获取三角形数量
    #[inline]
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// 验证网格数据的有效性
    ///
    /// 检查：
    /// - 索引数量是3的倍数
    /// - 所有索引都在有效范围内
    /// - 属性数组长度一致
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!("索引数量 {} 不是3的倍数", self.indices.len()));
        }

        let n = self.positions.len();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(format!("索引 {} 超出顶点范围 {}", bad, n));
        }

        if self.normals.len() != n || self.colors.len() != n || self.uvs.len() != n {
            return Err(format!(
                "属性长度不一致: positions={}, normals={}, colors={}, uvs={}",
                n,
                self.normals.len(),
                self.colors.len(),
                self.uvs.len()
            ));
        }

        Ok(())
    }

    /// 按顶点交错为 GPU 顶点数组（索引绘制使用）
    pub fn interleaved(&self) -> Vec<Vertex> {
        (0..self.positions.len())
            .map(|i| self.vertex_at(i))
            .collect()
    }

    /// 每个面角一个顶点（非索引绘制使用）
    pub fn flattened(&self) -> Vec<Vertex> {
        self.indices
            .iter()
            .map(|&i| self.vertex_at(i as usize))
            .collect()
    }

    #[inline]
    fn vertex_at(&self, i: usize) -> Vertex {
        Vertex::new(self.positions[i], self.normals[i], self.colors[i], self.uvs[i])
    }

    /// 转回原始网格，用于重新处理
    pub fn into_raw(self) -> RawMesh {
        RawMesh {
            name: self.name,
            positions: self.positions,
            indices: self.indices,
            normals: Some(self.normals),
            colors: Some(self.colors),
            uvs: if self.has_uvs { Some(self.uvs) } else { None },
            object_count: 1,
        }
    }
}

/// 三角形索引转为线段索引（线框回退路径使用）
///
/// 共享边只保留一次。
pub fn triangle_edges(indices: &[u32]) -> Vec<u32> {
    let mut keys: Vec<u64> = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            keys.push(((lo as u64) << 32) | hi as u64);
        }
    }
    keys.sort_unstable();
    keys.dedup();

    let mut lines = Vec::with_capacity(keys.len() * 2);
    for key in keys {
        lines.push((key >> 32) as u32);
        lines.push(key as u32);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(name: &str, offset: f32, with_uvs: bool) -> RawMesh {
        RawMesh {
            name: Some(name.to_string()),
            positions: vec![[offset, 0.0, 0.0], [offset + 1.0, 0.0, 0.0], [offset, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
            colors: None,
            uvs: if with_uvs { Some(vec![[0.0, 0.0]; 3]) } else { None },
            object_count: 1,
        }
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut mesh = RawMesh::with_name("scene");
        mesh.append(triangle("a", 0.0, true)).unwrap();
        mesh.append(triangle("b", 5.0, true)).unwrap();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.object_count, 2);
        assert_eq!(mesh.name.as_deref(), Some("scene"));
        assert_eq!(mesh.uvs.as_ref().map(|u| u.len()), Some(6));
    }

    #[test]
    fn test_append_drops_partial_attributes() {
        let mut mesh = RawMesh::default();
        mesh.append(triangle("a", 0.0, true)).unwrap();
        mesh.append(triangle("b", 5.0, false)).unwrap();
        assert_eq!(mesh.name.as_deref(), Some("a"));

        assert!(mesh.uvs.is_none());
        assert_eq!(mesh.normals.as_ref().map(|n| n.len()), Some(6));
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn test_append_rejects_index_overflow() {
        let mut mesh = RawMesh::default();
        mesh.append(triangle("a", 0.0, true)).unwrap();

        let mut huge = triangle("b", 5.0, true);
        huge.indices = vec![0, 1, u32::MAX - 1];
        let err = mesh.append(huge).unwrap_err();
        assert!(matches!(
            err,
            crate::core::MeshViewError::MeshLoading(MeshLoadError::InvalidGeometry(_))
        ));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_catches_out_of_range() {
        let asset = MeshAsset {
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            colors: vec![[0.75; 3]; 3],
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 3],
            ..Default::default()
        };
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_flattened_vertex_count() {
        let asset = MeshAsset {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            colors: vec![[0.75; 3]; 4],
            uvs: vec![[0.0; 2]; 4],
            indices: vec![0, 1, 2, 2, 1, 3],
            ..Default::default()
        };
        assert!(asset.validate().is_ok());
        assert_eq!(asset.interleaved().len(), 4);
        let flat = asset.flattened();
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[5].position, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_triangle_edges_shared_edge_once() {
        // 两个三角形共享边 (1, 2)
        let edges = triangle_edges(&[0, 1, 2, 2, 1, 3]);
        assert_eq!(edges.len(), 5 * 2);
        assert_eq!(edges, vec![0, 1, 0, 2, 1, 2, 1, 3, 2, 3]);
    }
}
