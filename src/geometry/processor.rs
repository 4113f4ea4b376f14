//! 几何处理
//!
//! 把加载器输出的 [`RawMesh`] 转换为可渲染的 [`MeshAsset`]：
//!
//! 1. 减去顶点质心
//! 2. 缩放到最大绝对分量为 2.0
//! 3. 法线：沿用文件中的法线（重新归一化），否则按面积加权重建
//! 4. 颜色：沿用顶点色，否则为 0.75 灰
//! 5. UV：沿用，否则全零且 `has_uvs = false`
//!
//! 纯函数，不做 IO，相同输入得到相同输出。

use tracing::{debug, warn};

use crate::core::error::MeshViewError;
use crate::math::geometry::{centroid, length, max_abs, normalize_or, reconstruct_normals, FALLBACK_NORMAL};

use super::mesh::{MeshAsset, RawMesh};

/// 归一化后最大绝对坐标
pub const TARGET_EXTENT: f32 = 2.0;

/// 缺少顶点色时的默认颜色
pub const DEFAULT_COLOR: [f32; 3] = [0.75, 0.75, 0.75];

/// 处理原始网格
pub fn process(raw: RawMesh) -> MeshAsset {
    let RawMesh {
        name,
        mut positions,
        indices,
        normals,
        colors,
        uvs,
        ..
    } = raw;

    let indices = sanitize_indices(indices, positions.len());

    // 1 + 2. 居中、缩放
    let center = centroid(&positions);
    for p in positions.iter_mut() {
        p[0] -= center[0];
        p[1] -= center[1];
        p[2] -= center[2];
    }
    let extent = max_abs(&positions);
    if extent > 0.0 && extent.is_finite() {
        let scale = TARGET_EXTENT / extent;
        for p in positions.iter_mut() {
            p[0] *= scale;
            p[1] *= scale;
            p[2] *= scale;
        }
        debug!(?center, scale, "Normalized geometry");
    } else if !positions.is_empty() {
        let err = MeshViewError::GeometryDegenerate(format!(
            "all {} vertices coincide, skipping scale",
            positions.len()
        ));
        warn!("{}", err);
    }

    // 3. 法线
    let vertex_count = positions.len();
    let normals = match normals {
        Some(supplied) if supplied.len() == vertex_count => renormalize(supplied, &positions, &indices),
        Some(supplied) => {
            warn!(
                normals = supplied.len(),
                vertices = vertex_count,
                "Normal count mismatch, rebuilding normals"
            );
            reconstruct_normals(&positions, &indices)
        }
        None => {
            debug!("Computing normals");
            reconstruct_normals(&positions, &indices)
        }
    };

    // 4. 颜色
    let colors = match colors {
        Some(c) if c.len() == vertex_count => c
            .into_iter()
            .map(|rgb| rgb.map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { DEFAULT_COLOR[0] }))
            .collect(),
        _ => vec![DEFAULT_COLOR; vertex_count],
    };

    // 5. UV
    let (uvs, has_uvs) = match uvs {
        Some(uv) if uv.len() == vertex_count && vertex_count > 0 => (uv, true),
        _ => (vec![[0.0, 0.0]; vertex_count], false),
    };

    MeshAsset {
        name,
        positions,
        normals,
        colors,
        uvs,
        indices,
        has_uvs,
    }
}

/// 丢弃不完整或越界的三角形
fn sanitize_indices(mut indices: Vec<u32>, vertex_count: usize) -> Vec<u32> {
    let trailing = indices.len() % 3;
    if trailing != 0 {
        warn!(trailing, "Index count is not a multiple of 3, truncating");
        indices.truncate(indices.len() - trailing);
    }

    if indices.iter().all(|&i| (i as usize) < vertex_count) {
        return indices;
    }

    let before = indices.len() / 3;
    let kept: Vec<u32> = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
        .flatten()
        .copied()
        .collect();
    warn!(dropped = before - kept.len() / 3, "Dropped faces with out-of-range vertices");
    kept
}

/// 归一化文件中的法线；退化的用重建法线替换
fn renormalize(mut normals: Vec<[f32; 3]>, positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut degenerate = 0usize;
    for n in normals.iter_mut() {
        let len = length(*n);
        if len.is_finite() && len > 1e-12 {
            *n = normalize_or(*n, FALLBACK_NORMAL);
        } else {
            *n = [0.0; 3];
            degenerate += 1;
        }
    }

    if degenerate > 0 {
        debug!(degenerate, "Replacing degenerate normals");
        let rebuilt = reconstruct_normals(positions, indices);
        for (n, r) in normals.iter_mut().zip(rebuilt) {
            if *n == [0.0; 3] {
                *n = r;
            }
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube() -> RawMesh {
        let positions = vec![
            [0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 4.0, 0.0], [0.0, 4.0, 0.0],
            [0.0, 0.0, 4.0], [4.0, 0.0, 4.0], [4.0, 4.0, 4.0], [0.0, 4.0, 4.0],
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // 后
            4, 5, 6, 4, 6, 7, // 前
            0, 1, 5, 0, 5, 4, // 下
            3, 7, 6, 3, 6, 2, // 上
            0, 4, 7, 0, 7, 3, // 左
            1, 2, 6, 1, 6, 5, // 右
        ];
        RawMesh {
            positions,
            indices,
            ..Default::default()
        }
    }

    fn skewed() -> RawMesh {
        RawMesh {
            positions: vec![
                [10.0, 3.0, -7.0],
                [250.0, 8.0, -1.0],
                [13.0, 90.0, 40.0],
                [-30.0, -45.0, 2.0],
            ],
            indices: vec![0, 1, 2, 0, 2, 3, 1, 3, 2],
            normals: None,
            colors: Some(vec![[1.5, 0.2, -0.1]; 4]),
            uvs: Some(vec![[0.1, 0.9]; 4]),
            ..Default::default()
        }
    }

    #[test]
    fn test_extent_and_centroid() {
        for raw in [cube(), skewed()] {
            let asset = process(raw);
            assert!(max_abs(&asset.positions) <= TARGET_EXTENT + 1e-5);
            assert_relative_eq!(max_abs(&asset.positions), TARGET_EXTENT, epsilon = 1e-5);
            let c = centroid(&asset.positions);
            for k in 0..3 {
                assert!(c[k].abs() < 1e-5, "centroid {:?}", c);
            }
        }
    }

    #[test]
    fn test_normals_unit_length() {
        let asset = process(skewed());
        assert_eq!(asset.normals.len(), asset.vertex_count());
        for n in &asset.normals {
            assert_relative_eq!(length(*n), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_indices_in_range() {
        let mut raw = cube();
        raw.indices.extend_from_slice(&[0, 1, 99, 2, 3]);
        let asset = process(raw);
        assert_eq!(asset.face_count(), 12);
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn test_cube_defaults() {
        let asset = process(cube());
        assert_eq!(asset.vertex_count(), 8);
        assert_eq!(asset.face_count(), 12);
        assert!(asset.colors.iter().all(|c| *c == DEFAULT_COLOR));
        assert!(asset.uvs.iter().all(|uv| *uv == [0.0, 0.0]));
        assert!(!asset.has_uvs);
        // 每个角都在 ±2
        for p in &asset.positions {
            for c in p {
                assert_relative_eq!(c.abs(), 2.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_supplied_attributes_kept_and_clamped() {
        let asset = process(skewed());
        assert!(asset.has_uvs);
        assert_eq!(asset.uvs[0], [0.1, 0.9]);
        assert_eq!(asset.colors[0], [1.0, 0.2, 0.0]);
    }

    #[test]
    fn test_empty_mesh() {
        let asset = process(RawMesh::default());
        assert!(asset.positions.is_empty());
        assert!(asset.normals.is_empty());
        assert!(asset.indices.is_empty());
        assert!(!asset.has_uvs);
    }

    #[test]
    fn test_single_point_is_degenerate_but_finite() {
        let raw = RawMesh {
            positions: vec![[3.0, 3.0, 3.0]; 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let asset = process(raw);
        for p in &asset.positions {
            assert_eq!(*p, [0.0, 0.0, 0.0]);
        }
        assert_eq!(asset.normals[0], FALLBACK_NORMAL);
    }

    #[test]
    fn test_degenerate_supplied_normals_replaced() {
        let mut raw = cube();
        let mut normals = vec![[0.0, 0.0, 2.0]; 8];
        normals[3] = [0.0, 0.0, 0.0];
        raw.normals = Some(normals);
        let asset = process(raw);
        assert_eq!(asset.normals[0], [0.0, 0.0, 1.0]);
        assert_relative_eq!(length(asset.normals[3]), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_idempotent() {
        let once = process(skewed());
        let twice = process(once.clone().into_raw());
        assert_eq!(once.indices, twice.indices);
        assert_eq!(once.has_uvs, twice.has_uvs);
        for (a, b) in once.positions.iter().zip(&twice.positions) {
            for k in 0..3 {
                assert_relative_eq!(a[k], b[k], epsilon = 1e-5);
            }
        }
        for (a, b) in once.normals.iter().zip(&twice.normals) {
            for k in 0..3 {
                assert_relative_eq!(a[k], b[k], epsilon = 1e-5);
            }
        }
    }
}
