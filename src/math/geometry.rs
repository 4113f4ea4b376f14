//! 几何数学工具模块
//!
//! 提供网格处理相关的数组形式向量运算：
//! - 质心与包围范围
//! - 法线重建（从三角形面计算顶点法线）
//!
//! 网格数据以 `[f32; 3]` 数组存储，这里的函数直接在切片上工作，
//! 避免与 nalgebra 类型之间来回转换。

/// 退化法线的替代值
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// 从三角形面重建顶点法线
///
/// 面法线取边向量叉乘（未归一化，长度与面积成正比），
/// 累加到三个顶点后再归一化，因此大三角形权重更大。
/// 累加结果长度为零的顶点（孤立点、退化面）使用 [`FALLBACK_NORMAL`]。
///
/// 调用方保证所有索引都在 `positions` 范围内。
///
/// # 示例
///
/// ```rust
/// use mesh_view::math::geometry::reconstruct_normals;
///
/// let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// let normals = reconstruct_normals(&positions, &[0, 1, 2]);
/// assert_eq!(normals[0], [0.0, 0.0, 1.0]);
/// ```
pub fn reconstruct_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;

        let p0 = positions[i0];
        let edge1 = sub(positions[i1], p0);
        let edge2 = sub(positions[i2], p0);
        let face_normal = cross(edge1, edge2);

        for &i in &[i0, i1, i2] {
            normals[i][0] += face_normal[0];
            normals[i][1] += face_normal[1];
            normals[i][2] += face_normal[2];
        }
    }

    for n in normals.iter_mut() {
        *n = normalize_or(*n, FALLBACK_NORMAL);
    }
    normals
}

/// 顶点质心（算术平均）；空输入返回原点
pub fn centroid(positions: &[[f32; 3]]) -> [f32; 3] {
    if positions.is_empty() {
        return [0.0; 3];
    }
    // 大网格用 f64 累加，避免精度丢失
    let mut sum = [0.0f64; 3];
    for p in positions {
        sum[0] += p[0] as f64;
        sum[1] += p[1] as f64;
        sum[2] += p[2] as f64;
    }
    let n = positions.len() as f64;
    [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
}

/// 所有坐标分量绝对值的最大值
pub fn max_abs(positions: &[[f32; 3]]) -> f32 {
    positions
        .iter()
        .flat_map(|p| p.iter())
        .fold(0.0f32, |acc, c| acc.max(c.abs()))
}

/// 轴对齐包围盒 (min, max)；空输入返回 None
pub fn bounds(positions: &[[f32; 3]]) -> Option<([f32; 3], [f32; 3])> {
    let first = *positions.first()?;
    let mut min = first;
    let mut max = first;
    for p in &positions[1..] {
        for k in 0..3 {
            min[k] = min[k].min(p[k]);
            max[k] = max[k].max(p[k]);
        }
    }
    Some((min, max))
}

#[inline]
pub fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// 两个3D向量的叉乘
#[inline]
pub fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 两个3D向量的点乘
#[inline]
pub fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn length(v: [f32; 3]) -> f32 {
    dot(v, v).sqrt()
}

/// 归一化3D向量
///
/// 长度过小或含 NaN 时返回 `fallback`。
#[inline]
pub fn normalize_or(v: [f32; 3], fallback: [f32; 3]) -> [f32; 3] {
    let len = length(v);
    if !len.is_finite() || len < 1e-12 {
        fallback
    } else {
        let inv = 1.0 / len;
        [v[0] * inv, v[1] * inv, v[2] * inv]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross() {
        // X 叉乘 Y = Z
        let z = cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(z, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_dot() {
        // 1*4 + 2*5 + 3*6 = 32
        assert_relative_eq!(dot([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_normalize() {
        let n = normalize_or([3.0, 4.0, 0.0], FALLBACK_NORMAL);
        assert_relative_eq!(length(n), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(n[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_zero_uses_fallback() {
        assert_eq!(normalize_or([0.0; 3], FALLBACK_NORMAL), FALLBACK_NORMAL);
        assert_eq!(normalize_or([f32::NAN, 0.0, 0.0], FALLBACK_NORMAL), FALLBACK_NORMAL);
    }

    #[test]
    fn test_reconstruct_normals_area_weighted() {
        // 共享顶点 0 的两个三角形：一个大的在 XY 平面，一个小的在 XZ 平面
        let positions = [
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, -0.1],
            [0.1, 0.0, 0.0],
        ];
        let indices = [0, 1, 2, 0, 3, 4];
        let normals = reconstruct_normals(&positions, &indices);

        // 顶点 0 的法线应该几乎完全被大三角形主导（+Z）
        assert!(normals[0][2] > 0.99, "{:?}", normals[0]);
        for n in &normals {
            assert_relative_eq!(length(*n), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_isolated_vertex_gets_fallback() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [5.0, 5.0, 5.0]];
        let normals = reconstruct_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], FALLBACK_NORMAL);
        // XZ 平面逆时针（从 +Y 看顺时针），法线指向 -Y
        assert_relative_eq!(normals[0][1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_centroid_and_extent() {
        let positions = [[1.0, 2.0, 3.0], [3.0, -2.0, 5.0]];
        assert_eq!(centroid(&positions), [2.0, 0.0, 4.0]);
        assert_eq!(max_abs(&positions), 5.0);
        assert_eq!(bounds(&positions), Some(([1.0, -2.0, 3.0], [3.0, 2.0, 5.0])));
        assert_eq!(centroid(&[]), [0.0; 3]);
        assert_eq!(bounds(&[]), None);
    }
}
