//! 网格绘制状态描述
//!
//! 每帧根据 [`RenderSettings`] 计算出一个 [`MeshRenderState`]，
//! 由 GPU 侧的管线缓存把它解析为具体的渲染管线。

use crate::component::settings::RenderSettings;

/// 线框绘制方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireframeMode {
    /// 正常填充
    Off,
    /// 适配器支持 `POLYGON_MODE_LINE` 时直接用线模式光栅化三角形
    PolygonLine,
    /// 回退路径：用边索引缓冲按线段列表绘制
    EdgeList,
}

/// 网格绘制所需的全部 GPU 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshRenderState {
    pub cull_back_faces: bool,
    pub depth_write: bool,
    pub wireframe: WireframeMode,
}

impl MeshRenderState {
    /// 由渲染设置推导
    ///
    /// 不透明度小于 1 时关闭背面剔除与深度写入，否则两者都开启。
    pub fn resolve(settings: &RenderSettings, polygon_line_supported: bool) -> Self {
        let opaque = !settings.is_translucent();
        let wireframe = match (settings.wireframe, polygon_line_supported) {
            (false, _) => WireframeMode::Off,
            (true, true) => WireframeMode::PolygonLine,
            (true, false) => WireframeMode::EdgeList,
        };
        Self {
            cull_back_faces: opaque,
            depth_write: opaque,
            wireframe,
        }
    }

    /// 是否需要边索引缓冲
    pub fn needs_edge_buffer(&self) -> bool {
        self.wireframe == WireframeMode::EdgeList
    }
}

/// 片元着色器是否采样纹理
pub fn texture_active(has_texture: bool, texture_enabled: bool, has_uvs: bool) -> bool {
    has_texture && texture_enabled && has_uvs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_state() {
        let settings = RenderSettings::default();
        let state = MeshRenderState::resolve(&settings, true);
        assert_eq!(
            state,
            MeshRenderState {
                cull_back_faces: true,
                depth_write: true,
                wireframe: WireframeMode::Off
            }
        );
    }

    #[test]
    fn test_translucent_disables_cull_and_depth_write() {
        let mut settings = RenderSettings::default();
        settings.set_opacity(0.5);
        let state = MeshRenderState::resolve(&settings, true);
        assert!(!state.cull_back_faces);
        assert!(!state.depth_write);
    }

    #[test]
    fn test_wireframe_fallback() {
        let mut settings = RenderSettings::default();
        settings.wireframe = true;
        assert_eq!(MeshRenderState::resolve(&settings, true).wireframe, WireframeMode::PolygonLine);
        let fallback = MeshRenderState::resolve(&settings, false);
        assert_eq!(fallback.wireframe, WireframeMode::EdgeList);
        assert!(fallback.needs_edge_buffer());
    }

    #[test]
    fn test_texture_requires_all_three() {
        assert!(texture_active(true, true, true));
        assert!(!texture_active(true, true, false));
        assert!(!texture_active(true, false, true));
        assert!(!texture_active(false, true, true));
    }
}
