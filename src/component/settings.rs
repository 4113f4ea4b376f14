//! 渲染开关与不透明度

/// 不透明度下限
pub const MIN_OPACITY: f32 = 0.1;
/// 不透明度上限
pub const MAX_OPACITY: f32 = 1.0;
/// `+` / `-` 键的步长
pub const OPACITY_STEP: f32 = 0.1;

/// 运行期渲染设置，进程内一直存在
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    opacity: f32,
    pub wireframe: bool,
    pub grid_visible: bool,
    /// 用户是否希望显示纹理；实际采样还取决于纹理与 UV 是否存在
    pub texture_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            opacity: MAX_OPACITY,
            wireframe: false,
            grid_visible: true,
            texture_enabled: true,
        }
    }
}

impl RenderSettings {
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// 设置不透明度，结果限制在 [0.1, 1.0]
    pub fn set_opacity(&mut self, value: f32) {
        if value.is_finite() {
            // 四舍五入到两位小数，避免反复步进累积误差
            let rounded = (value * 100.0).round() / 100.0;
            self.opacity = rounded.clamp(MIN_OPACITY, MAX_OPACITY);
        }
    }

    pub fn step_opacity(&mut self, delta: f32) {
        self.set_opacity(self.opacity + delta);
    }

    /// 数字键：1-9 对应 0.1-0.9，0 对应 1.0
    pub fn set_opacity_digit(&mut self, digit: u8) {
        match digit {
            0 => self.set_opacity(MAX_OPACITY),
            1..=9 => self.set_opacity(digit as f32 / 10.0),
            _ => {}
        }
    }

    /// 是否需要按半透明方式绘制
    pub fn is_translucent(&self) -> bool {
        self.opacity < MAX_OPACITY
    }

    /// 不透明度百分比（叠加层显示用）
    pub fn opacity_percent(&self) -> u32 {
        (self.opacity * 100.0).round() as u32
    }
}
