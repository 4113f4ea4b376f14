//! wgpu 后端设备管理
//!
//! 本模块负责 wgpu 图形设备的初始化和管理，包括：
//! - 创建窗口与表面
//! - 选择适配器，按需开启 `POLYGON_MODE_LINE`
//! - 创建逻辑设备和命令队列
//! - 配置交换链与多重采样

use std::sync::Arc;
use tracing::{debug, info, warn};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use crate::core::error::{GraphicsError, Result};
use crate::core::Config;

/// 深度缓冲格式
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// wgpu 图形后端
///
/// 封装了 wgpu 的核心设备和表面管理。
pub struct WgpuBackend {
    /// 窗口表面
    pub surface: wgpu::Surface<'static>,
    /// 图形适配器（GPU）
    pub adapter: wgpu::Adapter,
    /// 逻辑设备
    pub device: wgpu::Device,
    /// 命令队列
    pub queue: wgpu::Queue,
    /// 表面配置
    pub surface_config: wgpu::SurfaceConfiguration,
    /// 场景绘制的采样数（1 或 4）
    pub sample_count: u32,
    /// 适配器是否支持线模式光栅化
    pub polygon_line_supported: bool,
    window: Arc<Window>,
}

impl WgpuBackend {
    /// 创建窗口并初始化设备
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Initializing wgpu backend");

        debug!("Creating wgpu instance");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
            flags: wgpu::InstanceFlags::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        debug!("Creating window");
        let window = WindowBuilder::new()
            .with_title(config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ))
            .with_resizable(config.window.resizable)
            .build(event_loop)
            .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create window: {}", e)))?;
        let window = Arc::new(window);

        debug!("Creating surface");
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create surface: {}", e)))?;

        debug!("Requesting adapter");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| GraphicsError::DeviceCreation("Failed to find suitable adapter".to_string()))?;

        let adapter_info = adapter.get_info();
        info!(name = %adapter_info.name, backend = ?adapter_info.backend, "Selected adapter");

        // 线框优先使用线模式光栅化，不支持时由渲染器走边索引回退路径
        let polygon_line_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if polygon_line_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            warn!("POLYGON_MODE_LINE unavailable, wireframe uses edge lists");
            wgpu::Features::empty()
        };

        debug!("Requesting device and queue");
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features,
                // 大模型需要适配器允许的最大缓冲尺寸
                required_limits: adapter.limits(),
            },
            None,
        ))
        .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| GraphicsError::SwapchainError("Surface reports no formats".to_string()))?;
        debug!("Surface format: {:?}", surface_format);

        let present_mode = choose_present_mode(config.graphics.vsync, &surface_caps.present_modes);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sample_count = choose_sample_count(
            config.graphics.msaa_samples,
            adapter.get_texture_format_features(surface_format).flags,
        );
        if sample_count != config.graphics.msaa_samples {
            warn!(requested = config.graphics.msaa_samples, "MSAA not supported for surface format, disabled");
        }

        info!(
            present_mode = ?present_mode,
            msaa = sample_count,
            max_texture = device.limits().max_texture_dimension_2d,
            "wgpu backend initialized"
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            sample_count,
            polygon_line_supported,
            window,
        })
    }

    /// 获取窗口引用
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// 重新配置表面（用于窗口调整）
    pub fn reconfigure_surface(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// 当前表面尺寸
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// 纹理最大边长
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// 单个缓冲的最大字节数
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }
}

fn choose_present_mode(vsync: bool, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|m| available.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

fn choose_sample_count(requested: u32, flags: wgpu::TextureFormatFeatureFlags) -> u32 {
    if requested > 1 && flags.sample_count_supported(requested) {
        requested
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode() {
        use wgpu::PresentMode::*;
        assert_eq!(choose_present_mode(true, &[Immediate, Fifo]), Fifo);
        assert_eq!(choose_present_mode(false, &[Fifo, Immediate]), Immediate);
        assert_eq!(choose_present_mode(false, &[Fifo, Mailbox]), Mailbox);
        assert_eq!(choose_present_mode(false, &[Fifo]), Fifo);
    }

    #[test]
    fn test_sample_count() {
        let msaa4 = wgpu::TextureFormatFeatureFlags::MULTISAMPLE_X4;
        assert_eq!(choose_sample_count(4, msaa4), 4);
        assert_eq!(choose_sample_count(4, wgpu::TextureFormatFeatureFlags::empty()), 1);
        assert_eq!(choose_sample_count(1, msaa4), 1);
    }
}
