//! MeshView 查看器入口
//!
//! # 使用方法
//!
//! ```bash
//! # 自动查找当前目录下的模型（GLB 优先，其次 OBJ、GLTF）
//! cargo run
//!
//! # 指定模型与纹理
//! cargo run -- statue.obj statue.png --rotation-offset 90
//! ```
//!
//! # 初始化流程
//!
//! 1. 解析命令行参数
//! 2. 加载配置文件（config.toml）并应用命令行覆盖
//! 3. 初始化日志系统
//! 4. 确定模型路径（未指定时自动查找）
//! 5. 创建事件循环和渲染器
//! 6. 在后台线程中开始加载
//! 7. 启动主循环

use clap::Parser;
use tracing::{error, info, warn};
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop};

use mesh_view::core::cli::ViewerArgs;
use mesh_view::core::log;
use mesh_view::core::runtime::{spawn_model_load, LoadTracker};
use mesh_view::core::Config;
use mesh_view::geometry::discovery::discover_model;
use mesh_view::geometry::pipeline::ModelRequest;
use mesh_view::gfx::Renderer;
use mesh_view::viewer::Viewer;

fn main() -> anyhow::Result<()> {
    let args = ViewerArgs::parse();

    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default(&args.config);
    config.apply_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 2. 初始化日志系统（使用配置中的设置）
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "MeshView starting...");

    // 3. 确定模型
    let model_path = match args.model.clone() {
        Some(path) => path,
        None => match discover_model(&std::env::current_dir()?) {
            Some(path) => {
                info!(file = %path.display(), "Found model");
                path
            }
            None => {
                eprintln!("ERROR: No 3D model found!");
                eprintln!("Usage: mesh_view <model.glb|obj|gltf> [texture.png]");
                std::process::exit(2);
            }
        },
    };
    if !model_path.exists() {
        warn!(file = %model_path.display(), "File not found");
    }
    // 显式给出的纹理即使不存在也原样传下去，由加载线程报告并跳过，不再自动查找
    if let Some(texture) = args.texture.as_ref().filter(|path| !path.exists()) {
        warn!(texture = %texture.display(), "Texture not found, continuing without texture");
    }

    // 4. 创建事件循环与渲染器
    let event_loop = EventLoop::new()?;
    let renderer = match Renderer::new(&event_loop, &config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize renderer: {}", e);
            eprintln!("Failed to initialize renderer: {}", e);
            std::process::exit(1);
        }
    };
    info!("Renderer initialized successfully");

    // 5. 后台加载
    let tracker = LoadTracker::new();
    let request = ModelRequest {
        model_path,
        texture_path: args.texture.clone(),
        max_texture_dimension: renderer.max_texture_dimension(),
    };
    spawn_model_load(&tracker, request)?;

    let mut viewer = Viewer::new(renderer, tracker, &config, args.rotation_offset);

    // 6. 启动事件循环
    info!("Entering main loop...");
    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => viewer.handle_window_event(&event, elwt),
            Event::AboutToWait => viewer.about_to_wait(),
            _ => (),
        }
    })?;

    Ok(())
}
