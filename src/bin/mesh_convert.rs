//! OBJ → GLB 转换器
//!
//! ```bash
//! mesh_convert scans/statue.obj            # 输出 scans/statue.glb
//! mesh_convert scans/statue.obj out.glb
//! ```

use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

use mesh_view::convert::ConverterService;
use mesh_view::core::cli::ConvertArgs;
use mesh_view::core::log;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    let args = ConvertArgs::parse();
    log::init_logger(args.log_level, false, None);

    let input = args.input.clone();
    let output = args.output_path();
    info!(input = %input.display(), output = %output.display(), "MeshView converter");

    let service = ConverterService::new();
    let handle = service.spawn(input, output.clone())?;

    // 轮询阶段变化并输出进度
    let mut last_stage = None;
    while service.is_busy() {
        let stage = service.stage();
        if stage != last_stage {
            if let Some(stage) = stage {
                info!(stage = stage.label(), progress = %format!("{:.0}%", stage.fraction() * 100.0), "Conversion stage");
            }
            last_stage = stage;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let result = handle
        .join()
        .map_err(|_| anyhow::anyhow!("converter thread terminated unexpectedly"))?;

    match result {
        Ok(report) => {
            info!("Saved {}", output.display());
            println!("{}", report);
            Ok(())
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            eprintln!("Conversion failed: {}", e);
            std::process::exit(1);
        }
    }
}
