use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use object_detection::cli::Args;
use object_detection::detection::{download, model};
use object_detection::display::open_display;
use object_detection::source::load_source;
use object_detection::{pipeline, DetectionModel};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let model_config = args.model_config();
    let run_config = args.run_config();

    let device = model::init_runtime(model_config.device)
        .context("failed to initialise ONNX Runtime")?;
    info!("Using device: {device}");

    download::ensure_model(&model_config.model_path, &args.download_url)
        .with_context(|| format!("model {:?} is unavailable", model_config.model_path))?;

    let mut detector = DetectionModel::new(model_config).context("failed to load model")?;

    let source = load_source(&args.source)
        .with_context(|| format!("failed to open source {:?}", args.source))?;

    let mut display = open_display(&run_config.window_title, args.headless);

    let summary = pipeline::run(source, &mut detector, display.as_mut(), &run_config)?;
    if let Some(path) = &summary.saved {
        info!("Last annotated frame written to {path:?}");
    }

    info!("Detection completed successfully.");
    Ok(())
}
