mod app;
mod convert;
mod loader;
mod messages;
mod panels;
mod states;

use std::path::{Path, PathBuf};

use ocrlens_core::config::AppConfig;
use ocrlens_core::consts::CONFIG_FILE_NAME;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {CONFIG_FILE_NAME}: {e}");
            AppConfig::default()
        }
    };
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ocrlens"),
        ..Default::default()
    };

    eframe::run_native(
        "ocrlens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::OcrLensApp::new(
                &cc.egui_ctx,
                &config,
                initial,
            )))
        }),
    )
}
