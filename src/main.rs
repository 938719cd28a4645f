mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::DashboardApp;
use eframe::egui;
use state::AppState;

/// Survey export opened when no path is given on the command line.
const DEFAULT_DATASET: &str = "FS_indicators.parquet";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));

    // A dataset that cannot be loaded at startup is fatal.
    let table = data::loader::load_file(&path)
        .map_err(|e| {
            log::error!("Failed to load {}: {e}", path.display());
            e
        })
        .with_context(|| format!("loading survey data from {}", path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Food Security Outcome Indicators Trend",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(AppState::new(table))))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard window: {e}"))
}
