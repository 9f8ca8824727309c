mod app;
mod assets;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use app::DashboardApp;
use assets::Logo;
use config::DashboardConfig;
use data::loader::DatasetCache;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::default();

    // No dashboard without data: a failed startup load ends the session.
    let mut cache = DatasetCache::default();
    let dataset = cache
        .get_or_load(&config.data_path)
        .with_context(|| format!("loading survey data from {}", config.data_path.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window_title.clone())
            .with_inner_size(config.inner_size)
            .with_min_inner_size(config.min_inner_size),
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let logo = Logo::load_or_skip(&cc.egui_ctx, &config.logo_path);
            let data_path = config.data_path.clone();
            let state = AppState::new(config, cache, dataset, data_path);
            Ok(Box::new(DashboardApp::new(state, logo)))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
