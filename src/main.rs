mod app;
mod cli;
mod color;
mod state;
mod ui;

use anyhow::{anyhow, Result};
use app::SalesDashboardApp;
use clap::Parser;
use eframe::egui;

use sales_dashboard::asset;
use sales_dashboard::config::DashboardConfig;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = DashboardConfig::load(&args.config)?;

    let banner = match (&config.banner_url, args.no_banner) {
        (Some(url), false) => asset::fetch_decorative_asset(url, config.fetch_timeout())
            .map(|bytes| (asset::banner_uri(url), bytes)),
        _ => None,
    };

    let mut state = AppState::new(config.columns.clone(), banner);
    state.load_initial(args.data.as_deref(), &config.data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the png/gif banner.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(SalesDashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
