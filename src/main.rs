mod app;
mod cli;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use serde::Serialize;

use agri_climate_dash::data::loader::load_file;
use agri_climate_dash::data::model::FilterSelection;
use agri_climate_dash::data::views::{DerivedViews, compute_views};
use agri_climate_dash::presentation::{Dashboard, DeviceClass, present};

use app::DashboardApp;
use cli::CliArgs;
use state::AppState;

/// Everything `--headless` prints.
#[derive(Serialize)]
struct HeadlessReport<'a> {
    selection: &'a FilterSelection,
    views: &'a DerivedViews,
    dashboard: &'a Dashboard,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    // The dashboard cannot do anything useful without its table.
    let table = load_file(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let selection = args.initial_selection(&table);

    if args.headless {
        let selection = selection.context("no selection: the data file has no rows")?;
        let device = if args.mobile {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        };
        let views = compute_views(&table, &selection);
        let dashboard = present(&views, &selection, device);
        let report = HeadlessReport {
            selection: &selection,
            views: &views,
            dashboard: &dashboard,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut state = AppState::new(table, selection);
    state.force_mobile = args.mobile;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pakistan Agri-Climate Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
