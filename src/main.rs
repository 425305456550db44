#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod engine;
mod error;
mod io;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Operational Approach Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Operational Approach Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::OpApproachApp::new(cc)))),
    )
}
