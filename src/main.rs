// Declare modules before use
mod api;
mod app;
mod config;
mod controller;
mod render;
mod session;

use anyhow::{anyhow, Context};
use api::http::HttpBackend;
use app::DraftDeskApp;
use crate::config::AppConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    // --- Load .env file at the very beginning ---
    let dotenv = dotenvy::dotenv();

    env_logger::init();
    match dotenv {
        Ok(path) => log::info!("Loaded .env file from: {:?}", path),
        Err(_) => log::info!("No .env file loaded; using config files and environment."),
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    let backend = HttpBackend::new(&config.backend).context("Invalid backend configuration")?;
    let tokio_rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    log::info!("Using drafting backend at {}", backend.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([700.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Draft Desk",
        options,
        Box::new(move |cc| Ok(Box::new(DraftDeskApp::new(cc, backend, tokio_rt)))),
    )
    .map_err(|e| anyhow!("UI exited with an error: {}", e))
}
