mod app;
mod color;
mod data;
mod state;
mod ui;

use app::SalaryDashApp;
use data::loader::{DATA_URL, DatasetCache};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Fetch and parse before the first frame; the UI only reads the dataset
    // afterwards.
    let cache = DatasetCache::new();
    log::info!("fetching salary data from {DATA_URL}");
    let loaded = cache.get_or_fetch(DATA_URL);
    match &loaded {
        Ok(ds) => log::info!("loaded {} rows ({} skipped)", ds.len(), ds.skipped_rows),
        Err(err) => log::error!("dataset unavailable: {err}"),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    let app = SalaryDashApp::new(AppState::new(loaded));
    eframe::run_native(
        "Data Jobs Salary Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
