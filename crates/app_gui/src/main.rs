mod app;

use app::UiApp;
use eframe::{NativeOptions, egui};
use skin_core::EngineConfig;

fn main() {
    tracing_subscriber::fmt::init();

    let config = match EngineConfig::load_or_default(EngineConfig::FILE_NAME) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("{e:#}; using default timing");
            EngineConfig::default()
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([880.0, 820.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "Jiabao Klinik",
        options,
        Box::new(move |cc| Ok(Box::new(UiApp::new(cc, config)))),
    ) {
        eprintln!("Aplikasi berhenti dengan kesalahan: {e}");
    }
}
