use density_lookup::app::DensityLookupApp;
use density_lookup::config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let cfg = config::load_or_default().unwrap_or_else(|e| {
        log::error!("{e}; falling back to default settings");
        config::Config::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Density-Temperature Lookup",
        options,
        Box::new(move |_cc| Ok(Box::new(DensityLookupApp::new(cfg)))),
    )
}
