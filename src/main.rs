mod app;
mod color;
mod state;
mod ui;

use app::NetworkDashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    log::info!("Starting network dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Network Dashboard")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Network Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(NetworkDashboardApp::default()))),
    )
}
