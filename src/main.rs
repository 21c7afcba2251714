use anyhow::Result;
use eframe::egui;

use gapminder_dash::app::GapminderApp;
use gapminder_dash::config::DashboardConfig;
use gapminder_dash::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Startup failed: {e}");
            return Err(e.into());
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gapminder Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(GapminderApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}
