use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GapminderApp {
    pub state: AppState,
}

impl GapminderApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for GapminderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs + active chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::chart_tabs(ui, &mut self.state);
        });
    }
}
