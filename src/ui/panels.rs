use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::controls::SelectorChange;
use crate::data::model::Metric;
use crate::data::store::OutlierPolicy;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selector widgets
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();
    ui.label("Pick values to update the charts");
    ui.add_space(4.0);

    // Clone what we need so we can mutate state after the widgets.
    let current = *state.binder.selectors();
    let domain = state.binder.domain().clone();
    let top_n = state.binder.top_n();
    let mut pending: Option<SelectorChange> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Bar charts ----
            ui.strong("Bar charts");
            ui.label(RichText::new(format!("Top {top_n} countries by each metric")).weak());
            ui.label("Continent");
            egui::ComboBox::from_id_salt("continent_filter")
                .selected_text(current.continent.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for continent in &domain.continents {
                        if ui
                            .selectable_label(current.continent == *continent, continent.as_str())
                            .clicked()
                        {
                            pending = Some(SelectorChange::Continent(*continent));
                        }
                    }
                });

            ui.add_space(4.0);
            ui.label("Year");
            egui::ComboBox::from_id_salt("year_filter")
                .selected_text(current.year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for year in &domain.years {
                        if ui
                            .selectable_label(current.year == *year, year.to_string())
                            .clicked()
                        {
                            pending = Some(SelectorChange::Year(*year));
                        }
                    }
                });

            ui.separator();

            // ---- World map ----
            ui.strong("World map");
            ui.label("Variable");
            egui::ComboBox::from_id_salt("map_metric_filter")
                .selected_text(current.metric.column())
                .show_ui(ui, |ui: &mut Ui| {
                    for metric in Metric::ALL {
                        if ui
                            .selectable_label(current.metric == metric, metric.column())
                            .clicked()
                        {
                            pending = Some(SelectorChange::Metric(metric));
                        }
                    }
                });
            ui.label(RichText::new("The map follows the year above.").weak());
        });

    if let Some(change) = pending {
        state.select(change);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export chart JSON…").clicked() {
                export_chart_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let store = state.binder.store();
        ui.label(format!(
            "{}: {} rows, {} after outlier removal",
            store.source(),
            store.raw().len(),
            store.cleaned().len()
        ));

        ui.separator();

        ui.label("Outliers removed for:");
        let mut policy = store.policy();
        for option in OutlierPolicy::ALL {
            ui.selectable_value(&mut policy, option, option.to_string());
        }
        if policy != state.binder.store().policy() {
            state.set_policy(policy);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Gapminder data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match state.load_path(&path) {
            Ok(()) => {
                log::info!(
                    "Switched to {} ({} rows)",
                    path.display(),
                    state.binder.store().raw().len()
                );
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn export_chart_dialog(state: &mut AppState) {
    let Some(spec) = state.active_chart() else {
        return;
    };
    let json = match spec.to_json() {
        Ok(json) => json,
        Err(e) => {
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .set_file_name("chart.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = std::fs::write(&path, json) {
            log::error!("Failed to write {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        } else {
            log::info!("Exported {} to {}", state.active_tab, path.display());
        }
    }
}
