use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use crate::binder::ChartSlot;
use crate::chart::spec::{BarChartSpec, ChoroplethSpec, NoDataSpec, TableSpec};
use crate::chart::ChartSpec;
use crate::color::Rgb;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: tab strip + active chart
// ---------------------------------------------------------------------------

/// Render the tab strip and whichever chart is active.
pub fn chart_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for slot in ChartSlot::ALL {
            ui.selectable_value(&mut state.active_tab, slot, slot.label());
        }
    });
    ui.separator();

    match state.active_chart() {
        Some(ChartSpec::RankedBar(spec)) => bar_chart(ui, spec),
        Some(ChartSpec::Choropleth(spec)) => choropleth(ui, spec),
        Some(ChartSpec::Table(spec)) => data_table(ui, spec),
        Some(ChartSpec::NoData(spec)) => no_data(ui, spec),
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Nothing to show yet");
            });
        }
    }
}

fn no_data(ui: &mut Ui, spec: &NoDataSpec) {
    if !spec.title.is_empty() {
        ui.heading(&spec.title);
    }
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(&spec.message).size(18.0).weak());
    });
}

// ---------------------------------------------------------------------------
// Ranked bar chart
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, spec: &BarChartSpec) {
    ui.heading(&spec.title);

    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.value)
                .name(&b.category)
                .fill(b.color.to_color32())
                .width(0.7)
        })
        .collect();

    let axis_labels: Vec<String> = spec.bars.iter().map(|b| b.category.clone()).collect();

    Plot::new("ranked_bar_chart")
        .legend(egui_plot::Legend::default())
        .x_axis_label(spec.category_axis.clone())
        .y_axis_label(spec.metric.column())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            axis_labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, b) in spec.bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, b.value), b.label.clone())
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Choropleth: one colour-graded tile per ISO-3 region
// ---------------------------------------------------------------------------

const TILE: Vec2 = Vec2::new(58.0, 34.0);

fn text_color_on(fill: Rgb) -> Color32 {
    let [r, g, b] = fill.0;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn choropleth(ui: &mut Ui, spec: &ChoroplethSpec) {
    ui.heading(&spec.title);
    color_legend(ui, spec);
    ui.add_space(6.0);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for region in &spec.regions {
                    let (rect, response) = ui.allocate_exact_size(TILE, Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 3.0, region.color.to_color32());
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        &region.iso_alpha,
                        FontId::proportional(13.0),
                        text_color_on(region.color),
                    );
                    response.on_hover_text(format!(
                        "{}\n{}: {:.2}",
                        region.country, spec.metric, region.value
                    ));
                }
            });
        });
}

fn color_legend(ui: &mut Ui, spec: &ChoroplethSpec) {
    const STEPS: usize = 48;
    let (min, max) = spec.color_domain;

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{min:.1}"));
        let (rect, _) = ui.allocate_exact_size(Vec2::new(240.0, 14.0), Sense::hover());
        let step_width = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let t = i as f64 / (STEPS - 1) as f64;
            let x0 = rect.left() + i as f32 * step_width;
            let cell = egui::Rect::from_min_size(
                egui::pos2(x0, rect.top()),
                Vec2::new(step_width + 0.5, rect.height()),
            );
            ui.painter()
                .rect_filled(cell, 0.0, spec.scale.sample(t).to_color32());
        }
        ui.label(format!("{max:.1}"));
        ui.label(RichText::new(format!("{} ({})", spec.metric, spec.scale.name())).weak());
    });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, spec: &TableSpec) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(80.0), spec.columns.len())
        .header(22.0, |mut header| {
            for name in &spec.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, spec.rows.len(), |mut row| {
                let cells = &spec.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
