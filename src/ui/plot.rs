use eframe::egui::{self, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::data::model::Metric;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Trend chart (central panel)
// ---------------------------------------------------------------------------

/// Metric selector plus one line per school over the years.
pub fn trend_chart(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Þróun yfir ár");

    let current = state.trend_metric;
    egui::ComboBox::from_label("Veldu velferðarbreytu til að skoða")
        .selected_text(current.column())
        .show_ui(ui, |ui: &mut Ui| {
            for metric in Metric::ALL {
                if ui.selectable_label(metric == current, metric.column()).clicked() {
                    state.set_trend_metric(metric);
                }
            }
        });

    ui.label(format!("Þróun yfir ár fyrir {}", state.trend_metric));

    Plot::new("trend_plot")
        .legend(Legend::default())
        .x_axis_label(crate::data::model::YEAR_COLUMN)
        .y_axis_label("Meðaltal")
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .height(360.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &state.views.trend {
                let color = state.series_colors.color_for(&series.school);
                let coords: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .map(|&(year, mean)| [year as f64, mean])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(&series.school)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(&series.school)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
