use std::fmt::Display;

use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::assets::Logo;
use crate::color::{metric_color, PRIMARY_COLOR};
use crate::data::aggregate::{format_scores, MetricMeans, MetricScore, YearlyMeans};
use crate::data::model::{Metric, SCHOOL_COLUMN, YEAR_COLUMN};
use crate::state::AppState;
use crate::ui::NO_DATA_ADVISORY;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui, state: &AppState, logo: Option<&Logo>) {
    if let Some(logo) = logo {
        ui.add(logo.image().max_width(100.0));
    }
    ui.heading(
        RichText::new("Mælaborð um líðan barna á Suðurnesjum")
            .size(26.0)
            .color(PRIMARY_COLOR),
    );
    ui.label(RichText::new(format!("Skóli: {}", state.selected_school())).size(18.0).strong());
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Filtered detail: yearly means
// ---------------------------------------------------------------------------

pub fn yearly_means(ui: &mut Ui, state: &AppState) {
    ui.heading("Meðaltal velferðarþátta");
    match &state.views.yearly {
        YearlyMeans::Table(table) => means_table(ui, "yearly_means", YEAR_COLUMN, &table.rows),
        YearlyMeans::NoData => {
            let warn = ui.visuals().warn_fg_color;
            ui.colored_label(warn, NO_DATA_ADVISORY);
        }
    }
    ui.add_space(12.0);
}

// ---------------------------------------------------------------------------
// Unfiltered baseline: strengths / challenges and comparison
// ---------------------------------------------------------------------------

pub fn strengths_and_challenges(ui: &mut Ui, state: &AppState) {
    let n = state.config.ranking_size;
    ui.heading(format!("Top {n} styrkleikar og áskoranir"));

    for ranking in &state.views.rankings {
        ui.label(RichText::new(format!("{}:", ranking.school)).strong());
        scores_line(ui, "Styrkleikar", &ranking.strengths);
        scores_line(ui, "Áskoranir", &ranking.challenges);
        ui.add_space(4.0);
    }
    ui.add_space(12.0);
}

fn scores_line(ui: &mut Ui, title: &str, scores: &[MetricScore]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("  •");
        ui.label(RichText::new(format!("{title}:")).strong());
        match scores.first() {
            // Tint the line with the colour of the leading metric.
            Some(lead) => {
                ui.label(RichText::new(format_scores(scores)).color(metric_color(lead.metric)));
            }
            None => {
                ui.label("–");
            }
        }
    });
}

pub fn school_comparison(ui: &mut Ui, state: &AppState) {
    ui.heading("Samanburður milli skóla");
    means_table(ui, "school_comparison", SCHOOL_COLUMN, &state.views.comparison.rows);
    ui.add_space(12.0);
}

// ---------------------------------------------------------------------------
// Shared means table
// ---------------------------------------------------------------------------

fn means_table<K: Display>(ui: &mut Ui, id: &str, key_header: &str, rows: &[(K, MetricMeans)]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(110.0))
            .columns(Column::auto().at_least(90.0), Metric::ALL.len())
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong(key_header);
                });
                for metric in Metric::ALL {
                    header.col(|ui: &mut Ui| {
                        ui.strong(metric.column());
                    });
                }
            })
            .body(|mut body| {
                for (key, means) in rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(key.to_string());
                        });
                        for (_, mean) in means.iter() {
                            row.col(|ui: &mut Ui| {
                                ui.label(format_mean(mean));
                            });
                        }
                    });
                }
            });
    });
}

fn format_mean(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("{v:.2}"),
        None => "–".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_means_render_as_dash() {
        assert_eq!(format_mean(Some(8.0)), "8.00");
        assert_eq!(format_mean(Some(1.333)), "1.33");
        assert_eq!(format_mean(None), "–");
    }
}
