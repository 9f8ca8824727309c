use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::assets::Logo;
use crate::data::filter::Selection;
use crate::data::model::ALL_LABEL;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selector widgets
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, logo: Option<&Logo>) {
    // ---- Logo (centered) ----
    if let Some(logo) = logo {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                logo.image()
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0)
                    .corner_radius(4.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Valmöguleikar");
    ui.separator();

    // Clone the handle so we can mutate state inside the loops.
    let dataset = state.dataset.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- School (single choice) ----
            ui.strong("Veldu skóla");
            let current_school = state.selected_school().to_string();
            egui::ComboBox::from_id_salt("school")
                .selected_text(&current_school)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for school in &dataset.schools {
                        if ui
                            .selectable_label(current_school == *school, school)
                            .clicked()
                        {
                            state.select_school(school);
                        }
                    }
                });
            ui.separator();

            // ---- Years (multi choice) ----
            let n_selected = dataset
                .years
                .iter()
                .filter(|y| state.is_year_selected(**y))
                .count();
            egui::CollapsingHeader::new(
                RichText::new(format!("Veldu ár  ({n_selected}/{})", dataset.years.len())).strong(),
            )
            .id_salt("years")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("Öll").clicked() {
                        state.select_all_years();
                    }
                    if ui.small_button("Ekkert").clicked() {
                        state.select_no_years();
                    }
                });
                for &year in &dataset.years {
                    let mut checked = state.is_year_selected(year);
                    if ui.checkbox(&mut checked, year.to_string()).changed() {
                        state.toggle_year(year);
                    }
                }
            });
            ui.separator();

            // ---- Demographics (single choice, only for columns in the file) ----
            for demographic in dataset.supported.iter() {
                let Some(values) = dataset.options.get(&demographic) else {
                    continue;
                };
                let current = state.criteria.selection(demographic).clone();

                ui.strong(demographic.label());
                egui::ComboBox::from_id_salt(demographic.column())
                    .selected_text(current.label())
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        let labels =
                            std::iter::once(ALL_LABEL).chain(values.iter().map(String::as_str));
                        for label in labels {
                            let selection = Selection::from_label(label);
                            if ui.selectable_label(current == selection, label).clicked() {
                                state.set_demographic(demographic, selection);
                            }
                        }
                    });
                ui.add_space(4.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Skrá", |ui: &mut Ui| {
            if ui.button("Opna…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} svör, {} í vali",
            state.dataset_path.display(),
            state.dataset.len(),
            state.views.visible_rows
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Render the bottom caption.
pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.small("© Samband sveitarfélaga á Suðurnesjum – Mælaborð fyrir farsæld barna og ungmenna");
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Opna könnunargögn")
        .add_filter("Studdar skrár", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
