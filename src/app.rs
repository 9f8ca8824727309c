use eframe::egui;

use crate::assets::Logo;
use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    pub logo: Option<Logo>,
}

impl DashboardApp {
    pub fn new(state: AppState, logo: Option<Logo>) -> Self {
        Self { state, logo }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: caption ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, self.logo.as_ref());
            });

        // ---- Central panel: tables and trend chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    tables::header(ui, &self.state, self.logo.as_ref());
                    tables::yearly_means(ui, &self.state);
                    tables::strengths_and_challenges(ui, &self.state);
                    tables::school_comparison(ui, &self.state);
                    plot::trend_chart(ui, &mut self.state);
                });
        });
    }
}
