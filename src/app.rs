use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Filters may have changed above; recompute before drawing results.
        self.state.refresh();

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some((filtered, summary)) = state.current() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to start  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Sales dashboard");
            ui.label("Sales summary and performance");
            ui.add_space(6.0);

            table::metrics(ui, summary);
            ui.add_space(8.0);

            ui.columns(2, |cols| {
                plot::monthly_sales(&mut cols[0], summary);
                plot::country_share(&mut cols[1], summary, &state.country_colors);
            });
            ui.add_space(8.0);

            ui.columns(2, |cols| {
                plot::product_quantities(&mut cols[0], summary);
                plot::quarterly_sales(&mut cols[1], summary);
            });
            ui.add_space(8.0);

            plot::product_country_sales(ui, summary, &state.country_colors);
            ui.add_space(8.0);

            table::records_table(ui, filtered);
        });
}
