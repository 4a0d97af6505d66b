use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct NetworkDashboardApp {
    pub state: AppState,
}

impl eframe::App for NetworkDashboardApp {
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

        // ---- Central panel: tables, charts, downloads ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central_panel(ui, &mut self.state);
        });
    }
}

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Network Dashboard");

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an XLSX file to start  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(dataset) = &state.dataset {
                tables::filtered_table(ui, dataset, &state.visible_indices);
            }
            ui.separator();

            panels::group_selector(ui, state);
            if let Some(grouped) = &state.grouped {
                tables::grouped_table(ui, grouped);
            }

            ui.separator();
            ui.heading("📊 Network Chart");
            if let Some(charts) = &state.charts {
                plot::chart_grid(ui, charts);
            }

            ui.separator();
            ui.strong("Download:");
            panels::downloads(ui, state);
        });
}
