use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use network_dashboard::export::{chart_artifact, filtered_artifact, table_artifact};
use network_dashboard::{
    AggregateSource, ExportArtifact, FilterColumn, FilterMode, FilteredView, GroupBy, GroupOrder,
    PieBasis,
};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter:");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the option lists so we can mutate state inside the loop.
    let options: Vec<(FilterColumn, Vec<String>)> = FilterColumn::ALL
        .into_iter()
        .map(|col| (col, dataset.options(col).to_vec()))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, all_values) in &options {
                let col = *col;
                let n_selected = state
                    .filters
                    .selections
                    .get(&col)
                    .map_or(all_values.len(), |s| {
                        all_values.iter().filter(|v| s.contains(*v)).count()
                    });
                let header_text = format!("{}  ({n_selected}/{})", col.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(col == FilterColumn::Status)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .filters
                                .selections
                                .get(&col)
                                .map_or(true, |s| s.contains(val));
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
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
        });

        ui.menu_button("Options", |ui: &mut Ui| {
            let mut changed = false;

            let and_mode = state.filters.mode == FilterMode::All;
            if ui.selectable_label(and_mode, "Match all filters (AND)").clicked() {
                state.filters.mode = if and_mode { FilterMode::Any } else { FilterMode::All };
                changed = true;
            }

            let filtered = state.options.aggregate_source == AggregateSource::Filtered;
            if ui.selectable_label(filtered, "Aggregate filtered rows only").clicked() {
                state.options.aggregate_source = if filtered {
                    AggregateSource::Dataset
                } else {
                    AggregateSource::Filtered
                };
                changed = true;
            }

            let raw = state.options.pie_basis == PieBasis::RawRows;
            if ui.selectable_label(raw, "Pie from raw rows").clicked() {
                state.options.pie_basis = if raw { PieBasis::Grouped } else { PieBasis::RawRows };
                changed = true;
            }

            let sorted = state.options.group_order == GroupOrder::Sorted;
            if ui.selectable_label(sorted, "Sort groups by key").clicked() {
                state.options.group_order = if sorted {
                    GroupOrder::FirstSeen
                } else {
                    GroupOrder::Sorted
                };
                changed = true;
            }

            if changed {
                state.recompute();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} access points loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel sections
// ---------------------------------------------------------------------------

/// "What would you like to analyse?"
pub fn group_selector(ui: &mut Ui, state: &mut AppState) {
    let current = state.group_by;
    let mut chosen = current;
    egui::ComboBox::from_label("What would you like to analyse?")
        .selected_text(current.header())
        .show_ui(ui, |ui: &mut Ui| {
            for group_by in GroupBy::ALL {
                ui.selectable_value(&mut chosen, group_by, group_by.header());
            }
        });
    state.set_group_by(chosen);
}

/// Download buttons for the grouped table, the filtered rows and each chart.
pub fn downloads(ui: &mut Ui, state: &mut AppState) {
    let (Some(dataset), Some(grouped), Some(charts)) =
        (&state.dataset, &state.grouped, &state.charts)
    else {
        return;
    };

    let mut requested = None;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        if ui.button("Updated Excel File").clicked() {
            requested = Some(table_artifact(grouped));
        }
        if ui.button("Filtered Rows").clicked() {
            let view = FilteredView::new(dataset, &state.filters);
            requested = Some(filtered_artifact(&view));
        }
        for chart in charts.iter() {
            if ui.button(chart.kind.label()).clicked() {
                requested = Some(chart_artifact(chart, &state.options.plotly_cdn));
            }
        }
    });

    match requested {
        Some(Ok(artifact)) => save_file_dialog(state, artifact),
        Some(Err(e)) => state.report_error("Export failed", e),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose XLSX file")
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match network_dashboard::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => state.report_error("Failed to load file", e),
        }
    }
}

fn save_file_dialog(state: &mut AppState, artifact: ExportArtifact) {
    let ext = artifact.filename.rsplit('.').next().unwrap_or_default().to_string();
    let file = rfd::FileDialog::new()
        .set_title("Save download")
        .set_file_name(&artifact.filename)
        .add_filter(artifact.mime, &[ext.as_str()])
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, &artifact.bytes) {
            Ok(()) => {
                log::info!("Saved {} bytes to {}", artifact.bytes.len(), path.display());
                state.status_message = None;
            }
            Err(e) => state.report_error("Failed to save file", e),
        }
    }
}
