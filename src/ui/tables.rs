use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};
use network_dashboard::{Dataset, GroupedTable, RecordSource};

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 240.0;

/// The records that pass the sidebar filters.
pub fn filtered_table(ui: &mut Ui, dataset: &Dataset, visible: &[usize]) {
    let columns = dataset.columns().to_vec();
    ui.push_id("filtered_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .columns(TableColumn::auto().at_least(80.0), columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for col in &columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col.header());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, visible.len(), |mut row| {
                    let record = &dataset.records[visible[row.index()]];
                    for &col in &columns {
                        let text = match record.text(col) {
                            Some(text) => text.to_string(),
                            None => record.total_ap.to_string(),
                        };
                        row.col(|ui: &mut Ui| {
                            ui.label(text);
                        });
                    }
                });
            });
    });
}

/// Group key and summed `Total_AP`.
pub fn grouped_table(ui: &mut Ui, table: &GroupedTable) {
    ui.push_id("grouped_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .column(TableColumn::auto().at_least(120.0))
            .column(TableColumn::remainder())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong(table.group_by.header());
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("Total_AP");
                });
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let group = &table.rows[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(&group.key);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(group.total.to_string());
                    });
                });
            });
    });
}
