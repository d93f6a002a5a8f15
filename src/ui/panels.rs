use eframe::egui::{self, load::Bytes, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use sales_dashboard::data::filter::ALL_LABEL;
use sales_dashboard::data::Selection;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Banner (centered, only when the download succeeded) ----
    if let Some((uri, bytes)) = &state.banner {
        let image = egui::Image::from_bytes(uri.clone(), Bytes::Shared(bytes.clone()));
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                image
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let options = &state.options;
    let criteria = &mut state.criteria;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Date range").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                        ui.label("From");
                        ui.add(
                            DatePickerButton::new(&mut criteria.date_range.start)
                                .id_salt("date_from"),
                        );
                        ui.end_row();
                        ui.label("To");
                        ui.add(
                            DatePickerButton::new(&mut criteria.date_range.end).id_salt("date_to"),
                        );
                        ui.end_row();
                    });
                });

            selection_group(ui, "Country", &mut criteria.country, &options.countries);
            selection_group(ui, "Customer", &mut criteria.customer, &options.customers);
            selection_group(ui, "Product", &mut criteria.product, &options.products);

            ui.separator();
            if ui.button("Reset filters").clicked() {
                reset = true;
            }
        });

    if reset {
        state.reset_filters();
    }
}

/// Collapsible combo box offering "All" followed by every distinct value.
fn selection_group(ui: &mut Ui, title: &str, selection: &mut Selection, values: &[String]) {
    let header = match selection {
        Selection::All => title.to_string(),
        Selection::Only(v) => format!("{title}  ({v})"),
    };
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::ComboBox::from_id_salt(format!("{title}_choice"))
                .selected_text(selection.label().to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(selection, Selection::All, ALL_LABEL);
                    for v in values {
                        ui.selectable_value(selection, Selection::Only(v.clone()), v.as_str());
                    }
                });
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

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.current().map_or(0, |(filtered, _)| filtered.len());
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!("{name}: {} records loaded, {visible} visible", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
