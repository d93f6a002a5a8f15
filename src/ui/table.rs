use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use sales_dashboard::data::{AggregateResult, Dataset};
use sales_dashboard::format;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Total sales, units sold and distinct customers side by side.
pub fn metrics(ui: &mut Ui, summary: &AggregateResult) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total sales", format::currency(summary.total));
        metric(&mut cols[1], "Units sold", format::count(summary.quantity));
        metric(&mut cols[2], "Customers", summary.customers.to_string());
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(label);
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Filtered rows
// ---------------------------------------------------------------------------

/// Scrollable table of the filtered records.  Only visible rows are laid out.
pub fn records_table(ui: &mut Ui, filtered: &Dataset) {
    ui.strong(format!("Filtered data ({} rows)", filtered.len()));
    let records = filtered.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .min_scrolled_height(0.0)
        .max_scroll_height(320.0)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder().at_least(120.0))
        .column(Column::auto())
        .column(Column::auto())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for title in ["Date", "Month", "Country", "Customer", "Product", "Quantity", "Total"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let r = &records[row.index()];
                row.col(|ui| {
                    ui.label(r.timestamp.format("%Y-%m-%d %H:%M").to_string());
                });
                row.col(|ui| {
                    ui.label(r.year_month.to_string());
                });
                row.col(|ui| {
                    ui.label(r.country.as_str());
                });
                row.col(|ui| {
                    ui.label(r.customer_id.as_str());
                });
                row.col(|ui| {
                    ui.label(r.product.as_str());
                });
                row.col(|ui| {
                    ui.label(format::count(r.quantity));
                });
                row.col(|ui| {
                    ui.label(format::currency(r.total));
                });
            });
        });
}
