use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use sales_dashboard::data::AggregateResult;
use sales_dashboard::format;

use crate::color::ColorMap;

const CHART_HEIGHT: f32 = 260.0;
const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180);
const LINE_COLOR: Color32 = Color32::from_rgb(255, 165, 0);

// ---------------------------------------------------------------------------
// Charts (central panel)
// ---------------------------------------------------------------------------

/// Bar chart of total sales per calendar month.
pub fn monthly_sales(ui: &mut Ui, summary: &AggregateResult) {
    ui.strong("Total sales per month");
    let labels = summary.by_month.iter().map(|(m, _)| m.to_string()).collect();
    let values: Vec<f64> = summary.by_month.iter().map(|(_, v)| *v).collect();
    category_bars(ui, "monthly_sales", labels, &values, "Total sales");
}

/// Bar chart of units sold per product.
pub fn product_quantities(ui: &mut Ui, summary: &AggregateResult) {
    ui.strong("Quantity sold per product");
    let labels = summary.by_product.iter().map(|(p, _)| p.clone()).collect();
    let values: Vec<f64> = summary.by_product.iter().map(|(_, v)| *v).collect();
    category_bars(ui, "product_quantities", labels, &values, "Quantity");
}

/// Pie chart of each country's share of total sales.
pub fn country_share(ui: &mut Ui, summary: &AggregateResult, colors: &ColorMap) {
    ui.strong("Sales per country");

    // Negative totals (returns) cannot be drawn as slices.
    let slices: Vec<(&str, f64)> = summary
        .by_country
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(c, v)| (c.as_str(), *v))
        .collect();
    let whole = slices.iter().fold(0.0, |acc, (_, v)| acc + v);

    Plot::new("country_share")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = FRAC_PI_2;
            for (country, value) in &slices {
                let sweep = value / whole * TAU;
                let color = colors.color_for(country);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(pie_slice(start, sweep)))
                        .name(country)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, color)),
                );

                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(format::percent(*value, whole)).color(Color32::WHITE),
                ));
                start += sweep;
            }
        });
}

/// Line chart of total sales per calendar quarter.
pub fn quarterly_sales(ui: &mut Ui, summary: &AggregateResult) {
    ui.strong("Quarterly sales");
    let labels: Vec<String> = summary.by_quarter.iter().map(|(q, _)| q.to_string()).collect();
    let points: Vec<[f64; 2]> = summary
        .by_quarter
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();

    Plot::new("quarterly_sales")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sales")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Sales")
                    .color(LINE_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(LINE_COLOR)
                    .radius(3.0),
            );
        });
}

/// Stacked bars: total sales per product, one stack segment per country.
pub fn product_country_sales(ui: &mut Ui, summary: &AggregateResult, colors: &ColorMap) {
    ui.strong("Sales per product and country");
    let tab = &summary.by_product_country;

    let mut charts: Vec<BarChart> = Vec::with_capacity(tab.columns.len());
    for (ci, country) in tab.columns.iter().enumerate() {
        let bars = tab
            .values
            .iter()
            .enumerate()
            .map(|(pi, row)| Bar::new(pi as f64, row[ci]).width(0.7))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(country)
            .color(colors.color_for(country))
            .stack_on(&below);
        charts.push(chart);
    }

    let labels = tab.rows.clone();
    Plot::new("product_country_sales")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sales")
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// -- helpers --

fn category_bars(ui: &mut Ui, id: &str, labels: Vec<String>, values: &[f64], y_label: &str) {
    let bars = values
        .iter()
        .zip(&labels)
        .enumerate()
        .map(|(i, (v, label))| Bar::new(i as f64, *v).name(label).width(0.7))
        .collect();
    let chart = BarChart::new(bars).color(BAR_COLOR);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Axis label for a category index; blank between integer ticks.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Closed polygon for one pie slice of the unit circle.
fn pie_slice(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 128.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push([angle.cos(), angle.sin()]);
    }
    points
}
