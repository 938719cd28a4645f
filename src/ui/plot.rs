use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::pipeline::{DashboardResponse, IndicatorChart};
use crate::state::AppState;

const Y_AXIS_LABEL: &str = "% of Households";

// ---------------------------------------------------------------------------
// Central panel – page heading and the four indicator charts
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn indicator_dashboard(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new("Food Security Outcome Indicators Trend").size(24.0).strong());
        if let Some((first, last)) = state.year_span() {
            ui.label(RichText::new(format!("For the years {first} to {last}")).size(18.0));
        }
    });
    ui.separator();

    let charts = match &state.response {
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view indicators  (File → Open…)");
            });
            return;
        }
        Some(DashboardResponse::EmptySelection) => {
            ui.label("Please select at least one district to display the graphs.");
            return;
        }
        Some(DashboardResponse::Charts { charts, .. }) => charts,
    };

    ui.heading("Graphs");
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // Two charts per row.
            for pair in charts.chunks(2) {
                ui.columns(2, |columns: &mut [Ui]| {
                    for (col, chart) in columns.iter_mut().zip(pair) {
                        indicator_section(col, chart);
                    }
                });
            }
        });
}

fn indicator_section(ui: &mut Ui, chart: &IndicatorChart) {
    let indicator = chart.indicator;
    egui::CollapsingHeader::new(RichText::new(indicator.section_label()).strong())
        .id_salt(indicator.column())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(indicator.title()).strong());
            if chart.rows.is_empty() {
                ui.label("No households with this indicator in the selection.");
                return;
            }
            stacked_bar_chart(ui, chart);

            egui::CollapsingHeader::new("Data")
                .id_salt((indicator.column(), "data"))
                .default_open(false)
                .show(ui, |ui: &mut Ui| data_table(ui, chart));
        });
}

/// Stacked monthly bars, one layer per category in display order.
fn stacked_bar_chart(ui: &mut Ui, chart: &IndicatorChart) {
    let indicator = chart.indicator;
    let series = chart.series();
    let colors = ColorMap::new(indicator, series.iter().map(|s| s.category.as_str()));

    let mut layers: Vec<BarChart> = Vec::with_capacity(series.len());
    for s in &series {
        let bars: Vec<Bar> = s
            .points
            .iter()
            .map(|&(month, pct)| Bar::new(month as f64, pct).name(&s.category))
            .collect();

        let label = indicator.legend_label();
        let layer = {
            let below: Vec<&BarChart> = layers.iter().collect();
            BarChart::new(bars)
                .name(&s.category)
                .color(colors.color_for(&s.category))
                .width(0.7)
                .element_formatter(Box::new(move |bar: &Bar, _: &BarChart| {
                    format!("{label}: {}\nMonth {}\n{:.1}%", bar.name, bar.argument, bar.value)
                }))
                .stack_on(&below)
        };
        layers.push(layer);
    }

    Plot::new(("indicator_plot", indicator.column()))
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Month")
        .y_axis_label(Y_AXIS_LABEL)
        .include_y(0.0)
        .include_y(100.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for layer in layers {
                plot_ui.bar_chart(layer);
            }
        });
}

/// Month / category / percentage rows behind a chart.
fn data_table(ui: &mut Ui, chart: &IndicatorChart) {
    let rows = chart.ordered_rows();
    ui.push_id(chart.indicator.column(), |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Month");
                });
                header.col(|ui| {
                    ui.strong(chart.indicator.legend_label());
                });
                header.col(|ui| {
                    ui.strong(Y_AXIS_LABEL);
                });
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.label(row.month.to_string());
                        });
                        table_row.col(|ui| {
                            ui.label(&row.category);
                        });
                        table_row.col(|ui| {
                            ui.label(format!("{:.1}", row.percentage));
                        });
                    });
                }
            });
    });
}
