use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::pipeline::DashboardResponse;
use crate::state::AppState;

/// A filter change requested by a widget this frame.
enum FilterAction {
    Year(i32),
    Region(String),
    ToggleDistrict(String),
    AllDistricts,
    NoDistricts,
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(selection) = &state.selection else {
        ui.label("No dataset loaded.");
        return;
    };

    // Options depend on the current selection; compute before any mutation.
    let years = state.table.years();
    let regions = state.table.regions_in_year(selection.year);
    let districts = state.table.districts_in_region(&selection.region);
    let mut action = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select year:");
            egui::ComboBox::from_id_salt("year")
                .selected_text(selection.year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &years {
                        if ui
                            .selectable_label(selection.year == year, year.to_string())
                            .clicked()
                        {
                            action = Some(FilterAction::Year(year));
                        }
                    }
                });
            ui.add_space(4.0);

            ui.strong("Select region:");
            egui::ComboBox::from_id_salt("region")
                .selected_text(&selection.region)
                .show_ui(ui, |ui: &mut Ui| {
                    for region in &regions {
                        if ui
                            .selectable_label(selection.region == *region, region)
                            .clicked()
                        {
                            action = Some(FilterAction::Region(region.clone()));
                        }
                    }
                });
            ui.separator();

            let header_text = format!(
                "Select District:  ({}/{})",
                selection.districts.len(),
                districts.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("districts")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            action = Some(FilterAction::AllDistricts);
                        }
                        if ui.small_button("None").clicked() {
                            action = Some(FilterAction::NoDistricts);
                        }
                    });

                    for district in &districts {
                        let mut checked = selection.districts.contains(district);
                        if ui.checkbox(&mut checked, district).changed() {
                            action = Some(FilterAction::ToggleDistrict(district.clone()));
                        }
                    }
                });
        });

    // At most one widget changes per frame; apply it now the borrow is over.
    match action {
        Some(FilterAction::Year(year)) => state.set_year(year),
        Some(FilterAction::Region(region)) => state.set_region(&region),
        Some(FilterAction::ToggleDistrict(district)) => state.toggle_district(&district),
        Some(FilterAction::AllDistricts) => state.select_all(),
        Some(FilterAction::NoDistricts) => state.select_none(),
        None => {}
    }
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

        let selected = match &state.response {
            Some(DashboardResponse::Charts { households, .. }) => *households,
            _ => 0,
        };
        ui.label(format!(
            "{} households loaded, {} selected",
            state.table.len(),
            selected
        ));

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
        .set_title("Open survey data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
