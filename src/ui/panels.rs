use eframe::egui::{self, Color32, RichText, Ui};

use agri_climate_dash::presentation::DeviceClass;

use crate::state::AppState;

pub const FOOTER_TEXT: &str = "Data Source: Zenodo (Crops & Climate), Analysis by Gojo";

// ---------------------------------------------------------------------------
// Filter widgets
// ---------------------------------------------------------------------------

/// Province / crop dropdowns and the year slider.
fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    let Some(selection) = state.selection.clone() else {
        ui.label("No data loaded.");
        return;
    };

    // Clone the domains so the state can be mutated inside the closures.
    let table = state.table.clone();

    ui.label("Province:");
    egui::ComboBox::from_id_salt("province-dropdown")
        .selected_text(&selection.province)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for province in table.provinces() {
                if ui
                    .selectable_label(selection.province == *province, province)
                    .clicked()
                {
                    state.set_province(province);
                }
            }
        });
    ui.add_space(6.0);

    ui.label("Crop:");
    egui::ComboBox::from_id_salt("crop-dropdown")
        .selected_text(&selection.crop)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for crop in table.crops() {
                if ui.selectable_label(selection.crop == *crop, crop).clicked() {
                    state.set_crop(crop);
                }
            }
        });
    ui.add_space(6.0);

    ui.label("Year:");
    if let Some((min, max)) = table.year_bounds() {
        let mut year = selection.year;
        let slider = egui::Slider::new(&mut year, min..=max)
            .step_by(1.0)
            .clamping(egui::SliderClamping::Always);
        // Gap years snap to the nearest year present in the table.
        if ui.add(slider).changed() {
            state.set_year(year);
        }
    }
}

/// Desktop: filters in the left side panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();
    filter_widgets(ui, state);
}

/// Mobile: a "Filters" toggle that expands the widgets in place.
pub fn mobile_filter_panel(ui: &mut Ui, state: &mut AppState) {
    let arrow = if state.filters_open { "▾" } else { "▸" };
    if ui
        .button(RichText::new(format!("{arrow} Filters")).strong())
        .clicked()
    {
        state.toggle_filters();
    }
    if state.filters_open {
        ui.add_space(4.0);
        filter_widgets(ui, state);
        ui.add_space(4.0);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title, menu and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(views) = &state.views {
            ui.label(format!(
                "{} observations loaded, {} in view",
                state.table.len(),
                views.yield_history.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    let compact = state.device == DeviceClass::Mobile;
    ui.vertical_centered(|ui: &mut Ui| {
        let size = if compact { 18.0 } else { 24.0 };
        ui.label(RichText::new("🌾 Pakistan Agriculture & Climate Dashboard").size(size).strong());
        if !compact {
            ui.label(
                "Interactive visualization of crop yield trends and climate impacts across Pakistan's provinces.",
            );
        }
    });
}

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(FOOTER_TEXT).small().weak());
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open agri-climate data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
