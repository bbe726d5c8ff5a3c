use std::path::Path;
use std::sync::Arc;

use agri_climate_dash::color::ColorMap;
use agri_climate_dash::data::loader::load_file;
use agri_climate_dash::data::model::{FilterSelection, Metric, ObservationTable};
use agri_climate_dash::data::views::{DerivedViews, compute_views};
use agri_climate_dash::presentation::{Dashboard, DeviceClass, present};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table; read-only once loaded.
    pub table: Arc<ObservationTable>,

    /// Current dropdown / slider values.
    pub selection: Option<FilterSelection>,

    /// Rendering mode derived from the viewport (or forced from the CLI).
    pub device: DeviceClass,

    /// Keep `device` at Mobile regardless of the viewport width.
    pub force_mobile: bool,

    /// Whether the collapsible mobile filter panel is expanded.
    pub filters_open: bool,

    /// Output of the last recompute.
    pub views: Option<DerivedViews>,
    pub dashboard: Option<Dashboard>,

    /// Colours for provinces (box plot) and climate metrics (trend lines).
    pub province_colors: ColorMap,
    pub metric_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: ObservationTable, selection: Option<FilterSelection>) -> Self {
        let mut state = Self {
            table: Arc::new(ObservationTable::default()),
            selection: None,
            device: DeviceClass::Desktop,
            force_mobile: false,
            filters_open: false,
            views: None,
            dashboard: None,
            province_colors: ColorMap::default(),
            metric_colors: ColorMap::new(Metric::CLIMATE.iter().map(|m| m.column_name())),
            status_message: None,
        };
        state.set_table(table, selection);
        state
    }

    /// Ingest a newly loaded table, reset the selection and recompute.
    /// `selection` overrides the table's default selection.
    pub fn set_table(&mut self, table: ObservationTable, selection: Option<FilterSelection>) {
        self.province_colors = ColorMap::new(table.provinces().iter().map(String::as_str));
        self.selection = selection.or_else(|| table.default_selection());
        self.table = Arc::new(table);
        self.status_message = None;
        self.recompute();
    }

    /// Load a file picked at runtime. Failures keep the current table.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => self.set_table(table, None),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Rebuild views and chart specs from the current inputs.
    pub fn recompute(&mut self) {
        match &self.selection {
            Some(selection) => {
                let views = compute_views(&self.table, selection);
                self.dashboard = Some(present(&views, selection, self.device));
                self.views = Some(views);
            }
            None => {
                self.views = None;
                self.dashboard = None;
            }
        }
    }

    pub fn set_province(&mut self, province: &str) {
        if let Some(sel) = &mut self.selection {
            if sel.province != province {
                sel.province = province.to_string();
                self.recompute();
            }
        }
    }

    pub fn set_crop(&mut self, crop: &str) {
        if let Some(sel) = &mut self.selection {
            if sel.crop != crop {
                sel.crop = crop.to_string();
                self.recompute();
            }
        }
    }

    pub fn set_year(&mut self, year: i32) {
        let Some(year) = self.table.nearest_year(year) else {
            return;
        };
        if let Some(sel) = &mut self.selection {
            if sel.year != year {
                sel.year = year;
                self.recompute();
            }
        }
    }

    /// Re-derive the device class from the viewport width. Only labels and
    /// sizes depend on it, so the views themselves are kept.
    pub fn update_viewport(&mut self, width: f32) {
        let device = if self.force_mobile {
            DeviceClass::Mobile
        } else {
            DeviceClass::from_viewport_width(width)
        };
        if device != self.device {
            log::debug!("Viewport {width:.0}pt → {device:?}");
            self.device = device;
            if let (Some(views), Some(selection)) = (&self.views, &self.selection) {
                self.dashboard = Some(present(views, selection, device));
            }
        }
    }

    pub fn toggle_filters(&mut self) {
        self.filters_open = !self.filters_open;
    }
}

#[cfg(test)]
mod tests {
    use agri_climate_dash::data::model::Observation;

    use super::*;

    fn row(province: &str, crop: &str, year: i32, yield_: f64) -> Observation {
        Observation {
            province: province.to_string(),
            crop: crop.to_string(),
            year,
            yield_,
            temperature_mean: 20.0 + yield_,
            precipitation_sum: 100.0,
            evapotranspiration: 400.0,
        }
    }

    fn state() -> AppState {
        AppState::new(
            ObservationTable::from_observations(vec![
                row("Punjab", "Rice", 2019, 2.0),
                row("Punjab", "Wheat", 2019, 3.0),
                row("Punjab", "Wheat", 2020, 3.1),
                row("Sindh", "Wheat", 2020, 2.6),
            ]),
            None,
        )
    }

    #[test]
    fn starts_with_default_selection_and_views() {
        let s = state();
        assert_eq!(s.selection, Some(FilterSelection::new("Punjab", "Rice", 2020)));
        assert!(s.views.is_some());
        assert_eq!(s.dashboard.as_ref().unwrap().charts.len(), 6);
    }

    #[test]
    fn changing_inputs_recomputes() {
        let mut s = state();
        s.set_crop("Wheat");
        assert_eq!(s.views.as_ref().unwrap().yield_history.len(), 2);
        s.set_year(2019);
        assert_eq!(s.views.as_ref().unwrap().yield_history.len(), 1);
        s.set_province("Sindh");
        assert!(s.views.as_ref().unwrap().yield_history.is_empty());
    }

    #[test]
    fn year_slider_snaps_to_years_in_the_data() {
        let mut s = AppState::new(
            ObservationTable::from_observations(vec![
                row("Punjab", "Wheat", 2000, 2.5),
                row("Punjab", "Wheat", 2010, 3.1),
            ]),
            None,
        );
        s.set_year(2003);
        assert_eq!(s.selection.as_ref().unwrap().year, 2000);
        s.set_year(2008);
        assert_eq!(s.selection.as_ref().unwrap().year, 2010);
        assert!(!s.views.as_ref().unwrap().is_empty());
    }

    #[test]
    fn viewport_switches_device_without_touching_views() {
        let mut s = state();
        let before = s.views.clone();
        s.update_viewport(400.0);
        assert_eq!(s.device, DeviceClass::Mobile);
        assert_eq!(s.dashboard.as_ref().unwrap().device, DeviceClass::Mobile);
        assert_eq!(s.views, before);
        s.update_viewport(1280.0);
        assert_eq!(s.device, DeviceClass::Desktop);
    }

    #[test]
    fn forced_mobile_ignores_width() {
        let mut s = state();
        s.force_mobile = true;
        s.update_viewport(1920.0);
        assert_eq!(s.device, DeviceClass::Mobile);
    }

    #[test]
    fn failed_load_keeps_table() {
        let mut s = state();
        s.load_path(Path::new("/nonexistent/data.csv"));
        assert!(s.status_message.as_deref().unwrap().starts_with("Error"));
        assert_eq!(s.table.len(), 4);
    }
}
