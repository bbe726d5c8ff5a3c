use serde::Serialize;

use crate::data::model::{FilterSelection, Metric};
use crate::data::stats::Trendline;
use crate::data::views::DerivedViews;

// ---------------------------------------------------------------------------
// Device class
// ---------------------------------------------------------------------------

/// Rendering mode chosen by the UI shell. Everything width-dependent in the
/// dashboard keys off this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Viewports narrower than this (in logical points) are mobile.
    pub const MOBILE_BREAKPOINT: f32 = 768.0;

    pub fn from_viewport_width(width: f32) -> Self {
        if width < Self::MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Tick and legend font size.
    pub fn font_size(self) -> f32 {
        match self {
            DeviceClass::Desktop => 10.0,
            DeviceClass::Mobile => 8.0,
        }
    }

    pub fn title_size(self) -> f32 {
        match self {
            DeviceClass::Desktop => 16.0,
            DeviceClass::Mobile => 13.0,
        }
    }

    pub fn chart_height(self) -> f32 {
        match self {
            DeviceClass::Desktop => 350.0,
            DeviceClass::Mobile => 280.0,
        }
    }

    /// Maximum characters for category and title labels, `None` = untruncated.
    pub fn label_limit(self) -> Option<usize> {
        match self {
            DeviceClass::Desktop => None,
            DeviceClass::Mobile => Some(10),
        }
    }

    fn title_limit(self) -> Option<usize> {
        match self {
            DeviceClass::Desktop => None,
            DeviceClass::Mobile => Some(32),
        }
    }
}

/// Shorten `label` to at most `max_chars` characters, ending in `…` when cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = label.chars().take(keep).collect();
    out.push('…');
    out
}

fn fit_label(label: &str, limit: Option<usize>) -> String {
    match limit {
        Some(max) => truncate_label(label, max),
        None => label.to_string(),
    }
}

/// Axis/legend label for a metric, including units on desktop.
pub fn metric_label(metric: Metric, device: DeviceClass) -> &'static str {
    match (metric, device) {
        (Metric::Yield, DeviceClass::Desktop) => "Yield (tons/ha)",
        (Metric::Temperature, DeviceClass::Desktop) => "Temp (°C)",
        (Metric::Precipitation, DeviceClass::Desktop) => "Precip (mm)",
        (Metric::Evapotranspiration, DeviceClass::Desktop) => "ET (mm)",
        (Metric::Yield, DeviceClass::Mobile) => "Yield",
        (Metric::Temperature, DeviceClass::Mobile) => "Temp",
        (Metric::Precipitation, DeviceClass::Mobile) => "Precip",
        (Metric::Evapotranspiration, DeviceClass::Mobile) => "ET",
    }
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    YieldTrend,
    ClimateTrend,
    CorrelationHeatmap,
    ProvinceComparison,
    TempYieldScatter,
    YieldDistribution,
}

impl ChartKind {
    /// Layout order: three rows of two charts.
    pub const ALL: [ChartKind; 6] = [
        ChartKind::YieldTrend,
        ChartKind::ClimateTrend,
        ChartKind::CorrelationHeatmap,
        ChartKind::ProvinceComparison,
        ChartKind::TempYieldScatter,
        ChartKind::YieldDistribution,
    ];

    /// Stable identifier, also used as the plot id.
    pub fn id(self) -> &'static str {
        match self {
            ChartKind::YieldTrend => "yield-trend",
            ChartKind::ClimateTrend => "climate-trends",
            ChartKind::CorrelationHeatmap => "corr-heatmap",
            ChartKind::ProvinceComparison => "yield-bar",
            ChartKind::TempYieldScatter => "scatter-temp-yield",
            ChartKind::YieldDistribution => "box-yield",
        }
    }
}

/// How a chart is coloured; mapped to concrete colours by [`crate::color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Single dark-green series.
    DarkGreen,
    /// One distinct colour per series or category.
    Categorical,
    /// Continuous scale over the plotted value.
    Viridis,
    /// Continuous scale over `[-1, 1]`.
    YlGnBu,
}

/// Labels and sizing for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Legend entries (climate metrics) or category tick labels (provinces,
    /// heatmap axes), already truncated for the device.
    pub series_labels: Vec<String>,
    pub color_scale: ColorScale,
    pub show_trendline: bool,
    pub show_legend: bool,
    pub font_size: f32,
    pub title_size: f32,
    pub height: f32,
    /// Shown instead of (or under) the chart when its data cannot be drawn.
    pub notice: Option<String>,
}

/// The six chart specs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub device: DeviceClass,
    pub charts: Vec<ChartSpec>,
}

impl Dashboard {
    pub fn chart(&self, kind: ChartKind) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.kind == kind)
    }
}

struct SpecBuilder {
    device: DeviceClass,
}

impl SpecBuilder {
    fn spec(&self, kind: ChartKind, title: String) -> ChartSpec {
        ChartSpec {
            kind,
            title: fit_label(&title, self.device.title_limit()),
            x_label: String::new(),
            y_label: String::new(),
            series_labels: Vec::new(),
            color_scale: ColorScale::Categorical,
            show_trendline: false,
            show_legend: self.device == DeviceClass::Desktop,
            font_size: self.device.font_size(),
            title_size: self.device.title_size(),
            height: self.device.chart_height(),
            notice: None,
        }
    }

    fn category(&self, label: &str) -> String {
        fit_label(label, self.device.label_limit())
    }
}

fn no_data(selection: &FilterSelection) -> Option<String> {
    Some(format!("No data for {selection}"))
}

/// Attach labels, colour scales and device-dependent sizing to `views`.
pub fn present(
    views: &DerivedViews,
    selection: &FilterSelection,
    device: DeviceClass,
) -> Dashboard {
    let b = SpecBuilder { device };
    let FilterSelection {
        province,
        crop,
        year,
    } = selection;
    let yield_label = metric_label(Metric::Yield, device).to_string();

    let mut yield_trend = b.spec(
        ChartKind::YieldTrend,
        format!("{crop} Yield Trend ({province})"),
    );
    yield_trend.x_label = "Year".to_string();
    yield_trend.y_label = yield_label.clone();
    yield_trend.color_scale = ColorScale::DarkGreen;
    yield_trend.show_legend = false;
    if views.yield_history.is_empty() {
        yield_trend.notice = no_data(selection);
    }

    let mut climate = b.spec(
        ChartKind::ClimateTrend,
        format!("Climate Metrics Trend ({province}, {crop})"),
    );
    climate.x_label = "Year".to_string();
    climate.y_label = "Value".to_string();
    climate.series_labels = views
        .climate_history
        .iter()
        .map(|s| metric_label(s.metric, device).to_string())
        .collect();
    if views.climate_history.iter().all(|s| s.points.is_empty()) {
        climate.notice = no_data(selection);
    }

    let mut heatmap = b.spec(
        ChartKind::CorrelationHeatmap,
        format!("Correlation Matrix ({province}, {year})"),
    );
    heatmap.series_labels = views
        .correlation_matrix
        .metrics
        .iter()
        .map(|&m| metric_label(m, device).to_string())
        .collect();
    heatmap.color_scale = ColorScale::YlGnBu;
    if views.correlation_matrix.is_all_undefined() {
        heatmap.notice = Some(format!(
            "Correlation undefined: {} row(s) for {year}",
            views.temp_yield_scatter.points.len()
        ));
    }

    let mut bar = b.spec(
        ChartKind::ProvinceComparison,
        format!("Yield by Province in {year}"),
    );
    bar.x_label = "Province".to_string();
    bar.y_label = yield_label.clone();
    bar.series_labels = views
        .province_comparison
        .iter()
        .map(|p| b.category(&p.province))
        .collect();
    bar.color_scale = ColorScale::Viridis;
    if views.province_comparison.is_empty() {
        bar.notice = Some(format!("No {crop} data for {year}"));
    }

    let mut scatter = b.spec(
        ChartKind::TempYieldScatter,
        format!("Temp vs Yield ({province}, {year})"),
    );
    scatter.x_label = metric_label(Metric::Temperature, device).to_string();
    scatter.y_label = yield_label.clone();
    scatter.series_labels = vec![metric_label(Metric::Precipitation, device).to_string()];
    scatter.show_trendline = matches!(views.temp_yield_scatter.trendline, Trendline::Fit { .. });
    scatter.notice = if views.temp_yield_scatter.points.is_empty() {
        no_data(selection)
    } else if !scatter.show_trendline {
        Some("Trendline: insufficient data".to_string())
    } else {
        None
    };

    let mut boxes = b.spec(
        ChartKind::YieldDistribution,
        format!("Yield Distribution up to {year}"),
    );
    boxes.x_label = "Province".to_string();
    boxes.y_label = yield_label;
    boxes.series_labels = views
        .yield_distribution
        .iter()
        .map(|g| b.category(&g.province))
        .collect();
    if views.yield_distribution.is_empty() {
        boxes.notice = Some(format!("No {crop} data up to {year}"));
    }

    Dashboard {
        device,
        charts: vec![yield_trend, climate, heatmap, bar, scatter, boxes],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ObservationTable, obs};
    use crate::data::views::compute_views;

    fn views_for(rows: Vec<crate::data::model::Observation>, sel: &FilterSelection) -> DerivedViews {
        compute_views(&ObservationTable::from_observations(rows), sel)
    }

    #[test]
    fn breakpoint_selects_device_class() {
        assert_eq!(DeviceClass::from_viewport_width(375.0), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(767.9), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(768.0), DeviceClass::Desktop);
        assert_eq!(DeviceClass::from_viewport_width(1920.0), DeviceClass::Desktop);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_label("Punjab", 10), "Punjab");
        assert_eq!(truncate_label("Khyber Pakhtunkhwa", 10), "Khyber Pa…");
        assert_eq!(truncate_label("Gilgit-Baltistan", 1), "…");
        assert_eq!(truncate_label("Azad Kashmir", 10).chars().count(), 10);
    }

    #[test]
    fn desktop_titles_and_units() {
        let sel = FilterSelection::new("Punjab", "Wheat", 2020);
        let views = views_for(vec![obs("Punjab", "Wheat", 2020, 3.1, 22.0, 120.0, 400.0)], &sel);
        let dash = present(&views, &sel, DeviceClass::Desktop);

        assert_eq!(dash.charts.len(), 6);
        let kinds: Vec<ChartKind> = dash.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        let trend = dash.chart(ChartKind::YieldTrend).unwrap();
        assert_eq!(trend.title, "Wheat Yield Trend (Punjab)");
        assert_eq!(trend.y_label, "Yield (tons/ha)");
        assert_eq!(trend.font_size, 10.0);
        assert!(trend.notice.is_none());

        let climate = dash.chart(ChartKind::ClimateTrend).unwrap();
        assert_eq!(climate.series_labels, vec!["Temp (°C)", "Precip (mm)", "ET (mm)"]);

        let heat = dash.chart(ChartKind::CorrelationHeatmap).unwrap();
        assert_eq!(heat.color_scale, ColorScale::YlGnBu);
        assert!(heat.notice.is_some());

        let scatter = dash.chart(ChartKind::TempYieldScatter).unwrap();
        assert!(!scatter.show_trendline);
        assert_eq!(scatter.notice.as_deref(), Some("Trendline: insufficient data"));
    }

    #[test]
    fn mobile_truncates_and_shrinks() {
        let sel = FilterSelection::new("Khyber Pakhtunkhwa", "Wheat", 2020);
        let views = views_for(
            vec![
                obs("Khyber Pakhtunkhwa", "Wheat", 2020, 1.8, 18.0, 200.0, 300.0),
                obs("Punjab", "Wheat", 2020, 3.1, 22.0, 120.0, 400.0),
            ],
            &sel,
        );
        let desktop = present(&views, &sel, DeviceClass::Desktop);
        let mobile = present(&views, &sel, DeviceClass::Mobile);

        let bar = mobile.chart(ChartKind::ProvinceComparison).unwrap();
        assert_eq!(bar.series_labels, vec!["Khyber Pa…", "Punjab"]);
        assert!(bar.font_size < desktop.charts[3].font_size);
        assert!(bar.height < desktop.charts[3].height);
        assert!(!bar.show_legend);

        let trend = mobile.chart(ChartKind::YieldTrend).unwrap();
        assert!(trend.title.chars().count() <= 32);
        assert_eq!(
            mobile.chart(ChartKind::TempYieldScatter).unwrap().x_label,
            "Temp"
        );
    }

    #[test]
    fn trendline_flag_follows_fit() {
        let sel = FilterSelection::new("Punjab", "Wheat", 2020);
        let views = views_for(
            vec![
                obs("Punjab", "Wheat", 2020, 3.1, 22.0, 120.0, 400.0),
                obs("Punjab", "Wheat", 2020, 3.4, 23.0, 110.0, 405.0),
            ],
            &sel,
        );
        let scatter = present(&views, &sel, DeviceClass::Desktop).charts[4].clone();
        assert!(scatter.show_trendline);
        assert!(scatter.notice.is_none());
    }

    #[test]
    fn empty_views_carry_notices() {
        let sel = FilterSelection::new("Punjab", "Wheat", 2020);
        let views = views_for(Vec::new(), &sel);
        let dash = present(&views, &sel, DeviceClass::Desktop);
        assert!(dash.charts.iter().all(|c| c.notice.is_some()));
    }
}
