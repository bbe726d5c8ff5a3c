use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{Subset, select};
use super::model::{FilterSelection, Metric, ObservationTable};
use super::stats::{BoxSummary, CorrelationMatrix, Trendline};

// ---------------------------------------------------------------------------
// Derived view types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// One climate metric over the cumulative-to-date subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateSeries {
    pub metric: Metric,
    pub points: Vec<YearValue>,
}

/// Mean yield of one province for the selected crop and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceYield {
    pub province: String,
    #[serde(rename = "yield")]
    pub yield_: f64,
    /// Number of source rows averaged into `yield_`.
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub temperature: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
    /// Marker size.
    pub precipitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempYieldScatter {
    pub points: Vec<ScatterPoint>,
    pub trendline: Trendline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceDistribution {
    pub province: String,
    pub yields: Vec<f64>,
    /// `None` when the province has no present yield values.
    pub summary: Option<BoxSummary>,
}

/// The six datasets feeding the dashboard charts. Rebuilt from scratch on
/// every selection change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub yield_history: Vec<YearValue>,
    pub climate_history: Vec<ClimateSeries>,
    pub correlation_matrix: CorrelationMatrix,
    pub province_comparison: Vec<ProvinceYield>,
    pub temp_yield_scatter: TempYieldScatter,
    pub yield_distribution: Vec<ProvinceDistribution>,
}

impl DerivedViews {
    /// Long-form `(year, metric, value)` triples of the climate history.
    pub fn climate_points(&self) -> impl Iterator<Item = (i32, Metric, f64)> + '_ {
        self.climate_history
            .iter()
            .flat_map(|s| s.points.iter().map(move |p| (p.year, s.metric, p.value)))
    }

    /// Views with no rows behind them: three empty climate series, an
    /// all-undefined correlation matrix and no trendline.
    pub fn empty() -> Self {
        DerivedViews {
            yield_history: Vec::new(),
            climate_history: Metric::CLIMATE
                .iter()
                .map(|&metric| ClimateSeries {
                    metric,
                    points: Vec::new(),
                })
                .collect(),
            correlation_matrix: CorrelationMatrix::undefined(),
            province_comparison: Vec::new(),
            temp_yield_scatter: TempYieldScatter {
                points: Vec::new(),
                trendline: Trendline::InsufficientData,
            },
            yield_distribution: Vec::new(),
        }
    }

    /// Whether every view is empty (e.g. a selection outside the table).
    pub fn is_empty(&self) -> bool {
        self.yield_history.is_empty()
            && self.climate_history.iter().all(|s| s.points.is_empty())
            && self.province_comparison.is_empty()
            && self.temp_yield_scatter.points.is_empty()
            && self.yield_distribution.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filter pipeline
// ---------------------------------------------------------------------------

/// Compute every dashboard view for `selection`.
///
/// Pure function of its inputs. Selections outside the table's domain yield
/// empty views and an all-undefined correlation matrix rather than an error.
pub fn compute_views(table: &ObservationTable, selection: &FilterSelection) -> DerivedViews {
    if !table.contains_selection(selection) {
        log::warn!("Selection {selection} is outside the loaded data");
        return DerivedViews::empty();
    }

    // Cumulative-to-date: yield and climate history.
    let mut to_date = select(table, selection, Subset::ToDate);
    to_date.sort_by_key(|o| o.year);

    let yield_history = to_date
        .iter()
        .map(|o| YearValue {
            year: o.year,
            value: o.yield_,
        })
        .collect();

    let climate_history = Metric::CLIMATE
        .iter()
        .map(|&metric| ClimateSeries {
            metric,
            points: to_date
                .iter()
                .map(|o| YearValue {
                    year: o.year,
                    value: o.metric(metric),
                })
                .collect(),
        })
        .collect();

    // Point-in-time: correlation and scatter.
    let exact = select(table, selection, Subset::ExactYear);
    let correlation_matrix = CorrelationMatrix::from_rows(&exact);

    let points: Vec<ScatterPoint> = exact
        .iter()
        .map(|o| ScatterPoint {
            temperature: o.temperature_mean,
            yield_: o.yield_,
            precipitation: o.precipitation_sum,
        })
        .collect();
    let temperatures: Vec<f64> = points.iter().map(|p| p.temperature).collect();
    let yields: Vec<f64> = points.iter().map(|p| p.yield_).collect();
    let trendline = Trendline::fit(&temperatures, &yields);

    // Across provinces: comparison bar.
    let mut by_province: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for o in select(table, selection, Subset::CropYear) {
        by_province.entry(o.province.as_str()).or_default().push(o.yield_);
    }
    let province_comparison = by_province
        .into_iter()
        .map(|(province, values)| ProvinceYield {
            province: province.to_string(),
            yield_: finite_mean(&values),
            rows: values.len(),
        })
        .collect();

    // Distribution box plot over the same cumulative rows as the history.
    let mut distribution: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for o in &to_date {
        distribution.entry(o.province.as_str()).or_default().push(o.yield_);
    }
    let yield_distribution = distribution
        .into_iter()
        .map(|(province, yields)| ProvinceDistribution {
            province: province.to_string(),
            summary: BoxSummary::from_values(&yields),
            yields,
        })
        .collect();

    let views = DerivedViews {
        yield_history,
        climate_history,
        correlation_matrix,
        province_comparison,
        temp_yield_scatter: TempYieldScatter { points, trendline },
        yield_distribution,
    };
    log::debug!(
        "Recomputed views for {selection}: {} history rows, {} exact-year rows, {} provinces",
        views.yield_history.len(),
        views.temp_yield_scatter.points.len(),
        views.province_comparison.len()
    );
    views
}

/// Mean of the finite values, NaN when there are none.
fn finite_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        f64::NAN
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}
