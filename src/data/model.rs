use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric – one of the four numeric columns of an observation
// ---------------------------------------------------------------------------

/// The numeric measurements carried by every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Yield,
    Temperature,
    Precipitation,
    Evapotranspiration,
}

impl Metric {
    /// All metrics in correlation-matrix order.
    pub const ALL: [Metric; 4] = [
        Metric::Yield,
        Metric::Temperature,
        Metric::Precipitation,
        Metric::Evapotranspiration,
    ];

    /// The three climate metrics plotted in the climate trend chart.
    pub const CLIMATE: [Metric; 3] = [
        Metric::Temperature,
        Metric::Precipitation,
        Metric::Evapotranspiration,
    ];

    /// Column name in the merged source file.
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Yield => "Yield",
            Metric::Temperature => "temperature_2m_mean",
            Metric::Precipitation => "precipitation_sum",
            Metric::Evapotranspiration => "fao_evapotranspiration",
        }
    }

    /// Position in [`Metric::ALL`].
    pub fn index(self) -> usize {
        match self {
            Metric::Yield => 0,
            Metric::Temperature => 1,
            Metric::Precipitation => 2,
            Metric::Evapotranspiration => 3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the merged table
// ---------------------------------------------------------------------------

/// A single (province, crop, year) measurement. Missing numeric cells are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub province: String,
    pub crop: String,
    pub year: i32,
    #[serde(rename = "yield")]
    pub yield_: f64,
    pub temperature_mean: f64,
    pub precipitation_sum: f64,
    pub evapotranspiration: f64,
}

impl Observation {
    /// Read one numeric measurement.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Yield => self.yield_,
            Metric::Temperature => self.temperature_mean,
            Metric::Precipitation => self.precipitation_sum,
            Metric::Evapotranspiration => self.evapotranspiration,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – the three dashboard inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub province: String,
    pub crop: String,
    pub year: i32,
}

impl FilterSelection {
    pub fn new(province: impl Into<String>, crop: impl Into<String>, year: i32) -> Self {
        Self {
            province: province.into(),
            crop: crop.into(),
            year,
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.province, self.crop, self.year)
    }
}

// ---------------------------------------------------------------------------
// ObservationTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with the dropdown/slider domains pre-computed.
/// Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    observations: Vec<Observation>,
    provinces: BTreeSet<String>,
    crops: BTreeSet<String>,
    years: BTreeSet<i32>,
}

impl ObservationTable {
    /// Build domain indices from the loaded rows.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut provinces = BTreeSet::new();
        let mut crops = BTreeSet::new();
        let mut years = BTreeSet::new();

        for obs in &observations {
            provinces.insert(obs.province.clone());
            crops.insert(obs.crop.clone());
            years.insert(obs.year);
        }

        ObservationTable {
            observations,
            provinces,
            crops,
            years,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Sorted distinct provinces.
    pub fn provinces(&self) -> &BTreeSet<String> {
        &self.provinces
    }

    /// Sorted distinct crops.
    pub fn crops(&self) -> &BTreeSet<String> {
        &self.crops
    }

    /// Sorted distinct years.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// `(min, max)` year, or `None` for an empty table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// The year present in the table closest to `year`, preferring the
    /// earlier one on a tie.
    pub fn nearest_year(&self, year: i32) -> Option<i32> {
        let below = self.years.range(..=year).next_back().copied();
        let above = self.years.range(year..).next().copied();
        match (below, above) {
            (Some(b), Some(a)) if a - year < year - b => Some(a),
            (Some(b), _) => Some(b),
            (None, a) => a,
        }
    }

    /// Whether every component of `selection` occurs in the table.
    pub fn contains_selection(&self, selection: &FilterSelection) -> bool {
        self.provinces.contains(&selection.province)
            && self.crops.contains(&selection.crop)
            && self.years.contains(&selection.year)
    }

    /// Initial dashboard state: first province, second-to-last crop and the
    /// latest year.
    pub fn default_selection(&self) -> Option<FilterSelection> {
        let province = self.provinces.first()?.clone();
        let crop = self
            .crops
            .iter()
            .rev()
            .nth(1)
            .or_else(|| self.crops.last())?
            .clone();
        let year = *self.years.last()?;
        Some(FilterSelection {
            province,
            crop,
            year,
        })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn obs(
    province: &str,
    crop: &str,
    year: i32,
    yield_: f64,
    temperature_mean: f64,
    precipitation_sum: f64,
    evapotranspiration: f64,
) -> Observation {
    Observation {
        province: province.to_string(),
        crop: crop.to_string(),
        year,
        yield_,
        temperature_mean,
        precipitation_sum,
        evapotranspiration,
    }
}
