use std::path::PathBuf;

use clap::Parser;

use agri_climate_dash::data::model::{FilterSelection, ObservationTable};

#[derive(Debug, Parser)]
#[command(name = "agri-climate-dash", version, about = "Pakistan Agri-Climate Dashboard")]
pub struct CliArgs {
    /// Merged agriculture/climate data file (.csv, .json or .parquet)
    #[arg(
        env = "AGRI_DASH_DATA",
        default_value = "merged_agri_climate_data.csv",
        value_name = "PATH"
    )]
    pub data: PathBuf,

    /// Initial province (defaults to the first one in the data)
    #[arg(long)]
    pub province: Option<String>,

    /// Initial crop (defaults to the second-to-last crop in the data)
    #[arg(long)]
    pub crop: Option<String>,

    /// Initial year (defaults to the latest year in the data)
    #[arg(long)]
    pub year: Option<i32>,

    /// Render in mobile mode regardless of window width
    #[arg(long)]
    pub mobile: bool,

    /// Print the dashboard for the initial selection as JSON and exit
    #[arg(long)]
    pub headless: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

impl CliArgs {
    /// Default log filter; `RUST_LOG` still takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Merge the selection flags over the table's default selection.
    pub fn initial_selection(&self, table: &ObservationTable) -> Option<FilterSelection> {
        let defaults = table.default_selection();
        let province = self
            .province
            .clone()
            .or_else(|| defaults.as_ref().map(|d| d.province.clone()))?;
        let crop = self
            .crop
            .clone()
            .or_else(|| defaults.as_ref().map(|d| d.crop.clone()))?;
        let year = self.year.or_else(|| defaults.as_ref().map(|d| d.year))?;
        Some(FilterSelection {
            province,
            crop,
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use agri_climate_dash::data::model::Observation;

    use super::*;

    fn table() -> ObservationTable {
        let row = |province: &str, crop: &str, year| Observation {
            province: province.to_string(),
            crop: crop.to_string(),
            year,
            yield_: 1.0,
            temperature_mean: 20.0,
            precipitation_sum: 100.0,
            evapotranspiration: 400.0,
        };
        ObservationTable::from_observations(vec![
            row("Punjab", "Rice", 2019),
            row("Sindh", "Wheat", 2020),
        ])
    }

    #[test]
    fn defaults_come_from_the_data() {
        let args = CliArgs::parse_from(["agri-climate-dash", "data.csv"]);
        assert_eq!(args.data, PathBuf::from("data.csv"));
        assert_eq!(
            args.initial_selection(&table()),
            Some(FilterSelection::new("Punjab", "Rice", 2020))
        );
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn flags_override_individual_fields() {
        let args = CliArgs::parse_from([
            "agri-climate-dash",
            "data.csv",
            "--crop",
            "Wheat",
            "--year",
            "2019",
            "--mobile",
            "-v",
        ]);
        assert_eq!(
            args.initial_selection(&table()),
            Some(FilterSelection::new("Punjab", "Wheat", 2019))
        );
        assert!(args.mobile);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn empty_table_needs_every_flag() {
        let empty = ObservationTable::default();
        let partial = CliArgs::parse_from(["agri-climate-dash", "x.csv", "--crop", "Wheat"]);
        assert_eq!(partial.initial_selection(&empty), None);

        let full = CliArgs::parse_from([
            "agri-climate-dash",
            "x.csv",
            "--province",
            "Punjab",
            "--crop",
            "Wheat",
            "--year",
            "2020",
        ]);
        assert_eq!(
            full.initial_selection(&empty),
            Some(FilterSelection::new("Punjab", "Wheat", 2020))
        );
    }
}
