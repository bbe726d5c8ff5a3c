use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{LoadError, Result};
use super::model::{Metric, Observation, ObservationTable};

pub const PROVINCE_COLUMN: &str = "Province";
pub const CROP_COLUMN: &str = "Crop";
pub const YEAR_COLUMN: &str = "Year";

/// Every column the merged file must carry, in output order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    PROVINCE_COLUMN,
    CROP_COLUMN,
    YEAR_COLUMN,
    "Yield",
    "temperature_2m_mean",
    "precipitation_sum",
    "fao_evapotranspiration",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the merged agri-climate table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least [`REQUIRED_COLUMNS`]
/// * `.json`    – `[{ "Province": "...", "Year": 2020, ... }, ...]`
/// * `.parquet` – flat schema with the same column names
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} observations ({} provinces, {} crops, {} years) from {}",
        table.len(),
        table.provinces().len(),
        table.crops().len(),
        table.years().len(),
        path.display()
    );
    Ok(table)
}

fn data_load(path: &Path, reason: impl std::fmt::Display) -> LoadError {
    LoadError::DataLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| data_load(path, e))
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Coerce a `Year` cell to an integer. Integral floats such as `2020.0` are
/// accepted; anything else is a [`LoadError::TypeConversion`].
pub fn parse_year(raw: &str, row: usize) -> Result<i32> {
    let s = raw.trim();
    if let Ok(year) = s.parse::<i32>() {
        return Ok(year);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => {
            Ok(v as i32)
        }
        _ => Err(LoadError::TypeConversion {
            row,
            value: raw.to_string(),
        }),
    }
}

/// Parse a measurement cell. Empty cells are missing values (NaN).
fn parse_measurement(raw: &str, row: usize, column: &str) -> Result<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| LoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Build an observation from the seven required cells, in
/// [`REQUIRED_COLUMNS`] order.
fn observation_from_cells(cells: [&str; 7], row: usize) -> Result<Observation> {
    Ok(Observation {
        province: cells[0].to_string(),
        crop: cells[1].to_string(),
        year: parse_year(cells[2], row)?,
        yield_: parse_measurement(cells[3], row, Metric::Yield.column_name())?,
        temperature_mean: parse_measurement(cells[4], row, Metric::Temperature.column_name())?,
        precipitation_sum: parse_measurement(cells[5], row, Metric::Precipitation.column_name())?,
        evapotranspiration: parse_measurement(
            cells[6],
            row,
            Metric::Evapotranspiration.column_name(),
        )?,
    })
}

/// Resolve each required column to its position, reporting every absent one.
fn required_positions(names: &[&str]) -> Result<[usize; 7]> {
    let mut positions = [0usize; 7];
    let mut missing = Vec::new();
    for (slot, required) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match names.iter().position(|n| n.trim() == required) {
            Some(idx) => *slot = idx,
            None => missing.push(required.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per record.
/// Columns other than [`REQUIRED_COLUMNS`] are ignored.
fn load_csv(path: &Path) -> Result<ObservationTable> {
    let file = open(path)?;
    read_csv(file).map_err(|e| match e {
        LoadError::Csv(inner) => data_load(path, inner),
        other => other,
    })
}

/// Parse CSV content from any reader.
pub fn read_csv<R: Read>(source: R) -> Result<ObservationTable> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let positions = required_positions(&names)?;

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells = positions.map(|idx| record.get(idx).unwrap_or(""));
        observations.push(observation_from_cells(cells, row_no)?);
    }

    Ok(ObservationTable::from_observations(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Province": "Punjab",
///     "Crop": "Wheat",
///     "Year": 2020,
///     "Yield": 3.1,
///     "temperature_2m_mean": 22.0,
///     "precipitation_sum": 120.0,
///     "fao_evapotranspiration": 400.0
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).map_err(|e| data_load(path, e))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| data_load(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| data_load(path, "expected top-level JSON array"))?;

    let mut observations = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| data_load(path, format!("row {row} is not a JSON object")))?;

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !obj.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let texts = REQUIRED_COLUMNS.map(|c| json_cell_text(&obj[c]));
        let cells = texts.each_ref().map(String::as_str);
        observations.push(observation_from_cells(cells, row)?);
    }

    Ok(ObservationTable::from_observations(observations))
}

/// Render a JSON cell the way it would appear in a CSV file.
fn json_cell_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema.
///
/// Every required column is cast to Utf8 and goes through the same cell
/// coercion as CSV, so any castable type is accepted. Null measurements are
/// missing values (NaN); null `Province`, `Crop` or `Year` cells are errors.
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut observations = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = observations.len();
        append_batch(&batch, offset, &mut observations)?;
    }

    Ok(ObservationTable::from_observations(observations))
}

fn append_batch(
    batch: &RecordBatch,
    row_offset: usize,
    out: &mut Vec<Observation>,
) -> Result<()> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let positions = required_positions(&names)?;

    let columns = positions
        .iter()
        .map(|&idx| cast(batch.column(idx).as_ref(), &DataType::Utf8))
        .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;
    let texts: Vec<_> = columns.iter().map(|c| c.as_string::<i32>()).collect();

    for row in 0..batch.num_rows() {
        let global_row = row_offset + row;
        if texts[2].is_null(row) {
            return Err(LoadError::TypeConversion {
                row: global_row,
                value: "null".to_string(),
            });
        }
        for key in [0, 1] {
            if texts[key].is_null(row) {
                return Err(LoadError::InvalidValue {
                    row: global_row,
                    column: REQUIRED_COLUMNS[key].to_string(),
                    value: "null".to_string(),
                });
            }
        }

        let cells: [&str; 7] = std::array::from_fn(|i| {
            if texts[i].is_null(row) {
                ""
            } else {
                texts[i].value(row)
            }
        });
        out.push(observation_from_cells(cells, global_row)?);
    }
    Ok(())
}
