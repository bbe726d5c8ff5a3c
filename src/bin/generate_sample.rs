use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use agri_climate_dash::data::loader::REQUIRED_COLUMNS;
use agri_climate_dash::data::model::Observation;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (province, mean temperature °C, annual precipitation mm, ET mm)
const PROVINCES: [(&str, f64, f64, f64); 4] = [
    ("Balochistan", 24.0, 180.0, 520.0),
    ("Khyber Pakhtunkhwa", 19.0, 650.0, 380.0),
    ("Punjab", 24.5, 450.0, 430.0),
    ("Sindh", 27.0, 200.0, 500.0),
];

/// (crop, baseline yield t/ha, optimum temperature °C)
const CROPS: [(&str, f64, f64); 4] = [
    ("Cotton", 0.7, 27.0),
    ("Maize", 4.0, 23.0),
    ("Rice", 2.5, 26.0),
    ("Wheat", 2.8, 20.0),
];

fn generate(rng: &mut SimpleRng) -> Vec<Observation> {
    let mut rows = Vec::new();
    for year in 2000..=2022 {
        let warming = (year - 2000) as f64 * 0.03;
        for &(province, temp, precip, et) in &PROVINCES {
            let temperature_mean = rng.gauss(temp + warming, 0.6);
            let precipitation_sum = rng.gauss(precip, precip * 0.25).max(5.0);
            let evapotranspiration = rng.gauss(et + 6.0 * (temperature_mean - temp), 15.0);

            for &(crop, base, optimum) in &CROPS {
                let heat_stress = (temperature_mean - optimum).powi(2) * 0.01;
                let water = (precipitation_sum / precip).min(1.5) * 0.1;
                let trend = (year - 2000) as f64 * 0.015;
                let yield_ = (base * (1.0 + trend + water - heat_stress) + rng.gauss(0.0, 0.08))
                    .max(0.05);

                rows.push(Observation {
                    province: province.to_string(),
                    crop: crop.to_string(),
                    year,
                    yield_,
                    temperature_mean,
                    precipitation_sum,
                    evapotranspiration,
                });
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Observation]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record(REQUIRED_COLUMNS)
        .expect("Failed to write CSV header");
    for o in rows {
        writer
            .write_record([
                o.province.clone(),
                o.crop.clone(),
                o.year.to_string(),
                format!("{:.3}", o.yield_),
                format!("{:.2}", o.temperature_mean),
                format!("{:.1}", o.precipitation_sum),
                format!("{:.1}", o.evapotranspiration),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn write_parquet(path: &str, rows: &[Observation]) {
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let data_type = match i {
                0 | 1 => DataType::Utf8,
                2 => DataType::Int64,
                _ => DataType::Float64,
            };
            Field::new(*name, data_type, false)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let floats = |f: fn(&Observation) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|o| o.province.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|o| o.crop.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|o| o.year as i64).collect::<Vec<_>>(),
            )),
            Arc::new(floats(|o| o.yield_)),
            Arc::new(floats(|o| o.temperature_mean)),
            Arc::new(floats(|o| o.precipitation_sum)),
            Arc::new(floats(|o| o.evapotranspiration)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv("merged_agri_climate_data.csv", &rows);
    write_parquet("merged_agri_climate_data.parquet", &rows);

    println!(
        "Wrote {} observations ({} provinces × {} crops × 23 years) to merged_agri_climate_data.{{csv,parquet}}",
        rows.len(),
        PROVINCES.len(),
        CROPS.len()
    );
}
