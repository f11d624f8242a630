use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One output row, same layout as the IEA EV outlook tables.
#[derive(Debug, Serialize)]
struct Row {
    region: String,
    category: &'static str,
    parameter: &'static str,
    mode: &'static str,
    powertrain: &'static str,
    year: i64,
    unit: &'static str,
    value: f64,
}

/// Logistic adoption curve: `cap / (1 + e^(-k (year - mid)))`.
fn adoption(year: i64, cap: f64, mid: f64, k: f64) -> f64 {
    cap / (1.0 + (-k * (year as f64 - mid)).exp())
}

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

    /// Multiplicative noise in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

// (region, total car market, EV adoption midpoint)
const REGIONS: [(&str, f64, f64); 4] = [
    ("Germany", 2_900_000.0, 2022.0),
    ("France", 1_800_000.0, 2023.0),
    ("Spain", 1_000_000.0, 2026.0),
    ("EU27", 10_500_000.0, 2023.5),
];

// (powertrain, share of the EV market, first year with sales)
const POWERTRAINS: [(&str, f64, i64); 3] = [
    ("BEV", 0.62, 2010),
    ("PHEV", 0.37, 2012),
    ("FCEV", 0.01, 2015),
];

const YEARS: std::ops::RangeInclusive<i64> = 2010..=2023;

fn sales_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(region, market, mid) in &REGIONS {
        for &(powertrain, split, first_year) in &POWERTRAINS {
            for year in YEARS {
                let value = if year < first_year {
                    0.0
                } else {
                    (adoption(year, market * 0.5, mid, 0.55) * split * rng.jitter(0.08)).round()
                };
                rows.push(Row {
                    region: region.to_string(),
                    category: "Historical",
                    parameter: "EV sales",
                    mode: "Cars",
                    powertrain,
                    year,
                    unit: "Vehicles",
                    value,
                });
            }
        }
    }
    rows
}

fn share_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for &(region, _, mid) in &REGIONS {
        for year in YEARS {
            let share = adoption(year, 50.0, mid, 0.55) * rng.jitter(0.05);
            rows.push(Row {
                region: region.to_string(),
                category: "Historical",
                parameter: "EV sales share",
                mode: "Cars",
                powertrain: "EV",
                year,
                unit: "percent",
                value: (share * 100.0).round() / 100.0,
            });
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn string_column(rows: &[Row], f: fn(&Row) -> &str) -> StringArray {
    StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("parameter", DataType::Utf8, false),
        Field::new("mode", DataType::Utf8, false),
        Field::new("powertrain", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("unit", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(string_column(rows, |r| r.region.as_str())),
            Arc::new(string_column(rows, |r| r.category)),
            Arc::new(string_column(rows, |r| r.parameter)),
            Arc::new(string_column(rows, |r| r.mode)),
            Arc::new(string_column(rows, |r| r.powertrain)),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(string_column(rows, |r| r.unit)),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.value).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let sales = sales_rows(&mut rng);
    write_csv("ev_sales_sample.csv", &sales)?;
    write_parquet("ev_sales_sample.parquet", &sales)?;

    let shares = share_rows(&mut rng);
    write_csv("ev_share_sample.csv", &shares)?;

    println!(
        "Wrote {} sales rows to ev_sales_sample.csv/.parquet \
         and {} share rows to ev_share_sample.csv",
        sales.len(),
        shares.len()
    );
    Ok(())
}
