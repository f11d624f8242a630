use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{EvDataset, EvRecord};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an EV table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per line
/// * `.json`    – `[{ "region": "Spain", "year": 2020, "value": 1.0, ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// Required columns are `region`, `year` and `value`. `category`,
/// `parameter`, `mode`, `powertrain` and `unit` default to empty.
pub fn load_file(path: &Path) -> Result<EvDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<EvDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    for required in ["region", "year", "value"] {
        if !columns.iter().any(|c| c == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<EvRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }

    Ok(EvDataset::from_records(records, columns))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<EvDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let columns: Vec<String> = rows
        .first()
        .and_then(|r| r.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            serde_json::from_value::<EvRecord>(row.clone())
                .with_context(|| format!("Row {i} is not a valid record"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EvDataset::from_records(records, columns))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
fn load_parquet(path: &Path) -> Result<EvDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, &mut records)?;
    }

    Ok(EvDataset::from_records(records, columns))
}

fn read_batch(batch: &RecordBatch, out: &mut Vec<EvRecord>) -> Result<()> {
    let region = required_column(batch, "region")?;
    let year = required_column(batch, "year")?;
    let value = required_column(batch, "value")?;

    let category = batch.column_by_name("category");
    let parameter = batch.column_by_name("parameter");
    let mode = batch.column_by_name("mode");
    let powertrain = batch.column_by_name("powertrain");
    let unit = batch.column_by_name("unit");

    for row in 0..batch.num_rows() {
        out.push(EvRecord {
            region: string_at(region, row)?,
            category: optional_string_at(category, row)?,
            parameter: optional_string_at(parameter, row)?,
            mode: optional_string_at(mode, row)?,
            powertrain: optional_string_at(powertrain, row)?,
            year: year_at(year, row).with_context(|| format!("Row {row}: failed to read 'year'"))?,
            unit: optional_string_at(unit, row)?,
            value: value_at(value, row)
                .with_context(|| format!("Row {row}: failed to read 'value'"))?,
        });
    }
    Ok(())
}

// -- Arrow helpers --

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet file missing '{name}' column"))
}

fn string_at(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string column, got {other:?}"),
    }
}

fn optional_string_at(col: Option<&Arc<dyn Array>>, row: usize) -> Result<String> {
    match col {
        Some(col) => string_at(col, row),
        None => Ok(String::new()),
    }
}

fn year_at(col: &Arc<dyn Array>, row: usize) -> Result<i32> {
    if col.is_null(row) {
        bail!("null year");
    }
    let year = match col.data_type() {
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row),
        DataType::Int64 => i32::try_from(col.as_primitive::<Int64Type>().value(row))
            .context("year does not fit in i32")?,
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row) as i32,
        other => bail!("Expected an integer year column, got {other:?}"),
    };
    Ok(year)
}

fn value_at(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        other => bail!("Expected a numeric value column, got {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_all_columns() {
        let file = write_temp(
            ".csv",
            "region,category,parameter,mode,powertrain,year,unit,value\n\
             Germany,Historical,EV sales,Cars,BEV,2022,Vehicles,470000\n\
             Germany,Historical,EV sales,Cars,BEV,2023,Vehicles,520000\n\
             EU27,Historical,EV sales,Cars,PHEV,2023,Vehicles,1000000\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[1].value, 520000.0);
        assert_eq!(ds.records[2].powertrain, "PHEV");
        assert_eq!(ds.columns.len(), 8);
        assert_eq!(ds.year_span(), Some((2022, 2023)));
    }

    #[test]
    fn csv_optional_columns_default_to_empty() {
        let file = write_temp(".csv", "region,year,value\nSpain,2020,1.5\n");
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].powertrain, "");
        assert!(ds.powertrains.is_empty());
    }

    #[test]
    fn csv_bad_row_names_the_row() {
        let file = write_temp(".csv", "region,year,value\nSpain,2020,1\nSpain,later,2\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 1"));
    }

    #[test]
    fn csv_blank_value_is_missing() {
        let file = write_temp(
            ".csv",
            "region,powertrain,year,value\nSpain,BEV,2021,\nSpain,BEV,2022,7\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.records[0].value.is_nan());
        assert_eq!(ds.records[1].value, 7.0);
    }

    #[test]
    fn json_null_value_is_missing() {
        let file = write_temp(".json", r#"[{"region":"Spain","year":2021,"value":null}]"#);
        let ds = load_file(file.path()).unwrap();
        assert!(ds.records[0].value.is_nan());
    }

    #[test]
    fn csv_missing_required_column() {
        let file = write_temp(".csv", "region,value\nSpain,1\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("'year'"));
    }

    #[test]
    fn loads_json_records() {
        let file = write_temp(
            ".json",
            r#"[{"region":"France","powertrain":"BEV","year":2021,"value":160000.0},
                {"region":"France","powertrain":"BEV","year":2022,"value":210000}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].value, 210000.0);
        assert!(ds.columns.contains(&"powertrain".to_string()));
    }

    #[test]
    fn loads_parquet_columns_by_name() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("region", DataType::Utf8, false),
            Field::new("powertrain", DataType::Utf8, true),
            Field::new("year", DataType::Int64, false),
            Field::new("value", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Spain", "Spain"])),
                Arc::new(StringArray::from(vec![Some("BEV"), None])),
                Arc::new(Int64Array::from(vec![2019, 2020])),
                Arc::new(Float64Array::from(vec![10.0, 20.0])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let sink = file.as_file().try_clone().unwrap();
        let mut writer = ArrowWriter::try_new(sink, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].powertrain, "BEV");
        assert_eq!(ds.records[1].powertrain, "");
        assert_eq!(ds.records[1].year, 2020);
        assert_eq!(ds.records[1].unit, "");
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension: .xlsx");
    }
}
