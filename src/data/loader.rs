use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, UInt64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{
    Continent, Dataset, Row, COL_CONTINENT, COL_COUNTRY, COL_GDP_PER_CAPITA, COL_ISO_ALPHA,
    COL_LIFE_EXPECTANCY, COL_POPULATION, COL_YEAR,
};
use crate::error::{DashResult, DashboardError};

/// Synthetic sample table in the Gapminder schema, shipped inside the binary.
/// Values are interpolated between approximate 1952 and 2007 anchors and are
/// not Gapminder figures.
const SAMPLE_CSV: &str = include_str!("../../assets/sample_countries.csv");

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The synthetic sample table compiled into the binary.
    Sample,
    /// A CSV, JSON or Parquet file on disk.
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Sample => write!(f, "bundled sample table (synthetic values)"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load and validate a dataset. Any failure becomes `DataUnavailable`.
pub fn load(source: &DataSource) -> DashResult<Dataset> {
    let result = match source {
        DataSource::Sample => load_csv_reader(SAMPLE_CSV.as_bytes()),
        DataSource::File(path) => load_file(path),
    };
    match result {
        Ok(dataset) => {
            log::info!("Loaded {} rows from {source}", dataset.len());
            Ok(dataset)
        }
        Err(e) => {
            log::error!("Failed to load {source}: {e:#}");
            Err(DashboardError::data_unavailable(source.to_string(), &e))
        }
    }
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per schema field
/// * `.json`    – `[{ "Country": ..., "Year": ..., ... }, ...]`
/// * `.csv`     – header row with the schema column names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv_reader(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Country": "Afghanistan",
///     "Continent": "Asia",
///     "Year": 1952,
///     "Population": 8425333,
///     "GDP per Capita": 779.445314,
///     "Life Expectancy": 28.801,
///     "ISO Alpha Country Code": "AFG"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<Row> = serde_json::from_str(&text).context("parsing JSON records")?;
    Dataset::from_rows(rows)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for required in [COL_COUNTRY, COL_CONTINENT, COL_YEAR, COL_ISO_ALPHA] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<Row>().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(row);
    }

    Dataset::from_rows(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the Gapminder table.
///
/// Integer columns may be Int32/Int64/UInt64 and float columns Float32/Float64,
/// so files written by both **Pandas** and **Polars** load.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, &mut rows)?;
    }

    Dataset::from_rows(rows)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn read_batch(batch: &RecordBatch, rows: &mut Vec<Row>) -> Result<()> {
    let country = column(batch, COL_COUNTRY)?;
    let continent = column(batch, COL_CONTINENT)?;
    let year = column(batch, COL_YEAR)?;
    let population = column(batch, COL_POPULATION)?;
    let gdp = column(batch, COL_GDP_PER_CAPITA)?;
    let life = column(batch, COL_LIFE_EXPECTANCY)?;
    let iso = column(batch, COL_ISO_ALPHA)?;

    for row in 0..batch.num_rows() {
        let index = rows.len();
        let ctx = || format!("Parquet row {index}");
        let continent_name = extract_string(continent, row).with_context(ctx)?;
        let pop = extract_i64(population, row).with_context(ctx)?;
        if pop < 0 {
            bail!("{}: negative population {pop}", ctx());
        }
        rows.push(Row {
            country: extract_string(country, row).with_context(ctx)?,
            continent: continent_name.parse::<Continent>().with_context(ctx)?,
            year: i32::try_from(extract_i64(year, row).with_context(ctx)?)
                .with_context(ctx)?,
            population: pop as u64,
            gdp_per_capita: extract_f64(gdp, row).with_context(ctx)?,
            life_expectancy: extract_f64(life, row).with_context(ctx)?,
            iso_alpha: extract_string(iso, row).with_context(ctx)?,
        });
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as i64)
    } else if let Some(arr) = any.downcast_ref::<UInt64Array>() {
        i64::try_from(arr.value(row)).context("integer out of range")
    } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
        // Pandas writes nullable integer columns as floats.
        let v = arr.value(row);
        if v.fract() != 0.0 {
            bail!("expected an integer, got {v}");
        }
        Ok(v as i64)
    } else {
        bail!("Expected integer column, got {:?}", col.data_type())
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in float column");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("Expected float column, got {:?}", col.data_type())
    }
}
