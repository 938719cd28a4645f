use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const USER_ID: &str = "UserId";
const OBS_DATE: &str = "ObsDate";
const REGION: &str = "ADMIN1Name";
const DISTRICT: &str = "ADM2";
const LOCATION: &str = "Location";
const LIVELIHOOD_ZONE: &str = "Main_livelihood_zone";
const YEAR: &str = "Year";
const MONTH: &str = "Month";
const FCS: &str = "FCS";
const FCS_CAT: &str = "FCSCat28";
const RCSI: &str = "rCSI";
const RCSI_CAT: &str = "rCSI_cat";
const HHS: &str = "HHS";
const HHS_CAT: &str = "HHS_IPC";
const LCS_CAT: &str = "Max_coping_behaviour";

/// Columns read as text.
const TEXT_COLUMNS: [&str; 10] = [
    USER_ID,
    OBS_DATE,
    REGION,
    DISTRICT,
    LOCATION,
    LIVELIHOOD_ZONE,
    FCS_CAT,
    RCSI_CAT,
    HHS_CAT,
    LCS_CAT,
];

/// Columns read as numbers.
const NUMERIC_COLUMNS: [&str; 5] = [YEAR, MONTH, FCS, RCSI, HHS];

fn required_columns() -> impl Iterator<Item = &'static str> {
    TEXT_COLUMNS.into_iter().chain(NUMERIC_COLUMNS)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}, column '{column}': {reason}")]
    InvalidValue {
        /// 1-based data row; the CSV header does not count.
        row: usize,
        column: &'static str,
        reason: String,
    },
}

fn invalid(row: usize, column: &'static str, reason: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per field (recommended)
/// * `.json`    – `[{ "UserId": ..., "ADMIN1Name": ..., ... }, ...]`
/// * `.csv`     – header row with the survey column names
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "loaded {} households ({} years) from {}",
        table.len(),
        table.years().len(),
        path.display()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Cell values and row validation
// ---------------------------------------------------------------------------

/// A raw, not yet validated cell as found in the source file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Trimmed text; numbers print without a trailing `.0` when whole.
    fn into_text(self) -> Option<String> {
        match self {
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(v) if v.is_nan() => None,
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{}", v as i64)),
            Cell::Number(v) => Some(v.to_string()),
        }
    }

    fn into_number(self, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
        match self {
            Cell::Number(v) if v.is_nan() => Ok(None),
            Cell::Number(v) => Ok(Some(v)),
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>()
                    .map(Some)
                    .map_err(|_| invalid(row, column, format!("'{s}' is not a number")))
            }
        }
    }
}

fn text(row: &mut HashMap<&'static str, Cell>, column: &'static str) -> Option<String> {
    row.remove(column).and_then(Cell::into_text)
}

fn required_text(
    row_no: usize,
    row: &mut HashMap<&'static str, Cell>,
    column: &'static str,
) -> Result<String, LoadError> {
    text(row, column).ok_or_else(|| invalid(row_no, column, "value is missing"))
}

fn number(
    row_no: usize,
    row: &mut HashMap<&'static str, Cell>,
    column: &'static str,
) -> Result<Option<f64>, LoadError> {
    match row.remove(column) {
        Some(cell) => cell.into_number(row_no, column),
        None => Ok(None),
    }
}

/// A required whole number. Float storage is accepted when the value is
/// integral (`2021.0`); fractional values are rejected, not truncated.
fn whole_number(
    row_no: usize,
    row: &mut HashMap<&'static str, Cell>,
    column: &'static str,
) -> Result<i64, LoadError> {
    let v = number(row_no, row, column)?
        .ok_or_else(|| invalid(row_no, column, "value is missing"))?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(invalid(row_no, column, format!("{v} is not a whole number")));
    }
    Ok(v as i64)
}

/// Validate one raw row into a [`Record`].  `row_no` is 1-based.
fn build_record(row_no: usize, mut row: HashMap<&'static str, Cell>) -> Result<Record, LoadError> {
    let year = whole_number(row_no, &mut row, YEAR)?;
    let year = i32::try_from(year)
        .map_err(|_| invalid(row_no, YEAR, format!("{year} is out of range")))?;

    let month = whole_number(row_no, &mut row, MONTH)?;
    if !(1..=12).contains(&month) {
        return Err(invalid(row_no, MONTH, format!("{month} is not in 1..=12")));
    }

    Ok(Record {
        user_id: text(&mut row, USER_ID).unwrap_or_default(),
        obs_date: text(&mut row, OBS_DATE),
        region: required_text(row_no, &mut row, REGION)?,
        district: required_text(row_no, &mut row, DISTRICT)?,
        location: text(&mut row, LOCATION),
        livelihood_zone: text(&mut row, LIVELIHOOD_ZONE),
        year,
        month: month as u8,
        fcs: number(row_no, &mut row, FCS)?,
        fcs_cat: text(&mut row, FCS_CAT),
        rcsi: number(row_no, &mut row, RCSI)?,
        rcsi_cat: text(&mut row, RCSI_CAT),
        hhs: number(row_no, &mut row, HHS)?,
        hhs_cat: text(&mut row, HHS_CAT),
        lcs_cat: text(&mut row, LCS_CAT),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "UserId": 1001, "ADMIN1Name": "North", "ADM2": "N01", "Year": 2021.0,
///     "Month": 3, "FCSCat28": "Acceptable", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table, LoadError> {
    let reader = BufReader::new(open(path)?);
    let rows: Vec<BTreeMap<String, Option<Cell>>> = serde_json::from_reader(reader)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, mut obj) in (1..).zip(rows) {
        let mut row = HashMap::new();
        for column in required_columns() {
            let cell = obj.remove(column).ok_or(LoadError::MissingColumn(column))?;
            if let Some(cell) = cell {
                row.insert(column, cell);
            }
        }
        records.push(build_record(row_no, row)?);
    }

    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the survey column names, one household per
/// line.  Extra columns are ignored; empty fields are missing values.
fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers = reader.headers()?.clone();

    let positions: Vec<(&'static str, usize)> = required_columns()
        .map(|column| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .map(|idx| (column, idx))
                .ok_or(LoadError::MissingColumn(column))
        })
        .collect::<Result<_, _>>()?;

    let mut records = Vec::new();
    for (row_no, result) in (1..).zip(reader.records()) {
        let line = result?;
        let row = positions
            .iter()
            .filter_map(|&(column, idx)| Some((column, Cell::Text(line.get(idx)?.to_string()))))
            .collect();
        records.push(build_record(row_no, row)?);
    }

    Ok(Table::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the survey.
///
/// Text columns may be Utf8, LargeUtf8, dictionary-encoded (pandas
/// categoricals) or even numeric codes; numeric columns may be any integer
/// or float type.  Everything is cast to Utf8 / Float64 up front.
fn load_parquet(path: &Path) -> Result<Table, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;

    // Check the schema up front: a file without rows yields no batches.
    let schema = builder.schema().clone();
    for name in required_columns() {
        schema
            .index_of(name)
            .map_err(|_| LoadError::MissingColumn(name))?;
    }

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let column = |name: &'static str| -> Result<ArrayRef, LoadError> {
            let idx = batch
                .schema()
                .index_of(name)
                .map_err(|_| LoadError::MissingColumn(name))?;
            Ok(batch.column(idx).clone())
        };

        // Numeric codes in text columns stay numbers so they print the same
        // way as in the JSON and CSV exports ("102", not "102.0").
        let text_cols = TEXT_COLUMNS
            .into_iter()
            .map(|name| {
                let col = column(name)?;
                let to = if col.data_type().is_numeric() {
                    DataType::Float64
                } else {
                    DataType::Utf8
                };
                Ok((name, cast(&col, &to)?))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        let num_cols = NUMERIC_COLUMNS
            .into_iter()
            .map(|name| Ok((name, cast(&column(name)?, &DataType::Float64)?)))
            .collect::<Result<Vec<_>, LoadError>>()?;

        for i in 0..batch.num_rows() {
            let mut row = HashMap::new();
            for (name, arr) in text_cols.iter().chain(&num_cols) {
                if arr.is_valid(i) {
                    row.insert(*name, cell_at(arr, i));
                }
            }
            records.push(build_record(records.len() + 1, row)?);
        }
    }

    Ok(Table::from_records(records))
}

/// Cell at row `i` of an array already cast to Float64 or Utf8.
fn cell_at(arr: &ArrayRef, i: usize) -> Cell {
    match arr.data_type() {
        DataType::Float64 => Cell::Number(arr.as_primitive::<Float64Type>().value(i)),
        _ => Cell::Text(arr.as_string::<i32>().value(i).to_string()),
    }
}
