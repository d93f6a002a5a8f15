use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampMillisecondType};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{ColumnNames, Dataset, RawTable, RawValue, Record};

type Result<T> = std::result::Result<T, DataLoadError>;

static NULL_CELL: RawValue = RawValue::Null;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales dataset using the default column names
/// (`Date, Pais, IdCliente, Descripcion, Cantidad, Total`).
pub fn load(path: &Path) -> Result<Dataset> {
    load_with(path, &ColumnNames::default())
}

/// Load a sales dataset whose required columns carry custom header names.
pub fn load_with(path: &Path, columns: &ColumnNames) -> Result<Dataset> {
    let table = read_table(path, columns)?;
    build_dataset(&table, columns)
}

/// Read any supported file into a [`RawTable`].  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header on the first row
/// * `.csv`     – header row, comma separated
/// * `.json`    – `[{ "Date": ..., "Pais": ..., ... }, ...]`
/// * `.parquet` – one column per field; only the required columns are decoded
pub fn read_table(path: &Path, columns: &ColumnNames) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !matches!(
        ext.as_str(),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "csv" | "json" | "parquet" | "pq"
    ) {
        return Err(DataLoadError::UnsupportedFormat(ext));
    }

    std::fs::metadata(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path, &columns.required()),
        _ => read_spreadsheet(path),
    }
}

/// Turn a raw table into records.
///
/// Rows with a missing date, country, customer id or product are dropped.
/// A present but unparsable date or number fails the whole load.
pub fn build_dataset(table: &RawTable, columns: &ColumnNames) -> Result<Dataset> {
    let missing: Vec<String> = columns
        .required()
        .iter()
        .filter(|name| !table.headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let index = |name: &str| table.headers.iter().position(|h| h == name).unwrap_or(0);
    let date_idx = index(&columns.date);
    let country_idx = index(&columns.country);
    let customer_idx = index(&columns.customer_id);
    let product_idx = index(&columns.product);
    let quantity_idx = index(&columns.quantity);
    let total_idx = index(&columns.total);

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&NULL_CELL);

        let date_cell = cell(date_idx);
        let labels = (
            cell(country_idx).as_label(),
            cell(customer_idx).as_label(),
            cell(product_idx).as_label(),
        );
        let (Some(country), Some(customer_id), Some(product)) = labels else {
            dropped += 1;
            continue;
        };
        if date_cell.is_null() {
            dropped += 1;
            continue;
        }

        let timestamp = parse_timestamp(date_cell).ok_or_else(|| DataLoadError::InvalidDate {
            row: row_no,
            column: columns.date.clone(),
            value: describe(date_cell),
        })?;
        let quantity = numeric(cell(quantity_idx), row_no, &columns.quantity)?;
        let total = numeric(cell(total_idx), row_no, &columns.total)?;

        records.push(Record::new(
            timestamp,
            country,
            customer_id,
            product,
            quantity,
            total,
        ));
    }

    if dropped > 0 {
        log::info!("Dropped {dropped} row(s) with missing date, country, customer or product");
    }
    log::debug!("Built {} records from {} rows", records.len(), table.rows.len());

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Cell interpretation
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Interpret a date cell.
///
/// Integers are epoch milliseconds (the default JSON export of a DataFrame).
/// Slash dates are month-first.
pub fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Integer(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.naive_utc()),
        RawValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Interpret a quantity or total cell.  Null cells and non-finite values
/// count as zero.
pub fn parse_number(value: &RawValue) -> Option<f64> {
    let number = match value {
        v if v.is_null() => return Some(0.0),
        RawValue::Integer(i) => *i as f64,
        RawValue::Float(f) => *f,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(if number.is_finite() { number } else { 0.0 })
}

fn numeric(value: &RawValue, row: usize, column: &str) -> Result<f64> {
    parse_number(value).ok_or_else(|| DataLoadError::InvalidNumber {
        row,
        column: column.to_string(),
        value: describe(value),
    })
}

fn describe(value: &RawValue) -> String {
    value.as_label().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of an Excel / OpenDocument workbook; first row is the header.
fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DataLoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    log::debug!("Reading worksheet '{sheet_name}' ({} rows)", range.height());

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|c| spreadsheet_value(c).as_label().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .map(|row| row.iter().map(spreadsheet_value).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_value(cell: &Data) -> RawValue {
    match cell {
        Data::Int(i) => RawValue::Integer(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(RawValue::DateTime)
            .unwrap_or(RawValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => RawValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.  Cells stay textual; numbers
/// and dates are parsed when records are built.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        RawValue::Null
                    } else {
                        RawValue::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2024-01-05", "Pais": "USA", "IdCliente": 17850,
///     "Descripcion": "Mug", "Cantidad": 6, "Total": 15.3 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let objects = root
        .as_array()
        .ok_or_else(|| DataLoadError::JsonShape("expected a top-level array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut sparse_rows = Vec::with_capacity(objects.len());

    for (i, rec) in objects.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataLoadError::JsonShape(format!("row {} is not an object", i + 1)))?;
        let mut row = Vec::with_capacity(obj.len());
        for (key, val) in obj {
            let pos = *positions.entry(key.clone()).or_insert_with(|| {
                headers.push(key.clone());
                headers.len() - 1
            });
            row.push((pos, json_value(val)));
        }
        sparse_rows.push(row);
    }

    let rows = sparse_rows
        .into_iter()
        .map(|cells| {
            let mut row = vec![RawValue::Null; headers.len()];
            for (pos, val) in cells {
                row[pos] = val;
            }
            row
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_value(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): dates may be `Date32`, `Date64` or any
/// `Timestamp` unit.  Columns not listed in `wanted` are never decoded, so
/// extra columns of any type pass through unused.
fn read_parquet(path: &Path, wanted: &[&str]) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let (indices, headers): (Vec<usize>, Vec<String>) = builder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| wanted.contains(&f.name().as_str()))
        .map(|(i, f)| (i, f.name().clone()))
        .unzip();
    let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
    let reader = builder.with_projection(mask).build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(arrow_values)
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

// -- Arrow helpers --

/// Decode a whole Arrow column into raw values.
fn arrow_values(col: &ArrayRef) -> Result<Vec<RawValue>> {
    let len = col.len();
    let values = match col.data_type() {
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..len)
                .map(|i| nullable(arr, i, || RawValue::Bool(arr.value(i))))
                .collect()
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let cast_col = cast(col, &DataType::Int64)?;
            let arr = cast_col.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| nullable(arr, i, || RawValue::Integer(arr.value(i))))
                .collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let cast_col = cast(col, &DataType::Float64)?;
            let arr = cast_col.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| nullable(arr, i, || RawValue::Float(arr.value(i))))
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let cast_col = cast(col, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
            let arr = cast_col.as_primitive::<TimestampMillisecondType>();
            (0..len)
                .map(|i| {
                    nullable(arr, i, || {
                        arr.value_as_datetime(i)
                            .map(RawValue::DateTime)
                            .unwrap_or(RawValue::Null)
                    })
                })
                .collect()
        }
        _ => {
            let cast_col = cast(col, &DataType::Utf8)?;
            let arr = cast_col.as_string::<i32>();
            (0..len)
                .map(|i| nullable(arr, i, || RawValue::Text(arr.value(i).to_string())))
                .collect()
        }
    };
    Ok(values)
}

fn nullable(arr: &dyn Array, row: usize, value: impl FnOnce() -> RawValue) -> RawValue {
    if arr.is_null(row) {
        RawValue::Null
    } else {
        value()
    }
}
