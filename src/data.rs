use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::value::{Dataset, Record, Value};

/// Extensions read through the workbook reader.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load a dataset from a file, picking the format from its extension.
/// Workbooks (`.xlsx`, `.xls` and friends) read their first sheet, `.json`
/// files are read as an array of objects, anything else as CSV.
pub fn load_path(path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let dataset = match extension.as_deref() {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext) => load_xlsx(path)?,
        Some("json") => {
            let json: Json = serde_json::from_reader(open(path)?)
                .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
            load_json(&json)?
        }
        _ => load_csv(open(path)?)
            .with_context(|| format!("Failed to read CSV from {}", path.display()))?,
    };

    log::info!("Loaded {} record(s) from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Read the first worksheet of a workbook.
///
/// The first row names the fields. Every record carries every field, with
/// empty cells as `Null`; rows with no content at all are skipped.
pub fn load_xlsx(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;
    let sheet = workbook.sheet_names().first().cloned();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook {} has no worksheets", path.display()))?
        .with_context(|| format!("Failed to read first sheet of {}", path.display()))?;

    log::debug!(
        "Reading sheet {:?} ({} x {}) from {}",
        sheet.unwrap_or_default(),
        range.height(),
        range.width(),
        path.display()
    );
    Ok(records_from_rows(range.rows()))
}

/// Turn worksheet rows into records, the first row being the header.
fn records_from_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Dataset {
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers = header_names(header_row);

    rows.filter(|row| row.iter().any(|cell| !matches!(cell_value(cell), Value::Null)))
        .map(|row| -> Record {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), row.get(i).map(cell_value).unwrap_or(Value::Null)))
                .collect()
        })
        .collect()
}

/// Header cells as field names. An empty header becomes `__EMPTY` and a
/// repeated name gets a `_1`, `_2`, ... suffix so no column is lost.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(row.len());
    for cell in row {
        let base = match cell_value(cell) {
            Value::Null => "__EMPTY".to_string(),
            value => value.to_label(),
        };
        let mut name = base.clone();
        while seen.contains_key(&name) {
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            name = format!("{}_{}", base, count);
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }
    names
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        // Dates stay as serial day numbers
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// Create a dataset from a JSON array of objects.
///
/// Field order follows each object's key order. An empty array is an empty
/// dataset, not an error.
pub fn load_json(value: &Json) -> Result<Dataset> {
    let array = value
        .as_array()
        .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

    let mut dataset = Vec::with_capacity(array.len());
    for (row_idx, item) in array.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| anyhow!("Item {} in array must be an object", row_idx + 1))?;

        let mut record = Record::with_capacity(obj.len());
        for (field, cell) in obj {
            let value = match cell {
                Json::Null => Value::Null,
                Json::Bool(b) => Value::Bool(*b),
                Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
                Json::String(s) => Value::Text(s.clone()),
                Json::Array(_) | Json::Object(_) => bail!(
                    "Unsupported value type for field '{}' at row {}",
                    field,
                    row_idx + 1
                ),
            };
            record.insert(field.clone(), value);
        }
        dataset.push(record);
    }

    Ok(dataset)
}

/// Create a dataset from CSV text with a header row.
///
/// Blank cells become `Null`, cells holding a plain decimal become numbers and
/// everything else stays text, matching what a spreadsheet export produces.
pub fn load_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut dataset = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read CSV row {}", row_idx + 1))?;

        // Short rows simply lack the trailing fields.
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| (h.clone(), parse_cell(cell)))
            .collect();
        dataset.push(record);
    }

    log::debug!("Parsed CSV with {} column(s), {} row(s)", headers.len(), dataset.len());
    Ok(dataset)
}

fn parse_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && looks_decimal(trimmed) => Value::Number(n),
        _ => Value::Text(cell.to_string()),
    }
}

// Rust accepts "inf" and "NaN" as floats; a spreadsheet would keep them as text.
fn looks_decimal(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
