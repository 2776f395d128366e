//! CSV to record conversion.
//!
//! The first row is the header. Column names are trimmed, blank names become
//! `Unnamed: <index>` and duplicates are suffixed `.1`, `.2`, ...
//!
//! Value types are inferred per column:
//! - integer when every non-missing cell parses as `i64`
//! - float when every non-missing cell is a number; `inf`/`-inf` count as
//!   numbers but are stored as `null`, since BSON documents built from JSON
//!   cannot carry them
//! - boolean when every non-missing cell is `True`/`TRUE`/`true` or
//!   `False`/`FALSE`/`false`
//! - string otherwise (original text kept)
//!
//! Missing cells (empty or a standard NA token) become `null`. Whitespace
//! between a delimiter and an opening quote is ignored, so `a, "b, c"` has
//! two fields.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Number, Value};

use common::errors::{AppError, AppResult};
use common::models::Record;

/// Cell values read as missing.
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Infers the kind shared by all non-missing cells.
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let (mut integer, mut float, mut boolean) = (true, true, true);
        for cell in cells.filter(|c| !is_missing(c)) {
            let cell = cell.trim();
            integer = integer && cell.parse::<i64>().is_ok();
            float = float && cell.parse::<f64>().is_ok();
            boolean = boolean && parse_bool(cell).is_some();
            if !(integer || float || boolean) {
                return ColumnKind::Text;
            }
        }
        if integer {
            ColumnKind::Integer
        } else if float {
            ColumnKind::Float
        } else if boolean {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }

    fn convert(self, cell: &str) -> Value {
        if is_missing(cell) {
            return Value::Null;
        }
        let trimmed = cell.trim();
        match self {
            ColumnKind::Integer => trimmed.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            ColumnKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnKind::Boolean => parse_bool(trimmed).map(Value::Bool).unwrap_or(Value::Null),
            ColumnKind::Text => Value::String(cell.to_string()),
        }
    }
}

fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Converts comma-separated files into records.
#[derive(Debug, Clone, Copy)]
pub struct CsvConverter;

impl CsvConverter {
    /// Reads and converts a file.
    ///
    /// # Errors
    /// `AppError::SourceMissing` if the file does not exist, `AppError::Parse`
    /// if it cannot be read as CSV.
    pub fn convert_file(&self, path: &Path) -> AppResult<Vec<Record>> {
        let label = path.display().to_string();
        if !path.is_file() {
            return Err(AppError::SourceMissing(label));
        }
        let file = File::open(path).map_err(|e| AppError::parse(&label, e))?;
        self.convert_reader(file, &label)
    }

    /// Converts CSV text from any reader. `label` names the input in errors.
    pub fn convert_reader<R: Read>(&self, mut input: R, label: &str) -> AppResult<Vec<Record>> {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|e| AppError::parse(label, e))?;
        let text = strip_space_before_quotes(&text);

        let mut reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::parse(label, format!("failed to read header: {}", e)))?
            .clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let columns = normalize_headers(&headers);

        let mut rows: Vec<StringRecord> = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| AppError::parse(label, e))?;
            if row.len() > columns.len() {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                return Err(AppError::parse(
                    label,
                    format!(
                        "line {}: expected {} fields, found {}",
                        line,
                        columns.len(),
                        row.len()
                    ),
                ));
            }
            rows.push(row);
        }

        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|i| ColumnKind::infer(rows.iter().filter_map(|row| row.get(i))))
            .collect();

        let records: Vec<Record> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(&kinds)
                    .enumerate()
                    .map(|(i, (column, kind))| {
                        let value = row.get(i).map(|cell| kind.convert(cell)).unwrap_or(Value::Null);
                        (column.as_str(), value)
                    })
                    .collect::<Record>()
            })
            .collect();
        Ok(records)
    }
}

/// Drops spaces and tabs that sit between the start of a field and its
/// opening quote. Everything else, including text inside quotes, is kept.
fn strip_space_before_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                match chars.peek() {
                    Some('"') => out.extend(chars.next()),
                    _ => in_quotes = false,
                }
            }
            continue;
        }
        if at_field_start && (c == ' ' || c == '\t') {
            pending.push(c);
            continue;
        }
        if at_field_start && c == '"' {
            pending.clear();
            in_quotes = true;
        } else {
            out.push_str(&pending);
            pending.clear();
        }
        out.push(c);
        at_field_start = matches!(c, ',' | '\n' | '\r');
    }
    out.push_str(&pending);
    out
}

/// Trims header names and makes them unique.
fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    headers
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let trimmed = raw.trim_start_matches('\u{feff}').trim();
            let base = if trimmed.is_empty() {
                format!("Unnamed: {}", index)
            } else {
                trimmed.to_string()
            };
            let mut name = base.clone();
            while used.contains(&name) {
                let suffix = suffixes.entry(base.clone()).or_insert(0);
                *suffix += 1;
                name = format!("{}.{}", base, suffix);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
