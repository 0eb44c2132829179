//! Raw record parser for delimited text and JSON payloads.
//!
//! Produces loosely-typed [`RawRow`]s. Numeric-looking cells are coerced to
//! `f64`; everything else is kept as trimmed text.

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{MalformedInput, ParseError};

/// A single untyped cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Empty,
}

impl RawValue {
    /// Coerces a trimmed cell: finite numbers become [`RawValue::Number`].
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim().trim_matches('"').trim();
        if cell.is_empty() {
            return RawValue::Empty;
        }
        match cell.parse::<f64>() {
            Ok(n) if n.is_finite() => RawValue::Number(n),
            _ => RawValue::Text(cell.to_string()),
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Empty,
            Value::Number(n) => n.as_f64().map_or(RawValue::Empty, RawValue::Number),
            Value::String(s) => RawValue::from_cell(&s),
            Value::Bool(b) => RawValue::Text(b.to_string()),
            other => RawValue::Text(other.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }
}

/// One source record keyed by its source field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(HashMap<String, RawValue>);

impl RawRow {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        RawRow(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Parsed rows in source order plus the rows that were rejected.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub rows: Vec<RawRow>,
    pub rejected: Vec<MalformedInput>,
}

/// Parses comma-separated text with a header line.
pub fn parse_csv(text: &str) -> Result<ParsedRows, ParseError> {
    parse_delimited(text, b',')
}

/// Parses delimited text whose first line names the fields.
///
/// Rows whose field count differs from the header are rejected and recorded,
/// not truncated. Text with no data rows yields an empty result.
///
/// # Errors
///
/// Returns an error if the text cannot be read as delimited records at all
/// (for example, invalid UTF-8 in a cell).
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<ParsedRows, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut parsed = ParsedRows::default();

    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            warn!(
                line,
                expected = headers.len(),
                found = record.len(),
                "Rejecting row with mismatched field count"
            );
            parsed.rejected.push(MalformedInput::FieldCount {
                line,
                expected: headers.len(),
                found: record.len(),
            });
            continue;
        }

        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), RawValue::from_cell(cell)))
            .collect();
        parsed.rows.push(row);
    }

    debug!(
        rows = parsed.rows.len(),
        rejected = parsed.rejected.len(),
        "Delimited text parsed"
    );
    Ok(parsed)
}

/// Parses a JSON array of objects, or an object wrapping one under `data`.
///
/// # Errors
///
/// Returns an error if the text is not JSON or has neither accepted shape.
pub fn parse_json(text: &str) -> Result<ParsedRows, ParseError> {
    let items = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(ParseError::UnexpectedShape("an object without a `data` array")),
        },
        Value::Null => return Err(ParseError::UnexpectedShape("null")),
        _ => return Err(ParseError::UnexpectedShape("a scalar")),
    };

    let mut parsed = ParsedRows::default();

    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(fields) => {
                parsed.rows.push(
                    fields
                        .into_iter()
                        .map(|(k, v)| (k.trim().to_string(), RawValue::from_json(v)))
                        .collect(),
                );
            }
            _ => {
                warn!(index, "Rejecting non-object JSON element");
                parsed.rejected.push(MalformedInput::NotAnObject { index });
            }
        }
    }

    debug!(
        rows = parsed.rows.len(),
        rejected = parsed.rejected.len(),
        "JSON parsed"
    );
    Ok(parsed)
}
