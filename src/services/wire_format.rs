//! Cache payload encoding.
//!
//! Entries are JSON envelopes carrying a format version, the column names and
//! the adjacently tagged rows. Entries written by earlier tooling, a bare JSON
//! array of scalar arrays, are still readable.
//!
//! Floats are written with the shortest representation that parses back to
//! the same bits. Legacy entries containing the bare `NaN`, `Infinity` or
//! `-Infinity` tokens (emitted by some non-strict JSON writers) are not valid
//! JSON and fail to decode with `FetchError::Serialization`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{ColumnValue, QueryResult, Row};

/// Version written into every encoded payload.
pub const FORMAT_VERSION: u64 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format_version: u64,
    columns: &'a [String],
    rows: &'a [Row],
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Serialize a query result into a cache payload.
///
/// # Errors
/// `FetchError::Serialization` if any float is NaN or infinite; JSON has no
/// representation for them.
pub fn encode(result: &QueryResult) -> FetchResult<String> {
    for (row_idx, row) in result.rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            if let ColumnValue::Float(f) = value {
                if !f.is_finite() {
                    return Err(FetchError::Serialization(format!(
                        "row {row_idx}, column {col_idx}: float {f} is not representable"
                    )));
                }
            }
        }
    }

    let envelope = EnvelopeRef {
        format_version: FORMAT_VERSION,
        columns: &result.columns,
        rows: &result.rows,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a cache payload back into a query result.
///
/// # Errors
/// `FetchError::Serialization` if the payload is not JSON, carries an unknown
/// format version, or (legacy form) contains a nested array or object.
pub fn decode(payload: &str) -> FetchResult<QueryResult> {
    let value: Value = serde_json::from_str(payload)?;

    match value {
        Value::Object(fields) => {
            let version = fields.get("format_version").and_then(Value::as_u64);
            if version != Some(FORMAT_VERSION) {
                return Err(FetchError::Serialization(format!(
                    "unsupported cache format version: {}",
                    fields
                        .get("format_version")
                        .map_or_else(|| "missing".to_string(), ToString::to_string)
                )));
            }
            let envelope: Envelope = serde_json::from_value(Value::Object(fields))?;
            Ok(QueryResult::new(envelope.columns, envelope.rows))
        }
        Value::Array(rows) => decode_legacy(rows),
        other => Err(FetchError::Serialization(format!(
            "expected a JSON object or array, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_legacy(rows: Vec<Value>) -> FetchResult<QueryResult> {
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(row_idx, row)| match row {
            Value::Array(cells) => cells
                .iter()
                .enumerate()
                .map(|(col_idx, cell)| {
                    ColumnValue::from_json_scalar(cell).ok_or_else(|| {
                        FetchError::Serialization(format!(
                            "row {row_idx}, column {col_idx}: nested {} is not a column value",
                            json_kind(cell)
                        ))
                    })
                })
                .collect::<FetchResult<Row>>(),
            other => Err(FetchError::Serialization(format!(
                "row {row_idx}: expected an array, found {}",
                json_kind(&other)
            ))),
        })
        .collect::<FetchResult<Vec<Row>>>()?;

    Ok(QueryResult::from_rows(rows))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
