//! Tabular query results.

use serde::{Deserialize, Serialize};

use super::value::ColumnValue;

/// One row: column values in select-list order.
pub type Row = Vec<ColumnValue>;

/// All rows produced by one query execution.
///
/// `columns` holds the select-list names when the source reported them;
/// results decoded from legacy cache entries have none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// A result without column names.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as plain JSON arrays of scalars.
    pub fn rows_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.rows
                .iter()
                .map(|row| serde_json::Value::Array(row.iter().map(ColumnValue::to_json).collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_json() {
        let result = QueryResult::from_rows(vec![
            vec![1_i64.into(), "a".into()],
            vec![2_i64.into(), "b".into()],
        ]);
        assert_eq!(result.rows_json(), serde_json::json!([[1, "a"], [2, "b"]]));
        assert_eq!(result.row_count(), 2);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let result = QueryResult::default();
        assert!(result.is_empty());
        assert_eq!(result.rows_json(), serde_json::json!([]));
    }
}
