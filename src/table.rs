//! Canonical in-memory tabular value.
//!
//! Every ingestion ability converts its source-native result (worksheet
//! range, SQL result set) into this one shape at its boundary, so downstream
//! consumers never see driver-specific types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AbilityError, AbilityResult};

/// A single cell, keeping the source-inferred type without coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
    Json(Value),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text content if this cell is textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A table of named columns with source row order preserved.
///
/// Column order follows the source (header row or server column list); row
/// indices start at 0. Each row has exactly as many cells as there are
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularValue {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TabularValue {
    /// Create an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, enforcing the column width invariant
    pub fn push_row(&mut self, row: Vec<CellValue>) -> AbilityResult<()> {
        if row.len() != self.columns.len() {
            return Err(AbilityError::InvalidArgument(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column) if both indices are in range
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Cell at (row, column-name)
    pub fn get_named(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column_index(column).and_then(|c| self.get(row, c))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TabularValue {
        let mut table = TabularValue::new(vec!["name".to_string(), "score".to_string()]);
        table
            .push_row(vec![
                CellValue::Text("alice".to_string()),
                CellValue::Float(95.5),
            ])
            .unwrap();
        table
            .push_row(vec![CellValue::Text("bob".to_string()), CellValue::Int(87)])
            .unwrap();
        table
    }

    #[test]
    fn test_row_order_and_lookup() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_index("score"), Some(1));
        assert_eq!(
            table.get_named(0, "name"),
            Some(&CellValue::Text("alice".to_string()))
        );
        assert_eq!(table.get_named(1, "score"), Some(&CellValue::Int(87)));
    }

    #[test]
    fn test_push_row_width_mismatch() {
        let mut table = TabularValue::new(vec!["only".to_string()]);
        let err = table
            .push_row(vec![CellValue::Int(1), CellValue::Int(2)])
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_serializes_to_plain_json() {
        let table = sample();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["columns"], json!(["name", "score"]));
        assert_eq!(value["rows"][0], json!(["alice", 95.5]));
        assert_eq!(value["rows"][1][1], json!(87));
    }

    #[test]
    fn test_null_cells_round_trip() {
        let mut table = TabularValue::new(vec!["a".to_string()]);
        table.push_row(vec![CellValue::Null]).unwrap();
        let encoded = serde_json::to_string(&table).unwrap();
        let decoded: TabularValue = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.get(0, 0).unwrap().is_null());
    }
}
