//! JSON-to-table flattening
//!
//! Upstream records are nested JSON objects. Rendering them as table rows
//! needs one level of keys, so nested objects are flattened into dotted
//! column names (`token_0.contract_ticker_symbol`). Arrays stay as values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A flattened record: dotted column name to scalar (or array) value
pub type FlatRecord = BTreeMap<String, Value>;

/// Column name used when a record is not a JSON object
const SCALAR_COLUMN: &str = "value";

/// Flattens one record into dotted keys
///
/// When two paths produce the same column (a literal `"a.b"` key next to
/// `{"a": {"b": ..}}`), the value nested fewer levels deep is kept.
///
/// # Examples
/// `{"a": 1, "b": {"c": "x"}}` becomes `{"a": 1, "b.c": "x"}`.
pub fn flatten_record(record: &Value) -> FlatRecord {
    match record {
        Value::Object(_) => {
            let mut leaves = BTreeMap::new();
            flatten_into("", 0, record, &mut leaves);
            leaves
                .into_iter()
                .map(|(column, (_, value))| (column, value))
                .collect()
        }
        other => FlatRecord::from([(SCALAR_COLUMN.to_string(), other.clone())]),
    }
}

/// Collects leaves keyed by column, each with the depth it was found at
fn flatten_into(
    prefix: &str,
    depth: usize,
    value: &Value,
    out: &mut BTreeMap<String, (usize, Value)>,
) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let column = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&column, depth + 1, nested, out);
            }
        }
        other => match out.get(prefix) {
            Some((kept, _)) if *kept <= depth => {}
            _ => {
                out.insert(prefix.to_string(), (depth, other.clone()));
            }
        },
    }
}

/// Renders a cell value as display text
///
/// Strings are shown without quotes and null as an empty cell.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rows of flattened records with the union of their columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// Column names in first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<FlatRecord>,
}

impl Table {
    /// Flattens every item and collects the columns they use
    pub fn from_items(items: &[Value]) -> Self {
        let rows: Vec<FlatRecord> = items.iter().map(flatten_record).collect();
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display text of `column` in `row`; empty if either is missing
    pub fn cell_text(&self, row: usize, column: &str) -> String {
        self.rows
            .get(row)
            .and_then(|record| record.get(column))
            .map(value_text)
            .unwrap_or_default()
    }

    /// Returns a table with only the rows matching `predicate`
    ///
    /// The column list is kept so the layout does not shift while filtering.
    pub fn filter_rows<P>(&self, predicate: P) -> Table
    where
        P: Fn(&FlatRecord) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| predicate(row)).cloned().collect(),
        }
    }

    /// Adds (or replaces) a column computed from each row
    pub fn add_column<F>(&mut self, name: &str, derive: F)
    where
        F: Fn(&FlatRecord) -> Value,
    {
        for row in &mut self.rows {
            let value = derive(row);
            row.insert(name.to_string(), value);
        }
        if !self.columns.iter().any(|c| c == name) {
            self.columns.insert(0, name.to_string());
        }
    }
}
