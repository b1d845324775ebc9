use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{FairError, Result};

/// Spellings that count as a missing value when reading spreadsheet text
const MISSING_MARKERS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// A single cell of a loaded table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    /// Interpret raw spreadsheet text the way a dataframe reader would
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Value::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(num) if num.is_nan() => Value::Empty,
            Ok(num) => Value::Number(num),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Non-empty textual form; numbers are rendered, empties give `None`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Empty => None,
            Value::Text(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map(Value::Number).unwrap_or(Value::Empty)
    }
}

/// Rectangular in-memory table with named columns
///
/// Every row has exactly as many values as there are columns; rows pushed
/// with fewer values are padded with `Value::Empty`, longer rows are cut.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Table {
            name: name.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Table::new(name, columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| FairError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    pub fn text(&self, row: usize, column: &str) -> Option<String> {
        self.value(row, column).and_then(Value::as_text)
    }

    pub fn number(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column).and_then(Value::as_f64)
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<&Value>> {
        let col = self.require_column(column)?;
        Ok(self.rows.iter().map(|r| &r[col]).collect())
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
    }

    /// Remove a column, returning whether it was present
    pub fn drop_column(&mut self, column: &str) -> bool {
        match self.column_index(column) {
            Some(col) => {
                self.columns.remove(col);
                for row in &mut self.rows {
                    row.remove(col);
                }
                true
            }
            None => false,
        }
    }

    /// Append a column; missing trailing values are filled with `Empty`
    pub fn add_column(&mut self, column: impl Into<String>, values: Vec<Value>) {
        self.columns.push(column.into());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().unwrap_or(Value::Empty));
        }
    }

    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Table::from_rows(
            self.name.clone(),
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ))
    }

    /// Inner join on a key column, keeping the row order of `self`
    ///
    /// Non-key columns present in both tables get `_x` (left) and `_y`
    /// (right) suffixes. Rows without a key value never match.
    pub fn inner_join(&self, other: &Table, on: &str) -> Result<Table> {
        let left_key = self.require_column(on)?;
        let right_key = other.require_column(on)?;

        let mut right_rows: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            if let Some(key) = row[right_key].as_text() {
                right_rows.entry(key).or_default().push(i);
            }
        }

        let right_columns: Vec<usize> = (0..other.columns.len()).filter(|&c| c != right_key).collect();
        let mut columns = Vec::with_capacity(self.columns.len() + right_columns.len());
        for (i, name) in self.columns.iter().enumerate() {
            if i != left_key && other.has_column(name) {
                columns.push(format!("{}_x", name));
            } else {
                columns.push(name.clone());
            }
        }
        for &c in &right_columns {
            let name = &other.columns[c];
            if self.has_column(name) {
                columns.push(format!("{}_y", name));
            } else {
                columns.push(name.clone());
            }
        }

        let mut joined = Table::new(self.name.clone(), columns);
        for row in &self.rows {
            let Some(key) = row[left_key].as_text() else {
                continue;
            };
            let Some(matches) = right_rows.get(&key) else {
                continue;
            };
            for &m in matches {
                let mut out = row.clone();
                out.extend(right_columns.iter().map(|&c| other.rows[m][c].clone()));
                joined.push_row(out);
            }
        }
        Ok(joined)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", c, w = *w))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())?;
        }
        Ok(())
    }
}
