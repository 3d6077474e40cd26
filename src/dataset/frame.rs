//! In-memory tabular frame over document-store records.
//!
//! A `DataFrame` is the transient structure the ingestion pipeline works on:
//! rows are records, columns are fields, cells are JSON scalars. A null cell
//! marks a missing value. Frames round-trip through headered CSV files with
//! no index column.

use std::collections::BTreeSet;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde_json::{Map, Value};

use crate::error::FrameError;

/// Tabular view of a document collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataFrame {
    /// Creates a frame from explicit columns and rows.
    ///
    /// Every row must have exactly one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, FrameError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FrameError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a frame from raw documents.
    ///
    /// The column set is the sorted union of all document keys, so frames
    /// built from unordered stores are deterministic. Keys absent from a
    /// document become null cells.
    pub fn from_documents(docs: &[Map<String, Value>]) -> Self {
        let columns: Vec<String> = docs
            .iter()
            .flat_map(|doc| doc.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = docs
            .iter()
            .map(|doc| {
                columns
                    .iter()
                    .map(|col| doc.get(col).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names, in frame order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell values of row `i`.
    pub fn row(&self, i: usize) -> &[Value] {
        &self.rows[i]
    }

    fn column_index(&self, name: &str) -> Result<usize, FrameError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }

    /// Returns a copy of the frame without the named columns.
    ///
    /// Fails if any name is not a column of the frame.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, FrameError> {
        let mut dropped = vec![false; self.columns.len()];
        for name in names {
            dropped[self.column_index(name.as_ref())?] = true;
        }

        let columns = self
            .columns
            .iter()
            .zip(&dropped)
            .filter(|(_, &d)| !d)
            .map(|(c, _)| c.clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&dropped)
                    .filter(|(_, &d)| !d)
                    .map(|(v, _)| v.clone())
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Returns a copy of the frame keeping only rows with no missing cells.
    pub fn drop_incomplete(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| !row.iter().any(Value::is_null))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Returns a copy of the frame containing the given rows, in order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    fn numeric_cell(&self, row: usize, col: usize) -> Result<f64, FrameError> {
        self.rows[row][col].as_f64().ok_or(FrameError::NonNumeric {
            column: self.columns[col].clone(),
            row,
        })
    }

    /// Extracts the named columns as a feature matrix.
    pub fn to_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f64>, FrameError> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect::<Result<_, _>>()?;

        let mut data = Vec::with_capacity(self.n_rows() * indices.len());
        for row in 0..self.n_rows() {
            for &col in &indices {
                data.push(self.numeric_cell(row, col)?);
            }
        }
        Ok(Array2::from_shape_vec((self.n_rows(), indices.len()), data)
            .expect("cell count matches frame shape"))
    }

    /// Extracts a single column as a target vector.
    pub fn column_vector(&self, name: &str) -> Result<Array1<f64>, FrameError> {
        let col = self.column_index(name)?;
        (0..self.n_rows())
            .map(|row| self.numeric_cell(row, col))
            .collect()
    }

    /// Writes the frame as a headered CSV file, overwriting any existing
    /// file at the path. No index column is emitted.
    pub fn write_csv(&self, path: &Path) -> Result<(), FrameError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_to_field))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a headered CSV file back into a frame.
    ///
    /// Empty fields become nulls; fields that parse as integers, floats or
    /// booleans become the corresponding JSON scalar; everything else stays
    /// a string.
    pub fn read_csv(path: &Path) -> Result<Self, FrameError> {
        let mut reader = csv::Reader::from_path(path)?;
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(field_to_cell).collect());
        }

        Self::new(columns, rows)
    }
}

fn cell_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_to_cell(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        return Value::from(f);
    }
    match field {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(field.to_string()),
    }
}
