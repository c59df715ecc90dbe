//! The column-source contract and an in-memory implementation.
//!
//! The engine treats physical storage as an external collaborator specified
//! only at this interface:
//! - [`ColumnSource`] describes a row-oriented/columnar store: a default
//!   column list, a row count, and a per-`(column, slot)` [`ColumnReader`]
//!   binding resolved once per run, not once per row.
//! - [`MemSource`] is the bundled in-memory store backed by typed vectors,
//!   used by tests and small jobs.
//!
//! Readers are slot-private: each worker slot binds its own reader for every
//! column it touches, so the hot loop performs no cross-thread coordination.

use crate::value::{ColumnType, Value};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A columnar data source the engine can run over.
pub trait ColumnSource: Send + Sync {
    /// Columns substituted when a node omits its column list.
    fn default_columns(&self) -> &[String];

    /// Total number of rows; the run loop iterates `0..row_count()`.
    fn row_count(&self) -> u64;

    /// Whether `name` is a physical column of this source.
    fn has_column(&self, name: &str) -> bool;

    /// Bind `name` to a reader for `slot`. Called once per run per slot per
    /// required column.
    fn reader(&self, name: &str, slot: usize) -> Result<Box<dyn ColumnReader>>;
}

/// A bound per-slot accessor for one column.
pub trait ColumnReader: Send {
    /// Read the value at `row`.
    fn value(&self, row: u64) -> Result<Value>;
}

/// Typed backing storage for one in-memory column.
#[derive(Clone, Debug)]
pub enum ColumnData {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    IntList(Vec<Vec<i64>>),
    FloatList(Vec<Vec<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Bool(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Str(v) => v.len(),
            ColumnData::IntList(v) => v.len(),
            ColumnData::FloatList(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Bool(_) => ColumnType::Bool,
            ColumnData::Int(_) => ColumnType::Int,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::Str(_) => ColumnType::Str,
            ColumnData::IntList(_) => ColumnType::IntList,
            ColumnData::FloatList(_) => ColumnType::FloatList,
        }
    }

    fn value_at(&self, row: usize) -> Value {
        match self {
            ColumnData::Bool(v) => Value::Bool(v[row]),
            ColumnData::Int(v) => Value::Int(v[row]),
            ColumnData::Float(v) => Value::Float(v[row]),
            ColumnData::Str(v) => Value::Str(v[row].clone()),
            ColumnData::IntList(v) => Value::IntList(v[row].clone()),
            ColumnData::FloatList(v) => Value::FloatList(v[row].clone()),
        }
    }
}

/// In-memory column source: named typed vectors of equal length.
pub struct MemSource {
    columns: HashMap<String, Arc<ColumnData>>,
    defaults: Vec<String>,
    rows: u64,
}

impl std::fmt::Debug for MemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemSource")
            .field("columns", &self.columns.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .field("rows", &self.rows)
            .finish()
    }
}

impl MemSource {
    pub fn builder() -> MemSourceBuilder {
        MemSourceBuilder::default()
    }
}

impl ColumnSource for MemSource {
    fn default_columns(&self) -> &[String] {
        &self.defaults
    }

    fn row_count(&self) -> u64 {
        self.rows
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    fn reader(&self, name: &str, _slot: usize) -> Result<Box<dyn ColumnReader>> {
        let data = self
            .columns
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("column `{name}` does not exist in the data source"))?;
        Ok(Box::new(MemReader { data, rows: self.rows }))
    }
}

struct MemReader {
    data: Arc<ColumnData>,
    rows: u64,
}

impl ColumnReader for MemReader {
    fn value(&self, row: u64) -> Result<Value> {
        if row >= self.rows {
            bail!("row {row} out of range ({} rows)", self.rows);
        }
        Ok(self.data.value_at(row as usize))
    }
}

/// Builder for [`MemSource`]; validates column lengths and names on `build`.
#[derive(Default)]
pub struct MemSourceBuilder {
    columns: Vec<(String, ColumnData)>,
    defaults: Vec<String>,
}

impl MemSourceBuilder {
    pub fn column(mut self, name: impl Into<String>, data: ColumnData) -> Self {
        self.columns.push((name.into(), data));
        self
    }

    pub fn bool_column(self, name: impl Into<String>, data: Vec<bool>) -> Self {
        self.column(name, ColumnData::Bool(data))
    }

    pub fn i64_column(self, name: impl Into<String>, data: Vec<i64>) -> Self {
        self.column(name, ColumnData::Int(data))
    }

    pub fn f64_column(self, name: impl Into<String>, data: Vec<f64>) -> Self {
        self.column(name, ColumnData::Float(data))
    }

    pub fn str_column(self, name: impl Into<String>, data: Vec<String>) -> Self {
        self.column(name, ColumnData::Str(data))
    }

    pub fn i64_list_column(self, name: impl Into<String>, data: Vec<Vec<i64>>) -> Self {
        self.column(name, ColumnData::IntList(data))
    }

    pub fn f64_list_column(self, name: impl Into<String>, data: Vec<Vec<f64>>) -> Self {
        self.column(name, ColumnData::FloatList(data))
    }

    /// Set the default column list used when nodes omit theirs.
    pub fn default_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<MemSource> {
        let mut columns: HashMap<String, Arc<ColumnData>> = HashMap::new();
        let mut rows: Option<usize> = None;
        for (name, data) in self.columns {
            if columns.contains_key(&name) {
                bail!("duplicate column `{name}` in data source");
            }
            match rows {
                None => rows = Some(data.len()),
                Some(n) if n != data.len() => bail!(
                    "column `{name}` has {} row(s) but previous columns have {n}",
                    data.len()
                ),
                Some(_) => {}
            }
            columns.insert(name, Arc::new(data));
        }
        for name in &self.defaults {
            if !columns.contains_key(name) {
                bail!("default column `{name}` does not exist in the data source");
            }
        }
        Ok(MemSource {
            columns,
            defaults: self.defaults,
            rows: rows.unwrap_or(0) as u64,
        })
    }
}
