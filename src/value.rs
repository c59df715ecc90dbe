//! The closed value type carried between columns, predicates, and actions.
//!
//! Every cell the engine reads — from a source column or a defined column —
//! is a [`Value`]. The set of supported shapes is closed: four scalar kinds
//! plus two homogeneous list kinds. Type dispatch therefore happens once per
//! value with an enum match instead of per-row dynamic casts.
//!
//! Two conversion surfaces live here:
//! - [`From`] impls turn plain Rust values into [`Value`]s (used by defined
//!   columns, whose expressions return ordinary Rust types).
//! - [`FromValue`] extracts a typed Rust value back out, with the single
//!   widening coercion `Int -> f64`. Predicate/expression adaptors in
//!   [`row_fn`](crate::row_fn) use it to hand typed arguments to closures.
//!
//! Numeric actions (sum, min, max, mean, histogram fill) fold list-valued
//! cells element by element via [`Value::for_each_f64`], so a `FloatList`
//! cell of three elements contributes three observations, not one.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A single cell value: one column, one row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
}

/// Runtime tag for the shape of a column's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Str,
    IntList,
    FloatList,
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Bool(_) => ColumnType::Bool,
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Str(_) => ColumnType::Str,
            Value::IntList(_) => ColumnType::IntList,
            Value::FloatList(_) => ColumnType::FloatList,
        }
    }

    /// Readable name of this value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::IntList(_) => "int list",
            Value::FloatList(_) => "float list",
        }
    }

    /// Fold every numeric observation in this cell into `f`.
    ///
    /// Scalars contribute one observation; lists contribute one per element.
    /// Non-numeric values are an error.
    pub fn for_each_f64(&self, f: &mut dyn FnMut(f64)) -> Result<()> {
        match self {
            Value::Int(v) => f(*v as f64),
            Value::Float(v) => f(*v),
            Value::IntList(vs) => {
                for v in vs {
                    f(*v as f64);
                }
            }
            Value::FloatList(vs) => {
                for v in vs {
                    f(*v);
                }
            }
            other => bail!("value of type `{}` is not numeric", other.type_name()),
        }
        Ok(())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}
impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatList(v)
    }
}

/// Typed extraction from a [`Value`].
///
/// Implemented for the primitive shapes the engine supports. `f64` accepts
/// `Int` cells (widening); everything else requires an exact shape match.
pub trait FromValue: Sized + Send + 'static {
    fn from_value(v: &Value) -> Result<Self>;
}

impl FromValue for f64 {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Float(x) => Ok(*x),
            Value::Int(x) => Ok(*x as f64),
            other => bail!("expected a numeric value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for i64 {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Int(x) => Ok(*x),
            other => bail!("expected an int value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for bool {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Bool(x) => Ok(*x),
            other => bail!("expected a bool value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for String {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Str(x) => Ok(x.clone()),
            other => bail!("expected a str value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for Vec<i64> {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::IntList(xs) => Ok(xs.clone()),
            other => bail!("expected an int list value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for Vec<f64> {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::FloatList(xs) => Ok(xs.clone()),
            Value::IntList(xs) => Ok(xs.iter().map(|x| *x as f64).collect()),
            other => bail!("expected a float list value, got `{}`", other.type_name()),
        }
    }
}

impl FromValue for Value {
    fn from_value(v: &Value) -> Result<Self> {
        Ok(v.clone())
    }
}
