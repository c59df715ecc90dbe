//! Typed adaptors turning user closures into row-level predicates and
//! expressions.
//!
//! The engine evaluates filters and defined columns against a slice of
//! [`Value`]s, one per required column, in declaration order. [`RowPred`] and
//! [`RowExpr`] wrap the user callable together with its *arity* — the number
//! of column values it consumes — which the graph controller checks against
//! the supplied column list (or the default column list) at node-construction
//! time, never at run time.
//!
//! The `predN`/`exprN` constructors adapt ordinary typed closures, extracting
//! each argument via [`FromValue`]:
//!
//! ```ignore
//! use rowframe::{pred2, expr2};
//!
//! let p = pred2(|b2: i64, b1: f64| b2 % 2 == 1 && b1 < 4.0);
//! assert_eq!(p.arity(), 2);
//!
//! let e = expr2(|b1: f64, b2: i64| b1 + b2 as f64);
//! assert_eq!(e.arity(), 2);
//! ```
//!
//! A conversion failure (e.g. asking for `i64` from a float column) surfaces
//! as a run-time evaluation error and aborts the run.

use crate::value::{FromValue, Value};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

type PredFn = Arc<dyn Fn(&[Value]) -> Result<bool> + Send + Sync>;
type ExprFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A filter predicate over one row's column values.
#[derive(Clone)]
pub struct RowPred {
    arity: usize,
    f: PredFn,
}

impl RowPred {
    /// Wrap an untyped predicate with an explicit arity.
    ///
    /// The closure is handed exactly `arity` values, in column order.
    pub fn from_raw(
        arity: usize,
        f: impl Fn(&[Value]) -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        Self { arity, f: Arc::new(f) }
    }

    /// Number of column values this predicate consumes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn eval(&self, values: &[Value]) -> Result<bool> {
        (self.f)(values)
    }
}

impl fmt::Debug for RowPred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowPred(arity={})", self.arity)
    }
}

/// An expression computing one defined-column value from a row's column
/// values.
#[derive(Clone)]
pub struct RowExpr {
    arity: usize,
    f: ExprFn,
}

impl RowExpr {
    /// Wrap an untyped expression with an explicit arity.
    pub fn from_raw(
        arity: usize,
        f: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self { arity, f: Arc::new(f) }
    }

    /// Number of column values this expression consumes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn eval(&self, values: &[Value]) -> Result<Value> {
        (self.f)(values)
    }
}

impl fmt::Debug for RowExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowExpr(arity={})", self.arity)
    }
}

macro_rules! typed_adaptors {
    ($n:literal => $($A:ident),+) => {
        paste::paste! {
            #[doc = concat!(
                "Adapt a typed ", stringify!($n),
                "-argument closure into a [`RowPred`]."
            )]
            pub fn [<pred $n>]<$($A,)+ F>(f: F) -> RowPred
            where
                $($A: FromValue,)+
                F: Fn($($A),+) -> bool + Send + Sync + 'static,
            {
                RowPred::from_raw($n, move |values: &[Value]| {
                    let mut it = values.iter();
                    Ok(f($($A::from_value(
                        it.next().expect("arity checked at construction"),
                    )?),+))
                })
            }

            #[doc = concat!(
                "Adapt a typed ", stringify!($n),
                "-argument closure into a [`RowExpr`]."
            )]
            pub fn [<expr $n>]<$($A,)+ R, F>(f: F) -> RowExpr
            where
                $($A: FromValue,)+
                R: Into<Value>,
                F: Fn($($A),+) -> R + Send + Sync + 'static,
            {
                RowExpr::from_raw($n, move |values: &[Value]| {
                    Ok({
                        let mut it = values.iter();
                        f($($A::from_value(
                            it.next().expect("arity checked at construction"),
                        )?),+)
                    }
                    .into())
                })
            }
        }
    };
}

typed_adaptors!(1 => A);
typed_adaptors!(2 => A, B);
typed_adaptors!(3 => A, B, C);
typed_adaptors!(4 => A, B, C, D);
