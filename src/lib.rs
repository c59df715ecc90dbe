//! # Rowframe
//!
//! A lazy, columnar data-transformation engine: build a DAG of filters,
//! defined columns, and terminal actions over a row source, then execute
//! everything in a single pass over the rows.
//!
//! ## Model
//!
//! A [`DataFrame`] wraps one [`ColumnSource`] and is the root of a
//! transformation graph. Chaining methods grow the graph without touching
//! any data:
//!
//! - [`filter`](NodeHandle::filter) attaches a row predicate; only rows
//!   passing every ancestor filter reach the nodes below.
//! - [`define`](NodeHandle::define) attaches a named computed column,
//!   visible to all descendants and usable anywhere a source column is.
//! - Terminal actions ([`count`](NodeHandle::count),
//!   [`sum`](NodeHandle::sum), [`min`](NodeHandle::min),
//!   [`max`](NodeHandle::max), [`mean`](NodeHandle::mean),
//!   [`histogram`](NodeHandle::histogram), [`collect`](NodeHandle::collect),
//!   [`foreach`](NodeHandle::foreach)) book work and return a lazy
//!   [`ResultHandle`] immediately.
//!
//! Nothing runs until a handle's [`get`](ResultHandle::get) is called (or
//! [`DataFrame::run`] explicitly). That one run executes *every* booked
//! action in the same pass, so booking many results before reading any of
//! them loops over the data once, not once per result.
//!
//! ```ignore
//! use rowframe::{pred1, pred2, expr2, DataFrame, MemSource};
//!
//! let source = MemSource::builder()
//!     .f64_column("pt", vec![12.0, 48.5, 7.2, 33.1])
//!     .i64_column("charge", vec![1, -1, 1, -1])
//!     .default_columns(["pt"])
//!     .build()?;
//!
//! let df = DataFrame::new(source);
//! let selected = df.filter(pred1(|pt: f64| pt > 10.0), &["pt"])?;
//! let with_w = selected.define("w", expr2(|pt: f64, q: i64| pt * q as f64), &["pt", "charge"])?;
//!
//! let n = selected.count()?;
//! let m = with_w.mean(Some("w"))?;
//! println!("{} rows, mean weight {}", n.get()?, m.get()?);
//! ```
//!
//! ## Per-row evaluation guarantees
//!
//! Within one run, per worker slot:
//!
//! - every filter predicate is evaluated **at most once per row**, no
//!   matter how many downstream consumers share it;
//! - once a filter in a chain fails, predicates further down the chain are
//!   not evaluated for that row;
//! - every defined column expression is evaluated **at most once per row**,
//!   and its value never depends on ancestor filters.
//!
//! ## Parallelism
//!
//! [`ExecMode::Parallel`] splits the row range into one contiguous
//! partition per worker slot, executed on the rayon pool. Slot state
//! (readers, memo tables, accumulators) is private per slot, and per-slot
//! partials merge in slot order at the end, so every action except the row
//! order of multi-slot [`collect`](NodeHandle::collect) is independent of
//! the slot count.
//!
//! ## Lifecycle
//!
//! A run consumes its booked actions and discards filter nodes; handles to
//! consumed nodes fail cleanly afterwards. Defined columns persist, so new
//! chains can keep building on them after a run. A failed run commits
//! nothing: actions stay booked and result handles stay pending.

pub mod chain;
pub mod frame;
pub mod histogram;
pub mod node_id;
pub mod result;
pub mod row_fn;
pub mod source;
pub mod testing;
pub mod value;

mod node;
mod ops;
mod runner;
mod slot;

pub use chain::NodeHandle;
pub use frame::DataFrame;
pub use histogram::Histo1D;
pub use node_id::NodeId;
pub use result::ResultHandle;
pub use row_fn::{
    expr1, expr2, expr3, expr4, pred1, pred2, pred3, pred4, RowExpr, RowPred,
};
pub use runner::ExecMode;
pub use source::{ColumnData, ColumnReader, ColumnSource, MemSource, MemSourceBuilder};
pub use value::{ColumnType, FromValue, Value};
