//! Chaining handles: the user-facing surface for growing the graph.
//!
//! A [`NodeHandle`] names one node of a [`DataFrame`](crate::DataFrame)'s
//! graph and is the parent for further filters, defined columns, and
//! terminal actions. Handles are cheap to clone and hold only a weak
//! reference to the controller — several handles may share one parent
//! (fan-out), and the memoization protocol guarantees the shared ancestor
//! is still evaluated at most once per row per slot.
//!
//! Every action booking returns a [`ResultHandle`]: a lazy future for that
//! action's finalized output, triggering one run of the whole graph on
//! first access.
//!
//! ```ignore
//! use rowframe::{pred1, DataFrame};
//!
//! let df = DataFrame::new(source);
//! let selected = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
//! let n = selected.count()?;
//! println!("{}", n.get()?);
//! ```

use crate::frame::{BookedAction, FrameInner};
use crate::histogram::Histo1D;
use crate::node::Node;
use crate::node_id::NodeId;
use crate::ops::{CollectOp, CountOp, FillOp, ForeachOp, MaxOp, MeanOp, MinOp, SumOp};
use crate::result::{ResultCell, ResultHandle};
use crate::row_fn::{RowExpr, RowPred};
use crate::value::{FromValue, Value};
use anyhow::{anyhow, Context, Result};
use std::sync::{Arc, Mutex, Weak};

/// A handle to one node of a transformation graph.
#[derive(Clone)]
pub struct NodeHandle {
    pub(crate) frame: Weak<Mutex<FrameInner>>,
    pub(crate) id: NodeId,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle").field("id", &self.id).finish()
    }
}

impl NodeHandle {
    fn frame(&self) -> Result<Arc<Mutex<FrameInner>>> {
        self.frame.upgrade().ok_or_else(|| {
            anyhow!("the owning DataFrame is no longer reachable: did it go out of scope?")
        })
    }

    /// Attach a filter below this node.
    ///
    /// The predicate's arity is checked against `columns` (or the default
    /// column list when `columns` is empty) here, at construction.
    pub fn filter(&self, pred: RowPred, columns: &[&str]) -> Result<NodeHandle> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot attach a filter here")?;
        let cols = inner.pick_columns(pred.arity(), columns, "filter predicate")?;
        let id = inner.arena.insert(self.id, Node::Filter { pred, columns: cols });
        Ok(NodeHandle { frame: self.frame.clone(), id })
    }

    /// Attach a defined column below this node.
    ///
    /// `name` must not collide with a source column or an existing defined
    /// column; the new column is visible to all descendants of the returned
    /// node and persists across runs.
    pub fn define(&self, name: &str, expr: RowExpr, columns: &[&str]) -> Result<NodeHandle> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot attach a defined column here")?;
        inner.check_define_name(name)?;
        let cols = inner.pick_columns(expr.arity(), columns, "column expression")?;
        let id = inner.arena.insert(
            self.id,
            Node::Define { name: name.to_string(), expr, columns: cols },
        );
        inner.defines.insert(name.to_string(), id);
        Ok(NodeHandle { frame: self.frame.clone(), id })
    }

    /// Count the rows that pass all ancestor filters.
    pub fn count(&self) -> Result<ResultHandle<u64>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a count action here")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: Vec::new(),
            op: Arc::new(CountOp { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Sum the numeric observations of `column` over passing rows.
    pub fn sum(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a sum action here")?;
        let col = inner.single_column(column, "sum")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(SumOp { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Minimum over passing rows; `+inf` when no row passes.
    pub fn min(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a min action here")?;
        let col = inner.single_column(column, "min")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(MinOp { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Maximum over passing rows; `-inf` when no row passes.
    pub fn max(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a max action here")?;
        let col = inner.single_column(column, "max")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(MaxOp { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Arithmetic mean over passing rows; `0.0` when no row passes.
    pub fn mean(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a mean action here")?;
        let col = inner.single_column(column, "mean")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(MeanOp { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Fill a one-dimensional histogram from `column` over passing rows.
    ///
    /// `low == high` requests auto-ranging: the axis is extended to the
    /// global min/max observed across all slots before the bulk fill.
    pub fn histogram(
        &self,
        column: Option<&str>,
        bins: usize,
        low: f64,
        high: f64,
    ) -> Result<ResultHandle<Histo1D>> {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a histogram action here")?;
        let col = inner.single_column(column, "histogram")?;
        let model = Histo1D::new(bins, low, high)?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(FillOp { cell: Arc::clone(&cell), model }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Collect the typed values of `column` over passing rows.
    ///
    /// Row order is preserved within a slot; with more than one slot, slot
    /// 0's rows come first and the remaining slots are appended in slot
    /// order.
    pub fn collect<T>(&self, column: Option<&str>) -> Result<ResultHandle<Vec<T>>>
    where
        T: FromValue + Clone,
    {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a collect action here")?;
        let col = inner.single_column(column, "collect")?;
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: vec![col],
            op: Arc::new(CollectOp::<T> { cell: Arc::clone(&cell) }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }

    /// Invoke `f(slot, values)` for every passing row; no merge step.
    ///
    /// An empty `columns` list falls back to the default column list.
    pub fn foreach<F>(&self, f: F, columns: &[&str]) -> Result<ResultHandle<()>>
    where
        F: Fn(usize, &[Value]) + Send + Sync + 'static,
    {
        let frame = self.frame()?;
        let mut inner = frame.lock().unwrap();
        inner
            .arena
            .get_checked(self.id)
            .context("cannot book a foreach action here")?;
        let cols: Vec<String> = if columns.is_empty() {
            inner.default_columns.clone()
        } else {
            columns.iter().map(|s| s.to_string()).collect()
        };
        let cell = Arc::new(ResultCell::new());
        inner.actions.push(BookedAction {
            parent: self.id,
            columns: cols,
            op: Arc::new(ForeachOp {
                f: Arc::new(f),
                cell: Arc::clone(&cell),
            }),
        });
        Ok(ResultHandle::new(cell, self.frame.clone()))
    }
}
