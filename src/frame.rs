//! The graph controller: owns the node arena, the booked actions, and the
//! run configuration.
//!
//! A [`DataFrame`] is the root of a transformation graph over one
//! [`ColumnSource`]. Users attach filters, defined columns, and terminal
//! actions through [`NodeHandle`]s (the `DataFrame` itself exposes the same
//! builder methods against the root node); nothing executes until a
//! [`ResultHandle`](crate::ResultHandle) is read or [`DataFrame::run`] is
//! called explicitly.
//!
//! Lifecycle policy: a run consumes its booked actions and discards the
//! filter nodes they hung from. Defined columns persist for the graph's
//! lifetime — they are referenced by name, may be shared ancestors of many
//! subtrees, and stay valid parents for chains built after a run. When
//! filters are discarded, surviving defines are re-parented past them to the
//! nearest surviving ancestor; since a define's value never depends on its
//! ancestor filters, this preserves its semantics exactly.
//!
//! All handles hold a [`Weak`] reference to the controller, so the
//! controller's lifetime is the `DataFrame` value itself: a handle used
//! after the frame is dropped fails with a reachability error.

use crate::chain::NodeHandle;
use crate::histogram::Histo1D;
use crate::node::{Arena, Node};
use crate::node_id::NodeId;
use crate::ops::ActionOp;
use crate::result::ResultHandle;
use crate::row_fn::{RowExpr, RowPred};
use crate::runner::{self, ExecMode};
use crate::source::ColumnSource;
use crate::value::{FromValue, Value};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One booked terminal action, consumed by the next run.
pub(crate) struct BookedAction {
    pub parent: NodeId,
    pub columns: Vec<String>,
    pub op: Arc<dyn ActionOp>,
}

pub(crate) struct FrameInner {
    pub arena: Arena,
    pub root: NodeId,
    pub source: Arc<dyn ColumnSource>,
    pub default_columns: Vec<String>,
    pub defines: HashMap<String, NodeId>,
    pub actions: Vec<BookedAction>,
    pub mode: ExecMode,
}

impl FrameInner {
    /// Resolve the column list for a node of the given arity: the explicit
    /// list when its length matches, the default list when the explicit one
    /// is empty and the defaults match, otherwise a construction error.
    pub fn pick_columns(&self, arity: usize, given: &[&str], what: &str) -> Result<Vec<String>> {
        if given.len() == arity {
            return Ok(given.iter().map(|s| s.to_string()).collect());
        }
        if given.is_empty() {
            if self.default_columns.len() == arity {
                return Ok(self.default_columns.clone());
            }
            bail!(
                "{what} takes {arity} argument(s) but the default column list has {} name(s)",
                self.default_columns.len()
            );
        }
        bail!(
            "{what} takes {arity} argument(s) but {} column name(s) were supplied",
            given.len()
        );
    }

    /// Resolve the column for a single-column action, falling back to a
    /// single-entry default list when the name is omitted.
    pub fn single_column(&self, column: Option<&str>, what: &str) -> Result<String> {
        match column {
            Some(name) => Ok(name.to_string()),
            None => {
                if self.default_columns.len() == 1 {
                    Ok(self.default_columns[0].clone())
                } else {
                    bail!(
                        "no column given to {what} and the default column list does not \
                         contain exactly one name"
                    )
                }
            }
        }
    }

    pub fn check_define_name(&self, name: &str) -> Result<()> {
        if self.source.has_column(name) {
            bail!("cannot define column `{name}`: a source column with that name already exists");
        }
        if self.defines.contains_key(name) {
            bail!("cannot define column `{name}`: a defined column with that name already exists");
        }
        Ok(())
    }

    /// Drop all filter nodes after a successful run and re-parent surviving
    /// defines to their nearest surviving ancestor.
    pub fn discard_filters(&mut self) {
        let live = self.arena.live_ids();
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut filters: Vec<NodeId> = Vec::new();
        for id in &live {
            if let Some(entry) = self.arena.get(*id) {
                parents.insert(*id, entry.parent);
                if matches!(entry.node, Node::Filter { .. }) {
                    filters.push(*id);
                }
            }
        }
        for id in &filters {
            self.arena.remove(*id);
        }
        let define_ids: Vec<NodeId> = self.defines.values().copied().collect();
        for id in define_ids {
            let mut parent = match parents.get(&id) {
                Some(p) => *p,
                None => continue,
            };
            while self.arena.get(parent).is_none() {
                match parents.get(&parent) {
                    Some(next) => parent = *next,
                    None => {
                        parent = self.root;
                        break;
                    }
                }
            }
            self.arena.set_parent(id, parent);
        }
    }
}

/// A lazy, columnar transformation graph over one column source.
pub struct DataFrame {
    pub(crate) inner: Arc<Mutex<FrameInner>>,
}

impl DataFrame {
    /// Create a frame over `source`, adopting the source's default columns.
    pub fn new(source: impl ColumnSource + 'static) -> Self {
        let source: Arc<dyn ColumnSource> = Arc::new(source);
        let (arena, root) = Arena::new();
        let default_columns = source.default_columns().to_vec();
        DataFrame {
            inner: Arc::new(Mutex::new(FrameInner {
                arena,
                root,
                source,
                default_columns,
                defines: HashMap::new(),
                actions: Vec::new(),
                mode: ExecMode::Sequential,
            })),
        }
    }

    /// Set the execution mode, consuming and returning the frame for
    /// builder-style construction.
    pub fn with_mode(self, mode: ExecMode) -> Self {
        self.inner.lock().unwrap().mode = mode;
        self
    }

    pub fn set_mode(&self, mode: ExecMode) {
        self.inner.lock().unwrap().mode = mode;
    }

    /// Handle to the root node, the parent of first-stage transformations.
    pub fn node(&self) -> NodeHandle {
        let root = self.inner.lock().unwrap().root;
        NodeHandle {
            frame: Arc::downgrade(&self.inner),
            id: root,
        }
    }

    pub fn default_columns(&self) -> Vec<String> {
        self.inner.lock().unwrap().default_columns.clone()
    }

    /// Execute all booked actions in one pass over the rows.
    ///
    /// Idempotent relative to readiness: a no-op when no unconsumed actions
    /// remain. On an evaluation error nothing is committed — booked actions
    /// stay in place and result handles stay pending.
    pub fn run(&self) -> Result<()> {
        runner::run_frame(&self.inner)
    }

    // Builder methods delegated to the root node.

    pub fn filter(&self, pred: RowPred, columns: &[&str]) -> Result<NodeHandle> {
        self.node().filter(pred, columns)
    }

    pub fn define(&self, name: &str, expr: RowExpr, columns: &[&str]) -> Result<NodeHandle> {
        self.node().define(name, expr, columns)
    }

    pub fn count(&self) -> Result<ResultHandle<u64>> {
        self.node().count()
    }

    pub fn sum(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        self.node().sum(column)
    }

    pub fn min(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        self.node().min(column)
    }

    pub fn max(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        self.node().max(column)
    }

    pub fn mean(&self, column: Option<&str>) -> Result<ResultHandle<f64>> {
        self.node().mean(column)
    }

    pub fn histogram(
        &self,
        column: Option<&str>,
        bins: usize,
        low: f64,
        high: f64,
    ) -> Result<ResultHandle<Histo1D>> {
        self.node().histogram(column, bins, low, high)
    }

    pub fn collect<T>(&self, column: Option<&str>) -> Result<ResultHandle<Vec<T>>>
    where
        T: FromValue + Clone,
    {
        self.node().collect(column)
    }

    pub fn foreach<F>(&self, f: F, columns: &[&str]) -> Result<ResultHandle<()>>
    where
        F: Fn(usize, &[Value]) + Send + Sync + 'static,
    {
        self.node().foreach(f, columns)
    }
}
