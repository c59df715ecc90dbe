//! Per-slot execution state: column bindings and per-row memoization.
//!
//! Each worker slot owns one [`SlotCtx`], bound once per run. The context
//! holds a private [`ColumnReader`] per source column a node touches, plus
//! two memo tables keyed by plan-node index:
//!
//! - filters remember `(row, passed)` so a filter shared by several
//!   downstream consumers is evaluated at most once per row per slot, and
//! - defined columns remember `(row, value)` with the same guarantee.
//!
//! Everything here is slot-private. Workers never share a context, so the
//! hot loop takes no locks.

use crate::runner::{PlanKind, Resolved, RunPlan};
use crate::source::{ColumnReader, ColumnSource};
use crate::value::Value;
use anyhow::{bail, Result};

/// One resolved input of a node or action.
enum Binding {
    /// Bound reader for a physical source column.
    Source(Box<dyn ColumnReader>),
    /// Plan index of the defined column producing this input.
    Derived(usize),
}

/// Deferred fetch result; lets a reader borrow end before a derived value
/// is computed through `&mut self`.
enum Fetch {
    Ready(Value),
    Derived(usize),
}

pub(crate) struct SlotCtx {
    node_bindings: Vec<Vec<Binding>>,
    action_bindings: Vec<Vec<Binding>>,
    filter_cache: Vec<Option<(u64, bool)>>,
    define_cache: Vec<Option<(u64, Value)>>,
}

impl SlotCtx {
    /// Bind every node and action input of `plan` for one slot.
    ///
    /// Unknown source columns surface here, before any row is read.
    pub fn bind(plan: &RunPlan, source: &dyn ColumnSource, slot: usize) -> Result<Self> {
        let bind_all = |inputs: &[Resolved]| -> Result<Vec<Binding>> {
            inputs
                .iter()
                .map(|input| match input {
                    Resolved::Source(name) => Ok(Binding::Source(source.reader(name, slot)?)),
                    Resolved::Derived(idx) => Ok(Binding::Derived(*idx)),
                })
                .collect()
        };
        let mut node_bindings = Vec::with_capacity(plan.node_count());
        for idx in 0..plan.node_count() {
            node_bindings.push(match plan.inputs_of(idx) {
                Some(inputs) => bind_all(inputs)?,
                None => Vec::new(),
            });
        }
        let mut action_bindings = Vec::with_capacity(plan.actions().len());
        for action in plan.actions() {
            action_bindings.push(bind_all(&action.inputs)?);
        }
        Ok(Self {
            node_bindings,
            action_bindings,
            filter_cache: vec![None; plan.node_count()],
            define_cache: vec![None; plan.node_count()],
        })
    }

    /// Evaluate a root-to-leaf filter chain for `row`.
    ///
    /// Once a filter fails, the remaining filters are recorded as failed for
    /// this row without evaluating their predicates, so a later chain
    /// sharing a suffix still gets a cache hit.
    pub fn check_chain(&mut self, plan: &RunPlan, chain: &[usize], row: u64) -> Result<bool> {
        let mut passed = true;
        for &idx in chain {
            if let Some((cached_row, res)) = self.filter_cache[idx] {
                if cached_row == row {
                    passed = res;
                    continue;
                }
            }
            let res = if !passed {
                false
            } else {
                let values = self.node_inputs(plan, idx, row)?;
                match plan.kind_of(idx) {
                    PlanKind::Filter(pred) => pred.eval(&values)?,
                    _ => bail!("filter chain references a non-filter node"),
                }
            };
            self.filter_cache[idx] = Some((row, res));
            passed = res;
        }
        Ok(passed)
    }

    /// Column values for one booked action at `row`.
    pub fn action_values(&mut self, plan: &RunPlan, action: usize, row: u64) -> Result<Vec<Value>> {
        let n = self.action_bindings[action].len();
        let mut out = Vec::with_capacity(n);
        for k in 0..n {
            let fetch = match &self.action_bindings[action][k] {
                Binding::Source(reader) => Fetch::Ready(reader.value(row)?),
                Binding::Derived(idx) => Fetch::Derived(*idx),
            };
            out.push(self.resolve(plan, fetch, row)?);
        }
        Ok(out)
    }

    fn node_inputs(&mut self, plan: &RunPlan, idx: usize, row: u64) -> Result<Vec<Value>> {
        let n = self.node_bindings[idx].len();
        let mut out = Vec::with_capacity(n);
        for k in 0..n {
            let fetch = match &self.node_bindings[idx][k] {
                Binding::Source(reader) => Fetch::Ready(reader.value(row)?),
                Binding::Derived(didx) => Fetch::Derived(*didx),
            };
            out.push(self.resolve(plan, fetch, row)?);
        }
        Ok(out)
    }

    fn resolve(&mut self, plan: &RunPlan, fetch: Fetch, row: u64) -> Result<Value> {
        match fetch {
            Fetch::Ready(v) => Ok(v),
            Fetch::Derived(idx) => self.define_value(plan, idx, row),
        }
    }

    /// Memoized value of a defined column at `row`.
    ///
    /// Defined columns are computed unconditionally: their value never
    /// depends on whether ancestor filters pass, which is what makes them
    /// shareable across subtrees (and re-parentable when filters are
    /// discarded).
    fn define_value(&mut self, plan: &RunPlan, idx: usize, row: u64) -> Result<Value> {
        if let Some((cached_row, v)) = &self.define_cache[idx] {
            if *cached_row == row {
                return Ok(v.clone());
            }
        }
        let values = self.node_inputs(plan, idx, row)?;
        let v = match plan.kind_of(idx) {
            PlanKind::Define(expr) => expr.eval(&values)?,
            _ => bail!("derived input references a non-define node"),
        };
        self.define_cache[idx] = Some((row, v.clone()));
        Ok(v)
    }
}
