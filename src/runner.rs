//! Run planning and single-pass execution.
//!
//! A run happens in three phases:
//!
//! 1. **Plan** ([`build_plan`]): snapshot the live graph into an indexable
//!    [`RunPlan`] — per-node input resolution (source column vs defined
//!    column, with a visibility check for defines), and one precomputed
//!    root-to-leaf filter chain per booked action. All name resolution
//!    happens here, once, never in the row loop.
//! 2. **Accumulate**: the row range is split into one contiguous partition
//!    per slot; each slot binds its own [`SlotCtx`](crate::slot::SlotCtx)
//!    and folds its rows through every action's chain and accumulator.
//!    Partitions map one-to-one onto rayon tasks, so slot state needs no
//!    synchronization.
//! 3. **Finalize**: per-slot partials are merged in slot order and published
//!    into the result cells; the booked actions are consumed and filter
//!    nodes are discarded.
//!
//! A planning or evaluation error aborts before finalize: nothing is
//! published, actions stay booked, and a later run retries from scratch.

use crate::frame::FrameInner;
use crate::node::Node;
use crate::node_id::NodeId;
use crate::ops::{ActionOp, SlotAcc};
use crate::row_fn::{RowExpr, RowPred};
use crate::slot::SlotCtx;
use crate::source::ColumnSource;
use anyhow::{anyhow, bail, Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex};

/// How a run distributes rows over worker slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// One slot, rows in source order.
    #[default]
    Sequential,
    /// One contiguous row partition per slot, executed on the rayon pool.
    /// `workers: None` uses one slot per available CPU.
    Parallel { workers: Option<usize> },
}

impl ExecMode {
    fn n_slots(&self) -> usize {
        match self {
            ExecMode::Sequential => 1,
            ExecMode::Parallel { workers } => workers.unwrap_or_else(num_cpus::get).max(1),
        }
    }
}

pub(crate) enum PlanKind {
    Root,
    Filter(RowPred),
    Define(RowExpr),
}

/// A node input after name resolution.
#[derive(Clone)]
pub(crate) enum Resolved {
    /// Physical column, bound to a reader per slot.
    Source(String),
    /// Plan index of the defined column producing the value.
    Derived(usize),
}

struct PlanNode {
    kind: PlanKind,
    inputs: Vec<Resolved>,
}

pub(crate) struct PlanAction {
    /// Filter plan indices from root to the action's parent.
    pub chain: Vec<usize>,
    pub inputs: Vec<Resolved>,
    pub op: Arc<dyn ActionOp>,
}

/// Immutable snapshot of the graph for one run, indexed by arena slot.
pub(crate) struct RunPlan {
    nodes: Vec<Option<PlanNode>>,
    actions: Vec<PlanAction>,
}

impl RunPlan {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn actions(&self) -> &[PlanAction] {
        &self.actions
    }

    pub fn inputs_of(&self, idx: usize) -> Option<&[Resolved]> {
        self.nodes[idx].as_ref().map(|n| n.inputs.as_slice())
    }

    pub fn kind_of(&self, idx: usize) -> &PlanKind {
        &self
            .nodes
            .get(idx)
            .and_then(|n| n.as_ref())
            .expect("plan references a node outside the snapshot")
            .kind
    }
}

/// Whether `target` is `from` or one of its ancestors.
fn is_ancestor(parents: &[Option<usize>], mut from: usize, target: usize) -> bool {
    loop {
        if from == target {
            return true;
        }
        match parents[from] {
            Some(p) if p != from => from = p,
            _ => return false,
        }
    }
}

fn resolve_columns(
    inner: &FrameInner,
    parents: &[Option<usize>],
    defines_by_name: &HashMap<&str, usize>,
    scope: usize,
    columns: &[String],
) -> Result<Vec<Resolved>> {
    columns
        .iter()
        .map(|name| {
            if let Some(&didx) = defines_by_name.get(name.as_str()) {
                if !is_ancestor(parents, scope, didx) {
                    bail!(
                        "defined column `{name}` is not visible here: it was defined on \
                         a different branch of the graph"
                    );
                }
                return Ok(Resolved::Derived(didx));
            }
            if inner.source.has_column(name) {
                return Ok(Resolved::Source(name.clone()));
            }
            bail!("unknown column `{name}`: not a source column or a defined column")
        })
        .collect()
}

/// Snapshot the live graph and resolve every input name.
pub(crate) fn build_plan(inner: &FrameInner) -> Result<RunPlan> {
    let n = inner.arena.slot_count();
    let mut parents: Vec<Option<usize>> = vec![None; n];
    let live = inner.arena.live_ids();
    for id in &live {
        if let Some(entry) = inner.arena.get(*id) {
            parents[id.index()] = Some(entry.parent.index());
        }
    }
    let defines_by_name: HashMap<&str, usize> = inner
        .defines
        .iter()
        .map(|(name, id)| (name.as_str(), id.index()))
        .collect();

    let mut nodes: Vec<Option<PlanNode>> = (0..n).map(|_| None).collect();
    for id in &live {
        let entry = match inner.arena.get(*id) {
            Some(e) => e,
            None => continue,
        };
        let scope = entry.parent.index();
        let (kind, inputs) = match &entry.node {
            Node::Root => (PlanKind::Root, Vec::new()),
            Node::Filter { pred, columns } => (
                PlanKind::Filter(pred.clone()),
                resolve_columns(inner, &parents, &defines_by_name, scope, columns)
                    .with_context(|| "cannot bind a filter's columns".to_string())?,
            ),
            Node::Define { name, expr, columns } => (
                PlanKind::Define(expr.clone()),
                resolve_columns(inner, &parents, &defines_by_name, scope, columns)
                    .with_context(|| format!("cannot bind defined column `{name}`"))?,
            ),
        };
        nodes[id.index()] = Some(PlanNode { kind, inputs });
    }

    let mut actions = Vec::with_capacity(inner.actions.len());
    for booked in &inner.actions {
        inner
            .arena
            .get_checked(booked.parent)
            .with_context(|| format!("cannot run `{}` action", booked.op.name()))?;
        let chain = filter_chain(inner, &parents, booked.parent)?;
        let inputs = resolve_columns(
            inner,
            &parents,
            &defines_by_name,
            booked.parent.index(),
            &booked.columns,
        )
        .with_context(|| format!("cannot bind `{}` action's columns", booked.op.name()))?;
        actions.push(PlanAction {
            chain,
            inputs,
            op: Arc::clone(&booked.op),
        });
    }

    Ok(RunPlan { nodes, actions })
}

/// Filter plan indices on the path from root down to `from` (inclusive).
fn filter_chain(inner: &FrameInner, parents: &[Option<usize>], from: NodeId) -> Result<Vec<usize>> {
    let mut chain = Vec::new();
    let mut idx = from.index();
    loop {
        let id = NodeId::new(idx as u32, 0);
        if let Some(entry) = inner.arena.get(id) {
            if matches!(entry.node, Node::Filter { .. }) {
                chain.push(idx);
            }
        }
        match parents[idx] {
            Some(p) if p != idx => idx = p,
            Some(_) => break,
            None => bail!("graph node chain is broken"),
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Split `0..rows` into exactly `n` contiguous ranges (tails may be empty).
fn partition_rows(rows: u64, n: usize) -> Vec<Range<u64>> {
    let chunk = rows.div_ceil(n as u64).max(1);
    (0..n as u64)
        .map(|i| {
            let start = (i * chunk).min(rows);
            let end = ((i + 1) * chunk).min(rows);
            start..end
        })
        .collect()
}

/// Fold one slot's row partition through every action.
fn process_range(
    plan: &RunPlan,
    source: &dyn ColumnSource,
    slot: usize,
    n_slots: usize,
    range: Range<u64>,
) -> Result<Vec<Box<dyn SlotAcc>>> {
    let mut ctx = SlotCtx::bind(plan, source, slot)?;
    let mut accs: Vec<Box<dyn SlotAcc>> = plan
        .actions()
        .iter()
        .map(|a| a.op.make_slot(slot, n_slots))
        .collect();
    for row in range {
        for (ai, action) in plan.actions().iter().enumerate() {
            if ctx.check_chain(plan, &action.chain, row)? {
                let values = ctx.action_values(plan, ai, row)?;
                accs[ai].accumulate(slot, &values)?;
            }
        }
    }
    Ok(accs)
}

/// Execute all booked actions of a frame in one pass over the rows.
///
/// No-op when nothing is booked. On success the actions are consumed, every
/// result cell is published, and filter nodes are discarded; on error the
/// frame is left exactly as booked.
pub(crate) fn run_frame(frame: &Mutex<FrameInner>) -> Result<()> {
    let mut inner = frame.lock().unwrap();
    if inner.actions.is_empty() {
        return Ok(());
    }
    let plan = build_plan(&inner)?;
    let n_slots = inner.mode.n_slots();
    let rows = inner.source.row_count();
    let source = Arc::clone(&inner.source);
    let ranges = partition_rows(rows, n_slots);

    let parts_by_slot: Vec<Vec<Box<dyn SlotAcc>>> = if n_slots == 1 {
        let range = ranges.into_iter().next().ok_or_else(|| anyhow!("empty partition set"))?;
        vec![process_range(&plan, source.as_ref(), 0, 1, range)?]
    } else {
        ranges
            .into_par_iter()
            .enumerate()
            .map(|(slot, range)| process_range(&plan, source.as_ref(), slot, n_slots, range))
            .collect::<Result<Vec<_>>>()?
    };

    // Transpose slot-major partials into per-action lists, slot order kept.
    let mut per_action: Vec<Vec<Box<dyn SlotAcc>>> = plan
        .actions()
        .iter()
        .map(|_| Vec::with_capacity(n_slots))
        .collect();
    for slot_parts in parts_by_slot {
        for (ai, part) in slot_parts.into_iter().enumerate() {
            per_action[ai].push(part);
        }
    }
    for (action, parts) in plan.actions().iter().zip(per_action) {
        action
            .op
            .finalize(parts)
            .with_context(|| format!("cannot finalize `{}` action", action.op.name()))?;
    }

    inner.actions.clear();
    inner.discard_filters();
    Ok(())
}
