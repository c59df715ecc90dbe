//! Terminal action accumulators.
//!
//! Each action kind splits into two halves mirroring the run protocol:
//!
//! - [`ActionOp`] is the booked, shared half: it mints one private
//!   accumulator per slot at the start of a run and merges the per-slot
//!   partials into the final result at finalize, publishing into the
//!   action's result cell.
//! - [`SlotAcc`] is the per-slot half: `accumulate` is invoked once per
//!   passing row with the action's column values. A slot accumulator is
//!   owned by exactly one worker and needs no synchronization.
//!
//! Built-in kinds: count, sum/min/max ([`basic`]), mean ([`statistical`]),
//! histogram fill ([`fill`]), collect and foreach ([`collect`]).

use crate::value::Value;
use anyhow::Result;
use std::any::Any;

mod basic;
mod collect;
mod fill;
mod statistical;

pub(crate) use basic::{CountOp, MaxOp, MinOp, SumOp};
pub(crate) use collect::{CollectOp, ForeachOp};
pub(crate) use fill::FillOp;
pub(crate) use statistical::MeanOp;

/// Per-slot accumulation state for one action.
pub(crate) trait SlotAcc: Send {
    /// Fold one passing row's column values into this slot's partial.
    fn accumulate(&mut self, slot: usize, values: &[Value]) -> Result<()>;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// The booked, slot-count-agnostic half of an action.
pub(crate) trait ActionOp: Send + Sync {
    /// Action kind name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Mint the private accumulator for `slot` (of `n_slots` total).
    fn make_slot(&self, slot: usize, n_slots: usize) -> Box<dyn SlotAcc>;

    /// Merge per-slot partials (in slot order) and publish the result.
    ///
    /// Invoked exactly once, single-threaded, after all workers joined.
    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()>;
}

/// Recover the concrete accumulators handed out by `make_slot`.
pub(crate) fn downcast_parts<A: Any>(parts: Vec<Box<dyn SlotAcc>>) -> Vec<A> {
    parts
        .into_iter()
        .map(|p| match p.into_any().downcast::<A>() {
            Ok(a) => *a,
            Err(_) => panic!("slot accumulator type mismatch"),
        })
        .collect()
}
