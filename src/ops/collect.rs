//! Collect and foreach actions.

use super::{downcast_parts, ActionOp, SlotAcc};
use crate::result::ResultCell;
use crate::value::{FromValue, Value};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// Gather one column's typed values over all passing rows.
///
/// Each slot appends to its own vector; finalize concatenates the vectors
/// in slot order, so a single-slot run preserves source row order exactly.
pub(crate) struct CollectOp<T> {
    pub cell: Arc<ResultCell<Vec<T>>>,
}

struct CollectAcc<T> {
    out: Vec<T>,
}

impl<T: FromValue> SlotAcc for CollectAcc<T> {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        self.out.push(T::from_value(&values[0])?);
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl<T: FromValue + Clone> ActionOp for CollectOp<T> {
    fn name(&self) -> &'static str {
        "collect"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(CollectAcc::<T> { out: Vec::new() })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let mut parts = downcast_parts::<CollectAcc<T>>(parts);
        let mut out = parts.remove(0).out;
        for part in parts {
            out.extend(part.out);
        }
        self.cell.set(out);
        Ok(())
    }
}

/// Run a side-effecting closure on every passing row.
///
/// The closure receives the slot index so callers can keep per-slot state
/// without locking; there is nothing to merge, so finalize just marks the
/// handle ready.
pub(crate) struct ForeachOp {
    pub f: Arc<dyn Fn(usize, &[Value]) + Send + Sync>,
    pub cell: Arc<ResultCell<()>>,
}

struct ForeachAcc {
    f: Arc<dyn Fn(usize, &[Value]) + Send + Sync>,
}

impl SlotAcc for ForeachAcc {
    fn accumulate(&mut self, slot: usize, values: &[Value]) -> Result<()> {
        (self.f)(slot, values);
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for ForeachOp {
    fn name(&self) -> &'static str {
        "foreach"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(ForeachAcc { f: Arc::clone(&self.f) })
    }

    fn finalize(&self, _parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        self.cell.set(());
        Ok(())
    }
}
