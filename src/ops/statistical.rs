//! Statistical actions.

use super::{downcast_parts, ActionOp, SlotAcc};
use crate::result::ResultCell;
use crate::value::Value;
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// Arithmetic mean over all observations; an empty selection yields `0.0`.
///
/// Each slot keeps a running (sum, count) pair; the pairs merge by
/// component-wise addition and the division happens once at finalize.
pub(crate) struct MeanOp {
    pub cell: Arc<ResultCell<f64>>,
}

struct MeanAcc {
    sum: f64,
    n: u64,
}

impl SlotAcc for MeanAcc {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        let sum = &mut self.sum;
        let n = &mut self.n;
        values[0].for_each_f64(&mut |v| {
            *sum += v;
            *n += 1;
        })
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for MeanOp {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(MeanAcc { sum: 0.0, n: 0 })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let parts = downcast_parts::<MeanAcc>(parts);
        let sum: f64 = parts.iter().map(|a| a.sum).sum();
        let n: u64 = parts.iter().map(|a| a.n).sum();
        self.cell.set(if n == 0 { 0.0 } else { sum / n as f64 });
        Ok(())
    }
}
