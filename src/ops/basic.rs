//! Basic arithmetic actions: count, sum, min, max.
//!
//! Sum, min, and max fold list-valued cells element-wise, so a single row
//! may contribute several observations. All four merge with the same
//! associative/commutative operator they accumulate with, making the final
//! result independent of slot count.

use super::{downcast_parts, ActionOp, SlotAcc};
use crate::result::ResultCell;
use crate::value::Value;
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/* ===================== Count ===================== */

pub(crate) struct CountOp {
    pub cell: Arc<ResultCell<u64>>,
}

struct CountAcc {
    n: u64,
}

impl SlotAcc for CountAcc {
    fn accumulate(&mut self, _slot: usize, _values: &[Value]) -> Result<()> {
        self.n += 1;
        Ok(())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for CountOp {
    fn name(&self) -> &'static str {
        "count"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(CountAcc { n: 0 })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let total = downcast_parts::<CountAcc>(parts).iter().map(|a| a.n).sum();
        self.cell.set(total);
        Ok(())
    }
}

/* ===================== Sum ===================== */

pub(crate) struct SumOp {
    pub cell: Arc<ResultCell<f64>>,
}

struct SumAcc {
    sum: f64,
}

impl SlotAcc for SumAcc {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        let sum = &mut self.sum;
        values[0].for_each_f64(&mut |v| *sum += v)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for SumOp {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(SumAcc { sum: 0.0 })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let total = downcast_parts::<SumAcc>(parts)
            .iter()
            .map(|a| a.sum)
            .sum();
        self.cell.set(total);
        Ok(())
    }
}

/* ===================== Min ===================== */

/// Minimum over all observations; an empty selection yields `+inf`.
pub(crate) struct MinOp {
    pub cell: Arc<ResultCell<f64>>,
}

struct MinAcc {
    m: f64,
}

impl SlotAcc for MinAcc {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        let m = &mut self.m;
        values[0].for_each_f64(&mut |v| *m = m.min(v))
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for MinOp {
    fn name(&self) -> &'static str {
        "min"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(MinAcc { m: f64::INFINITY })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let m = downcast_parts::<MinAcc>(parts)
            .iter()
            .fold(f64::INFINITY, |acc, a| acc.min(a.m));
        self.cell.set(m);
        Ok(())
    }
}

/* ===================== Max ===================== */

/// Maximum over all observations; an empty selection yields `-inf`.
pub(crate) struct MaxOp {
    pub cell: Arc<ResultCell<f64>>,
}

struct MaxAcc {
    m: f64,
}

impl SlotAcc for MaxAcc {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        let m = &mut self.m;
        values[0].for_each_f64(&mut |v| *m = m.max(v))
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for MaxOp {
    fn name(&self) -> &'static str {
        "max"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(MaxAcc { m: f64::NEG_INFINITY })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let m = downcast_parts::<MaxAcc>(parts)
            .iter()
            .fold(f64::NEG_INFINITY, |acc, a| acc.max(a.m));
        self.cell.set(m);
        Ok(())
    }
}
