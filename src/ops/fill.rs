//! Histogram-fill action.

use super::{downcast_parts, ActionOp, SlotAcc};
use crate::histogram::Histo1D;
use crate::result::ResultCell;
use crate::value::Value;
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// Fill a [`Histo1D`] from one column's observations.
///
/// Slots buffer raw values instead of filling private histograms, because
/// an auto-ranging axis is only known once every slot has reported its
/// min/max. Finalize extends the model's axis to the global extremes and
/// then bulk-fills the buffers in slot order.
pub(crate) struct FillOp {
    pub cell: Arc<ResultCell<Histo1D>>,
    pub model: Histo1D,
}

struct FillAcc {
    buf: Vec<f64>,
    min: f64,
    max: f64,
}

impl SlotAcc for FillAcc {
    fn accumulate(&mut self, _slot: usize, values: &[Value]) -> Result<()> {
        let buf = &mut self.buf;
        let min = &mut self.min;
        let max = &mut self.max;
        values[0].for_each_f64(&mut |v| {
            buf.push(v);
            *min = min.min(v);
            *max = max.max(v);
        })
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

impl ActionOp for FillOp {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn make_slot(&self, _slot: usize, _n_slots: usize) -> Box<dyn SlotAcc> {
        Box::new(FillAcc {
            buf: Vec::new(),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        })
    }

    fn finalize(&self, parts: Vec<Box<dyn SlotAcc>>) -> Result<()> {
        let parts = downcast_parts::<FillAcc>(parts);
        let mut histo = self.model.clone();
        if self.model.auto_range() {
            let min = parts.iter().fold(f64::INFINITY, |m, a| m.min(a.min));
            let max = parts.iter().fold(f64::NEG_INFINITY, |m, a| m.max(a.max));
            // All-NaN or empty input leaves the extremes infinite; keep the
            // degenerate axis and let every fill land in overflow.
            if min.is_finite() && max.is_finite() {
                histo.extend_range(min, max);
            }
        }
        for part in &parts {
            histo.fill_many(&part.buf);
        }
        self.cell.set(histo);
        Ok(())
    }
}
