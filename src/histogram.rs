//! One-dimensional fixed-bin histogram kernel.
//!
//! The engine's histogram action buffers values per slot and performs a
//! single bulk [`fill_many`](Histo1D::fill_many) per buffer at finalize, so
//! the kernel itself stays single-threaded. Constructing with
//! `low == high` requests auto-ranging: the action extends the axis to the
//! observed global min/max (via [`extend_range`](Histo1D::extend_range))
//! before the first fill.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A fixed-bin histogram over `[low, high)` with underflow/overflow counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histo1D {
    nbins: usize,
    low: f64,
    high: f64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
    entries: u64,
}

impl Histo1D {
    /// Create an empty histogram. `low == high` marks the axis as
    /// auto-ranging; fills before [`extend_range`](Self::extend_range) land
    /// in overflow.
    pub fn new(nbins: usize, low: f64, high: f64) -> Result<Self> {
        if nbins == 0 {
            bail!("histogram must have at least one bin");
        }
        if high < low {
            bail!("histogram upper edge {high} is below lower edge {low}");
        }
        Ok(Self {
            nbins,
            low,
            high,
            bins: vec![0; nbins],
            underflow: 0,
            overflow: 0,
            entries: 0,
        })
    }

    /// Whether the axis bounds are still unset.
    pub fn auto_range(&self) -> bool {
        self.low == self.high
    }

    /// Extend the axis to cover `[min, max]`, keeping the bin count.
    ///
    /// Meant to be called before any fill; already-binned counts are not
    /// redistributed. A degenerate range is widened to a unit interval
    /// around the single value.
    pub fn extend_range(&mut self, min: f64, max: f64) {
        let (mut low, mut high) = if self.auto_range() {
            (min, max)
        } else {
            (self.low.min(min), self.high.max(max))
        };
        // Upper edge is exclusive; nudge it so `max` itself lands in the
        // last bin rather than in overflow.
        high = next_up(high);
        if !(high > low) {
            low -= 0.5;
            high += 0.5;
        }
        self.low = low;
        self.high = high;
    }

    pub fn fill(&mut self, v: f64) {
        self.entries += 1;
        if v.is_nan() {
            self.overflow += 1;
        } else if v < self.low {
            self.underflow += 1;
        } else if v >= self.high {
            self.overflow += 1;
        } else {
            let width = (self.high - self.low) / self.nbins as f64;
            let bin = (((v - self.low) / width) as usize).min(self.nbins - 1);
            self.bins[bin] += 1;
        }
    }

    /// Bulk fill; one entry per element.
    pub fn fill_many(&mut self, values: &[f64]) {
        for &v in values {
            self.fill(v);
        }
    }

    /// Merge another histogram with identical binning into this one.
    pub fn merge(&mut self, other: &Histo1D) -> Result<()> {
        if self.nbins != other.nbins || self.low != other.low || self.high != other.high {
            bail!(
                "cannot merge histograms with different axes \
                 ({} bins over [{}, {}) vs {} bins over [{}, {}))",
                self.nbins,
                self.low,
                self.high,
                other.nbins,
                other.low,
                other.high
            );
        }
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        Ok(())
    }

    pub fn nbins(&self) -> usize {
        self.nbins
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.nbins as f64
    }

    pub fn bin_count(&self, bin: usize) -> u64 {
        self.bins[bin]
    }

    pub fn bin_counts(&self) -> &[u64] {
        &self.bins
    }

    /// Total fills, including under- and overflow.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }
}

/// Smallest float strictly greater than `v` (finite inputs).
fn next_up(v: f64) -> f64 {
    if v.is_nan() || v == f64::INFINITY {
        return v;
    }
    let bits = v.to_bits();
    let next = if v == 0.0 {
        1
    } else if v.is_sign_positive() {
        bits + 1
    } else {
        bits - 1
    };
    f64::from_bits(next)
}
