//! Pre-built sources and frames with known contents.

use crate::frame::DataFrame;
use crate::source::MemSource;
use anyhow::Result;

/// Ten rows: `b1` is `0.0..=9.0` and `b2 = b1 * b1` as integers.
///
/// Default columns are `["b1", "b2"]`.
pub fn squares_source() -> Result<MemSource> {
    let b1: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let b2: Vec<i64> = (0..10i64).map(|i| i * i).collect();
    MemSource::builder()
        .f64_column("b1", b1)
        .i64_column("b2", b2)
        .default_columns(["b1", "b2"])
        .build()
}

/// A [`DataFrame`] over [`squares_source`].
pub fn squares_frame() -> Result<DataFrame> {
    Ok(DataFrame::new(squares_source()?))
}

/// `rows` rows: `x` runs `0.0, 1.0, ..` and `k` is the row index.
///
/// Default column is `["x"]`; useful for larger determinism checks.
pub fn linear_source(rows: u64) -> Result<MemSource> {
    let x: Vec<f64> = (0..rows).map(|i| i as f64).collect();
    let k: Vec<i64> = (0..rows as i64).collect();
    MemSource::builder()
        .f64_column("x", x)
        .i64_column("k", k)
        .default_columns(["x"])
        .build()
}

/// A [`DataFrame`] over [`linear_source`].
pub fn linear_frame(rows: u64) -> Result<DataFrame> {
    Ok(DataFrame::new(linear_source(rows)?))
}
