//! Testing utilities for transformation graphs.
//!
//! This module provides the pieces the crate's own test suite is built on,
//! exported so downstream users can test their graphs the same way:
//!
//! - **Fixtures**: small pre-built [`MemSource`](crate::MemSource)s and
//!   frames with known contents.
//! - **Counting wrappers**: predicates and expressions that count their
//!   invocations, for asserting memoization and short-circuit behavior.
//! - **Assertions**: collection comparisons with readable diffs.
//!
//! ```ignore
//! use rowframe::pred1;
//! use rowframe::testing::*;
//!
//! #[test]
//! fn keeps_small_rows() -> anyhow::Result<()> {
//!     let df = squares_frame()?;
//!     let n = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?.count()?;
//!     assert_eq!(n.get()?, 5);
//!     Ok(())
//! }
//! ```

mod assertions;
mod counting;
mod fixtures;

pub use assertions::{assert_collections_equal, assert_collections_unordered_equal};
pub use counting::{counting_expr, counting_pred};
pub use fixtures::{linear_frame, linear_source, squares_frame, squares_source};
