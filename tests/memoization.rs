//! Per-slot memoization and lifecycle guarantees.
//!
//! These tests count actual closure invocations, since the guarantees are
//! about how often user code runs, not about the results.

use rowframe::testing::{counting_expr, counting_pred, squares_frame};
use rowframe::{expr2, pred1};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn shared_filter_evaluates_once_per_row() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let df = squares_frame()?;
    let f = df.filter(
        counting_pred(pred1(|b1: f64| b1 < 5.0), Arc::clone(&calls)),
        &["b1"],
    )?;
    // Two actions fan out below the same filter.
    let n = f.count()?;
    let s = f.sum(Some("b1"))?;
    assert_eq!(n.get()?, 5);
    assert_eq!(s.get()?, 10.0);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    Ok(())
}

#[test]
fn shared_define_evaluates_once_per_row() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let df = squares_frame()?;
    let with_tot = df.define(
        "tot",
        counting_expr(expr2(|b1: f64, b2: i64| b1 + b2 as f64), Arc::clone(&calls)),
        &["b1", "b2"],
    )?;
    // The filter reads `tot` for every row; the collect re-reads it for the
    // passing rows and must hit the memo.
    let big = with_tot.filter(pred1(|tot: f64| tot > 4.2), &["tot"])?;
    let tots = big.collect::<f64>(Some("tot"))?;
    assert_eq!(tots.get()?.len(), 8);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    Ok(())
}

#[test]
fn failed_ancestor_short_circuits_descendants() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let df = squares_frame()?;
    let f1 = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
    let f2 = f1.filter(
        counting_pred(pred1(|b1: f64| b1 > 1.0), Arc::clone(&calls)),
        &["b1"],
    )?;
    let n = f2.count()?;
    assert_eq!(n.get()?, 3);
    // Rows 5..9 fail the first filter, so the second predicate never ran
    // for them.
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn repeated_get_does_not_rerun() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let df = squares_frame()?;
    let f = df.filter(
        counting_pred(pred1(|b1: f64| b1 < 5.0), Arc::clone(&calls)),
        &["b1"],
    )?;
    let n = f.count()?;
    assert_eq!(n.get()?, 5);
    assert_eq!(n.get()?, 5);
    assert_eq!(n.get()?, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    Ok(())
}

#[test]
fn defines_persist_across_runs() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let df = squares_frame()?;
    let with_tot = df.define(
        "tot",
        counting_expr(expr2(|b1: f64, b2: i64| b1 + b2 as f64), Arc::clone(&calls)),
        &["b1", "b2"],
    )?;
    let s1 = with_tot.sum(Some("tot"))?;
    assert_eq!(s1.get()?, 330.0);
    assert_eq!(calls.load(Ordering::SeqCst), 10);

    // The define node survived the run and accepts a new chain.
    let m = with_tot.mean(Some("tot"))?;
    assert_eq!(m.get()?, 33.0);
    assert_eq!(calls.load(Ordering::SeqCst), 20);
    Ok(())
}

#[test]
fn filter_handles_are_consumed_by_a_run() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let f = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
    let n = f.count()?;
    assert_eq!(n.get()?, 5);
    // The filter node was discarded by the run.
    let err = f.count().unwrap_err();
    assert!(err.to_string().contains("no longer available"), "{err}");
    Ok(())
}

#[test]
fn define_below_discarded_filter_is_reparented() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let f = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
    let with_tot = f.define("tot", expr2(|b1: f64, b2: i64| b1 + b2 as f64), &["b1", "b2"])?;
    let n1 = with_tot.count()?;
    assert_eq!(n1.get()?, 5);
    // After the run the filter is gone; the define now hangs off the root
    // and sees every row.
    let n2 = with_tot.count()?;
    assert_eq!(n2.get()?, 10);
    Ok(())
}
