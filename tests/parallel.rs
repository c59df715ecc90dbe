//! Slot-count independence of parallel execution.
//!
//! Every aggregation must produce the same result for one slot and for
//! many; `collect` is only order-sensitive, so it is compared as a
//! multiset.

use rowframe::testing::{assert_collections_unordered_equal, linear_frame};
use rowframe::{expr1, pred1, ExecMode};

const ROWS: u64 = 1000;

#[test]
fn aggregations_are_slot_count_independent() -> anyhow::Result<()> {
    let mut results = Vec::new();
    for mode in [
        ExecMode::Sequential,
        ExecMode::Parallel { workers: Some(4) },
    ] {
        let df = linear_frame(ROWS)?.with_mode(mode);
        let f = df.filter(pred1(|x: f64| x < 500.0), &["x"])?;
        let n = f.count()?;
        let s = f.sum(Some("x"))?;
        let lo = f.min(Some("x"))?;
        let hi = f.max(Some("x"))?;
        let m = f.mean(Some("x"))?;
        results.push((n.get()?, s.get()?, lo.get()?, hi.get()?, m.get()?));
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], (500, 124_750.0, 0.0, 499.0, 249.5));
    Ok(())
}

#[test]
fn histograms_are_slot_count_independent() -> anyhow::Result<()> {
    let seq = linear_frame(ROWS)?
        .histogram(Some("x"), 20, 0.0, 1000.0)?
        .get()?;
    let par = linear_frame(ROWS)?
        .with_mode(ExecMode::Parallel { workers: Some(4) })
        .histogram(Some("x"), 20, 0.0, 1000.0)?
        .get()?;
    assert_eq!(seq, par);
    assert_eq!(seq.entries(), ROWS);
    assert!(seq.bin_counts().iter().all(|&c| c == 50));
    Ok(())
}

#[test]
fn parallel_collect_is_a_permutation() -> anyhow::Result<()> {
    let df = linear_frame(ROWS)?.with_mode(ExecMode::Parallel { workers: Some(4) });
    let xs = df.collect::<f64>(Some("x"))?.get()?;
    assert_collections_unordered_equal(xs, (0..ROWS).map(|i| i as f64).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn parallel_defines_match_sequential() -> anyhow::Result<()> {
    let mut sums = Vec::new();
    for mode in [
        ExecMode::Sequential,
        ExecMode::Parallel { workers: Some(4) },
    ] {
        let df = linear_frame(ROWS)?.with_mode(mode);
        let doubled = df.define("x2", expr1(|x: f64| x * 2.0), &["x"])?;
        sums.push(doubled.sum(Some("x2"))?.get()?);
    }
    assert_eq!(sums[0], sums[1]);
    assert_eq!(sums[0], 999_000.0);
    Ok(())
}

#[test]
fn more_slots_than_rows_is_fine() -> anyhow::Result<()> {
    let df = linear_frame(3)?.with_mode(ExecMode::Parallel { workers: Some(8) });
    assert_eq!(df.count()?.get()?, 3);
    Ok(())
}

#[test]
fn default_worker_count_runs() -> anyhow::Result<()> {
    let df = linear_frame(ROWS)?.with_mode(ExecMode::Parallel { workers: None });
    assert_eq!(df.sum(Some("x"))?.get()?, 499_500.0);
    Ok(())
}
