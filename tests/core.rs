//! Core graph-building and execution behavior.

use rowframe::testing::{assert_collections_equal, squares_frame};
use rowframe::{expr2, pred1, pred2, DataFrame, MemSource};

#[test]
fn chained_filters_count() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let f1 = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
    let f2 = f1.filter(pred2(|b2: i64, b1: f64| b2 % 2 == 1 && b1 < 4.0), &["b2", "b1"])?;
    let n = f2.count()?;
    assert_eq!(n.get()?, 2);
    Ok(())
}

#[test]
fn mean_over_all_rows() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let m = df.mean(Some("b2"))?;
    assert_eq!(m.get()?, 28.5);
    Ok(())
}

#[test]
fn defined_column_feeds_filter() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let with_tot = df.define("tot", expr2(|b1: f64, b2: i64| b1 + b2 as f64), &["b1", "b2"])?;
    let big = with_tot.filter(pred1(|tot: f64| tot > 4.2), &["tot"])?;
    let n = big.count()?;
    assert_eq!(n.get()?, 8);
    Ok(())
}

#[test]
fn empty_column_list_uses_defaults() -> anyhow::Result<()> {
    // Default columns are ["b1", "b2"], so a 2-ary predicate binds to them.
    let df = squares_frame()?;
    let f = df.filter(pred2(|b1: f64, b2: i64| b1 > 2.0 && b2 < 50), &[])?;
    let n = f.count()?;
    assert_eq!(n.get()?, 5);
    Ok(())
}

#[test]
fn single_column_action_falls_back_to_lone_default() -> anyhow::Result<()> {
    let source = MemSource::builder()
        .f64_column("x", vec![1.0, 2.0, 3.0])
        .default_columns(["x"])
        .build()?;
    let df = DataFrame::new(source);
    let s = df.sum(None)?;
    assert_eq!(s.get()?, 6.0);
    Ok(())
}

#[test]
fn sequential_collect_preserves_row_order() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let xs = df.collect::<f64>(Some("b1"))?;
    assert_collections_equal(xs.get()?, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn basic_aggregations() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let s = df.sum(Some("b1"))?;
    let lo = df.min(Some("b1"))?;
    let hi = df.max(Some("b1"))?;
    assert_eq!(s.get()?, 45.0);
    assert_eq!(lo.get()?, 0.0);
    assert_eq!(hi.get()?, 9.0);
    Ok(())
}

#[test]
fn explicit_run_readies_every_handle() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let n = df.count()?;
    let s = df.sum(Some("b2"))?;
    assert!(!n.ready());
    assert!(!s.ready());
    df.run()?;
    assert!(n.ready());
    assert!(s.ready());
    assert_eq!(n.get()?, 10);
    assert_eq!(s.get()?, 285.0);
    Ok(())
}

#[test]
fn one_get_triggers_the_whole_run() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let f = df.filter(pred1(|b1: f64| b1 >= 5.0), &["b1"])?;
    let n = f.count()?;
    let m = f.mean(Some("b1"))?;
    assert_eq!(n.get()?, 5);
    // Reading the first handle already finalized the second.
    assert!(m.ready());
    assert_eq!(m.get()?, 7.0);
    Ok(())
}

#[test]
fn run_with_nothing_booked_is_a_noop() -> anyhow::Result<()> {
    let df = squares_frame()?;
    df.run()?;
    df.run()?;
    Ok(())
}
