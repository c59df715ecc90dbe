//! Error surfaces: construction-time checks, bind-time checks, and
//! evaluation failures.

use rowframe::testing::{squares_frame, squares_source};
use rowframe::{expr1, pred1, DataFrame, MemSource};

#[test]
fn arity_mismatch_fails_at_construction() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let err = df
        .filter(pred1(|b1: f64| b1 > 0.0), &["b1", "b2"])
        .unwrap_err();
    assert!(err.to_string().contains("1 argument"), "{err}");
    Ok(())
}

#[test]
fn default_column_arity_mismatch_fails_at_construction() -> anyhow::Result<()> {
    // Defaults are ["b1", "b2"], which cannot feed a 1-ary predicate.
    let df = squares_frame()?;
    let err = df.filter(pred1(|b1: f64| b1 > 0.0), &[]).unwrap_err();
    assert!(err.to_string().contains("default column list"), "{err}");
    Ok(())
}

#[test]
fn single_column_action_without_usable_default_fails() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let err = df.sum(None).unwrap_err();
    assert!(err.to_string().contains("exactly one name"), "{err}");
    Ok(())
}

#[test]
fn define_name_collisions_fail_at_construction() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let err = df
        .define("b1", expr1(|b2: i64| b2 * 2), &["b2"])
        .unwrap_err();
    assert!(err.to_string().contains("source column"), "{err}");

    df.define("tot", expr1(|b2: i64| b2 * 2), &["b2"])?;
    let err = df
        .define("tot", expr1(|b1: f64| b1), &["b1"])
        .unwrap_err();
    assert!(err.to_string().contains("defined column"), "{err}");
    Ok(())
}

#[test]
fn unknown_column_fails_at_run_not_at_booking() -> anyhow::Result<()> {
    let df = squares_frame()?;
    // Booking succeeds: names are resolved when the run is planned.
    let f = df.filter(pred1(|v: f64| v > 0.0), &["nope"])?;
    let n = f.count()?;
    let err = n.get().unwrap_err();
    assert!(format!("{err:#}").contains("unknown column `nope`"), "{err:#}");
    // The failed run committed nothing; the handle is still pending and a
    // retry hits the same planning error.
    assert!(!n.ready());
    assert!(n.get().is_err());
    Ok(())
}

#[test]
fn define_on_sibling_branch_is_not_visible() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let branch_a = df.filter(pred1(|b1: f64| b1 < 5.0), &["b1"])?;
    branch_a.define("tot", expr1(|b1: f64| b1 * 2.0), &["b1"])?;
    // A chain on the other side of the graph cannot read `tot`.
    let branch_b = df.filter(pred1(|b1: f64| b1 >= 5.0), &["b1"])?;
    let n = branch_b.filter(pred1(|tot: f64| tot > 0.0), &["tot"])?.count()?;
    let err = n.get().unwrap_err();
    assert!(format!("{err:#}").contains("not visible"), "{err:#}");
    Ok(())
}

#[test]
fn handles_outliving_the_frame_fail_cleanly() -> anyhow::Result<()> {
    let df = DataFrame::new(squares_source()?);
    let node = df.node();
    let n = df.count()?;
    drop(df);
    let err = node.count().unwrap_err();
    assert!(err.to_string().contains("no longer reachable"), "{err}");
    let err = n.get().unwrap_err();
    assert!(err.to_string().contains("no longer reachable"), "{err}");
    Ok(())
}

#[test]
fn evaluation_error_leaves_handles_pending() -> anyhow::Result<()> {
    let df = squares_frame()?;
    // `b1` is a float column; asking for a string fails per-row.
    let f = df.filter(pred1(|s: String| s.is_empty()), &["b1"])?;
    let n = f.count()?;
    let err = n.get().unwrap_err();
    assert!(format!("{err:#}").contains("str"), "{err:#}");
    assert!(!n.ready());
    Ok(())
}

#[test]
fn source_builder_validation() -> anyhow::Result<()> {
    let err = MemSource::builder()
        .f64_column("a", vec![1.0, 2.0])
        .i64_column("b", vec![1, 2, 3])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("row(s)"), "{err}");

    let err = MemSource::builder()
        .f64_column("a", vec![1.0])
        .f64_column("a", vec![2.0])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("duplicate column"), "{err}");

    let err = MemSource::builder()
        .f64_column("a", vec![1.0])
        .default_columns(["missing"])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("default column"), "{err}");
    Ok(())
}
