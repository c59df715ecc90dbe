//! Terminal action semantics: histograms, collect, foreach, list folding,
//! and empty-selection sentinels.

use rowframe::testing::{assert_collections_equal, squares_frame};
use rowframe::{pred1, DataFrame, Histo1D, MemSource, Value};
use std::sync::{Arc, Mutex};

#[test]
fn fixed_range_histogram_bins_exactly() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let h = df.histogram(Some("b1"), 10, 0.0, 10.0)?.get()?;
    assert_eq!(h.nbins(), 10);
    assert_eq!(h.entries(), 10);
    assert_eq!(h.underflow(), 0);
    assert_eq!(h.overflow(), 0);
    assert!(h.bin_counts().iter().all(|&c| c == 1));
    Ok(())
}

#[test]
fn auto_range_histogram_covers_all_values() -> anyhow::Result<()> {
    let df = squares_frame()?;
    // low == high requests auto-ranging from the observed min/max.
    let h = df.histogram(Some("b1"), 5, 0.0, 0.0)?.get()?;
    assert_eq!(h.entries(), 10);
    assert_eq!(h.underflow(), 0);
    assert_eq!(h.overflow(), 0);
    assert_eq!(h.bin_counts().iter().sum::<u64>(), 10);
    assert_eq!(h.low(), 0.0);
    assert!(h.high() > 9.0);
    Ok(())
}

#[test]
fn list_columns_fold_element_wise() -> anyhow::Result<()> {
    let source = MemSource::builder()
        .f64_list_column("vals", vec![vec![1.0, 2.0], vec![3.0]])
        .default_columns(["vals"])
        .build()?;
    let df = DataFrame::new(source);
    let n = df.count()?;
    let s = df.sum(Some("vals"))?;
    let m = df.mean(Some("vals"))?;
    // Count counts rows; numeric folds see one observation per element.
    assert_eq!(n.get()?, 2);
    assert_eq!(s.get()?, 6.0);
    assert_eq!(m.get()?, 2.0);
    Ok(())
}

#[test]
fn collect_typed_ints() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let odds = df
        .filter(pred1(|b2: i64| b2 % 2 == 1), &["b2"])?
        .collect::<i64>(Some("b2"))?;
    assert_collections_equal(odds.get()?, vec![1, 9, 25, 49, 81]);
    Ok(())
}

#[test]
fn foreach_sees_every_passing_row() -> anyhow::Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let df = squares_frame()?;
    let sink = Arc::clone(&seen);
    let done = df
        .filter(pred1(|b1: f64| b1 < 3.0), &["b1"])?
        .foreach(
            move |_slot, values| {
                if let Value::Float(x) = &values[0] {
                    sink.lock().unwrap().push(*x);
                }
            },
            &["b1"],
        )?;
    assert!(!done.ready());
    done.get()?;
    let mut got = seen.lock().unwrap().clone();
    got.sort_by(f64::total_cmp);
    assert_eq!(got, vec![0.0, 1.0, 2.0]);
    Ok(())
}

#[test]
fn empty_selection_sentinels() -> anyhow::Result<()> {
    let df = squares_frame()?;
    let none = df.filter(pred1(|b1: f64| b1 < 0.0), &["b1"])?;
    let lo = none.min(Some("b1"))?;
    let hi = none.max(Some("b1"))?;
    let m = none.mean(Some("b1"))?;
    let n = none.count()?;
    assert_eq!(lo.get()?, f64::INFINITY);
    assert_eq!(hi.get()?, f64::NEG_INFINITY);
    assert_eq!(m.get()?, 0.0);
    assert_eq!(n.get()?, 0);
    Ok(())
}

#[test]
fn histogram_merge_requires_matching_axes() -> anyhow::Result<()> {
    let mut a = Histo1D::new(4, 0.0, 4.0)?;
    let mut b = Histo1D::new(4, 0.0, 4.0)?;
    a.fill_many(&[0.5, 1.5, 5.0]);
    b.fill_many(&[2.5, -1.0]);
    a.merge(&b)?;
    assert_eq!(a.entries(), 5);
    assert_eq!(a.bin_counts(), &[1, 1, 1, 0]);
    assert_eq!(a.underflow(), 1);
    assert_eq!(a.overflow(), 1);

    let other = Histo1D::new(8, 0.0, 4.0)?;
    assert!(a.merge(&other).is_err());
    Ok(())
}

#[test]
fn histogram_construction_validation() {
    assert!(Histo1D::new(0, 0.0, 1.0).is_err());
    assert!(Histo1D::new(4, 1.0, 0.0).is_err());
}

#[test]
fn sum_of_non_numeric_column_fails() -> anyhow::Result<()> {
    let source = MemSource::builder()
        .str_column("name", vec!["a".into(), "b".into()])
        .default_columns(["name"])
        .build()?;
    let df = DataFrame::new(source);
    let s = df.sum(Some("name"))?;
    let err = s.get().unwrap_err();
    assert!(format!("{err:#}").contains("not numeric"), "{err:#}");
    Ok(())
}
