//! Collection assertions with readable failure output.

use std::fmt::Debug;

/// Assert two collections are equal element-by-element, in order.
///
/// # Panics
///
/// Panics with both collections printed when they differ.
pub fn assert_collections_equal<T>(actual: impl IntoIterator<Item = T>, expected: impl IntoIterator<Item = T>)
where
    T: PartialEq + Debug,
{
    let actual: Vec<T> = actual.into_iter().collect();
    let expected: Vec<T> = expected.into_iter().collect();
    assert_eq!(
        actual, expected,
        "collections differ\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}

/// Assert two collections hold the same elements regardless of order.
///
/// # Panics
///
/// Panics with both collections printed (sorted) when they differ.
pub fn assert_collections_unordered_equal<T>(
    actual: impl IntoIterator<Item = T>,
    expected: impl IntoIterator<Item = T>,
) where
    T: PartialOrd + PartialEq + Debug,
{
    let mut actual: Vec<T> = actual.into_iter().collect();
    let mut expected: Vec<T> = expected.into_iter().collect();
    actual.sort_by(|a, b| a.partial_cmp(b).expect("elements must be comparable"));
    expected.sort_by(|a, b| a.partial_cmp(b).expect("elements must be comparable"));
    assert_eq!(
        actual, expected,
        "collections differ (order ignored)\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}
