//! Invocation-counting wrappers for predicates and expressions.
//!
//! Memoization guarantees are about how often user code runs, so the tests
//! need callables that keep score. The wrappers bump a shared counter on
//! every evaluation and delegate to the inner callable.

use crate::row_fn::{RowExpr, RowPred};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wrap a predicate so each evaluation increments `counter`.
pub fn counting_pred(pred: RowPred, counter: Arc<AtomicUsize>) -> RowPred {
    RowPred::from_raw(pred.arity(), move |values| {
        counter.fetch_add(1, Ordering::SeqCst);
        pred.eval(values)
    })
}

/// Wrap an expression so each evaluation increments `counter`.
pub fn counting_expr(expr: RowExpr, counter: Arc<AtomicUsize>) -> RowExpr {
    RowExpr::from_raw(expr.arity(), move |values| {
        counter.fetch_add(1, Ordering::SeqCst);
        expr.eval(values)
    })
}
