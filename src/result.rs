//! Lazy result handles for booked actions.
//!
//! Booking an action returns a [`ResultHandle`] immediately; the value
//! exists only after the graph's single run. [`ResultHandle::get`] triggers
//! that run on first use — which also finalizes and readies every other
//! pending handle sharing the same graph — and afterwards returns without
//! re-running.

use crate::frame::FrameInner;
use crate::runner;
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Shared cell an action's finalize step publishes into.
pub(crate) struct ResultCell<T> {
    ready: AtomicBool,
    value: Mutex<Option<T>>,
}

impl<T> ResultCell<T> {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            value: Mutex::new(None),
        }
    }

    pub fn set(&self, v: T) {
        *self.value.lock().unwrap() = Some(v);
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn get_clone(&self) -> Option<T>
    where
        T: Clone,
    {
        self.value.lock().unwrap().clone()
    }
}

/// A future-like handle to one action's finalized output.
pub struct ResultHandle<T> {
    cell: Arc<ResultCell<T>>,
    frame: Weak<Mutex<FrameInner>>,
}

impl<T> std::fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultHandle")
            .field("ready", &self.cell.is_ready())
            .finish()
    }
}

impl<T> Clone for ResultHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            frame: self.frame.clone(),
        }
    }
}

impl<T> ResultHandle<T> {
    pub(crate) fn new(cell: Arc<ResultCell<T>>, frame: Weak<Mutex<FrameInner>>) -> Self {
        Self { cell, frame }
    }

    /// Whether the result has been produced (a run has finalized it).
    pub fn ready(&self) -> bool {
        self.cell.is_ready()
    }
}

impl<T: Clone> ResultHandle<T> {
    /// Return the action's result, running the owning graph first if it has
    /// not executed yet.
    ///
    /// Fails if the owning [`DataFrame`](crate::DataFrame) has been dropped,
    /// or if the triggered run fails (in which case the handle stays
    /// pending and a later `get` retries).
    pub fn get(&self) -> Result<T> {
        if !self.cell.is_ready() {
            let frame = self.frame.upgrade().ok_or_else(|| {
                anyhow!("the owning DataFrame is no longer reachable: did it go out of scope?")
            })?;
            runner::run_frame(&frame)?;
        }
        self.cell
            .get_clone()
            .ok_or_else(|| anyhow!("action result was never produced"))
    }
}
