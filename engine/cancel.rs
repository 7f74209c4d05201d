//! Cooperative cancellation of a search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag that a long search checks as it goes. Clones share the flag,
/// so one may be handed to another thread (or a timer) to trip.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Stop iterating as soon as the flag is set. Fused.
pub(crate) struct Cancellable<I> {
    iter: Option<I>,
    cancellation: Cancellation,
}

impl<I> Cancellable<I> {
    pub(crate) fn new(iter: I, cancellation: Cancellation) -> Self {
        Self {
            iter: Some(iter),
            cancellation,
        }
    }
}

impl<I: Iterator> Iterator for Cancellable<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancellation.is_cancelled() {
            self.iter = None;
        }
        self.iter.as_mut()?.next()
    }
}
