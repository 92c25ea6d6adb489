//! Atomically swappable immutable snapshots.
//!
//! Readers load the current value without locking and keep it alive for as
//! long as they hold the returned `Arc`. A rebuild publishes a brand-new
//! value; in-flight readers keep observing the one they loaded.

use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

/// Shared cell holding the current snapshot. Clones share the same cell.
pub struct Snapshot<T> {
    inner: Arc<ArcSwap<T>>,
}

impl<T> Snapshot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// Cheap, lock-free read of the current snapshot.
    ///
    /// The guard is meant to be short-lived; use [`Snapshot::load_full`] to
    /// hold the value across `.await` points.
    pub fn load(&self) -> Guard<Arc<T>> {
        self.inner.load()
    }

    /// Owned handle to the current snapshot.
    pub fn load_full(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Replace the snapshot wholesale, returning the previous one.
    pub fn publish(&self, next: T) -> Arc<T> {
        self.inner.swap(Arc::new(next))
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("current", &self.inner.load_full())
            .finish()
    }
}
