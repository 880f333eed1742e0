//! Scheduling-domain registry mapping worker ids to scheduler handles.

use crate::WorkerId;
use std::sync::{Arc, OnceLock};

/// Append-once-per-slot table of scheduler handles, indexed by worker id.
///
/// One registry is one scheduling domain: the bootstrapper creates it, hands a
/// shared handle to every worker it spawns, and each worker registers its
/// scheduler into its own slot during construction. Sizing happens exactly
/// once — the first constructor to call [`Registry::ensure_capacity`] runs the
/// body, all later callers observe the already-sized table.
///
/// The surrounding runtime must not begin stealing until every worker it may
/// steal from has registered; [`Registry::lookup`] treats an empty slot as a
/// fatal contract breach, not a recoverable error.
#[derive(Debug, Default)]
pub struct Registry<S> {
    slots: OnceLock<Box<[OnceLock<Arc<S>>]>>,
}

impl<S> Registry<S> {
    pub fn new() -> Registry<S> {
        Registry {
            slots: OnceLock::new(),
        }
    }

    /// Size the table to `capacity` empty slots. Idempotent and safe to call
    /// concurrently from every constructing worker; the body runs at most
    /// once, and callers after the first observe the winner's sizing.
    pub fn ensure_capacity(&self, capacity: usize) {
        self.slots
            .get_or_init(|| (0..capacity).map(|_| OnceLock::new()).collect());
    }

    /// Number of slots, zero before the one-time sizing has run.
    pub fn capacity(&self) -> usize {
        self.slots.get().map_or(0, |slots| slots.len())
    }

    /// Store `handle` into slot `id`. The slot must be empty: registering a
    /// worker id twice is a programming error and panics.
    pub fn register(&self, id: WorkerId, handle: Arc<S>) {
        let slots = self
            .slots
            .get()
            .expect("registry used before ensure_capacity");
        if slots[id].set(handle).is_err() {
            panic!("worker {id} registered twice");
        }
    }

    /// Fetch the scheduler registered for `id`.
    ///
    /// Panics if the slot is empty: once the domain is running, every id a
    /// scheduler may draw as a victim is required to be registered.
    pub fn lookup(&self, id: WorkerId) -> Arc<S> {
        let slots = self
            .slots
            .get()
            .expect("registry used before ensure_capacity");
        Arc::clone(
            slots[id]
                .get()
                .unwrap_or_else(|| panic!("worker {id} looked up before registration")),
        )
    }
}
