//! Per-worker work-stealing schedulers.
//!
//! Two variants share one stealing protocol: [`flat::WorkStealing`] treats
//! every other worker as one undifferentiated victim pool, while
//! [`numa::NumaWorkStealing`] probes same-node victims before crossing to
//! other NUMA nodes. Both drain their own ready queue first and park the OS
//! thread only when the probe finds nothing anywhere.

pub mod flat;
pub mod numa;

pub use flat::WorkStealing;
pub use numa::NumaWorkStealing;

use crate::context::Context;
use crate::registry::Registry;
use crate::WorkerId;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// A scheduler whose ready queue other workers may steal from.
pub trait StealSource {
    /// Pop one context from this worker's queue on behalf of another worker.
    /// Must never return a pinned context.
    fn steal(&self) -> Option<Context>;
}

/// Bounded random probe of a victim pool, with replacement.
///
/// Draws up to `pool.len()` victims uniformly at random and tries to steal
/// from each. Draws that land on `self_id` are redrawn without consuming the
/// budget. With-replacement sampling keeps each draw O(1) and needs no
/// tried-set, at the cost of not guaranteeing that every distinct peer is
/// checked before giving up — the probe is probabilistic, not a scan.
pub(crate) fn steal_from_pool<S: StealSource>(
    registry: &Registry<S>,
    pool: &[WorkerId],
    self_id: WorkerId,
) -> Option<Context> {
    if pool.is_empty() || pool.iter().all(|&id| id == self_id) {
        return None;
    }
    let mut rng = rand::thread_rng();
    let mut attempts = 0;
    while attempts < pool.len() {
        let victim = pool[rng.gen_range(0..pool.len())];
        if victim == self_id {
            continue;
        }
        attempts += 1;
        // An unregistered victim id here is a contract breach by the
        // surrounding runtime; lookup aborts rather than reporting it.
        if let Some(ctx) = registry.lookup(victim).steal() {
            return Some(ctx);
        }
    }
    None
}

/// Snapshot of one scheduler's activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Contexts pushed onto this worker's ready queue.
    pub enqueued: u64,
    /// Contexts this worker popped from its own queue.
    pub popped: u64,
    /// Contexts obtained from peers (flat pool, or the local NUMA node).
    pub stolen: u64,
    /// Contexts obtained from remote-node peers (NUMA variant only).
    pub stolen_remote: u64,
    /// Contexts thieves took from this worker's queue.
    pub lent: u64,
    /// Times the owning thread parked on empty.
    pub parks: u64,
}

/// Relaxed atomic counters backing [`SchedulerStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub enqueued: AtomicU64,
    pub popped: AtomicU64,
    pub stolen: AtomicU64,
    pub stolen_remote: AtomicU64,
    pub lent: AtomicU64,
    pub parks: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            stolen: self.stolen.load(Ordering::Relaxed),
            stolen_remote: self.stolen_remote.load(Ordering::Relaxed),
            lent: self.lent.load(Ordering::Relaxed),
            parks: self.parks.load(Ordering::Relaxed),
        }
    }
}
