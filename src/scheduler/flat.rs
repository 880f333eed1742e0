//! Flat work-stealing scheduler: one undifferentiated pool of N workers.

use crate::affinity;
use crate::context::Context;
use crate::park::IdleParker;
use crate::ready_queue::ReadyQueue;
use crate::registry::Registry;
use crate::scheduler::{steal_from_pool, Counters, SchedulerStats, StealSource};
use crate::WorkerId;
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Per-worker scheduler whose victims are every other worker in the domain.
///
/// One instance is constructed per OS thread, on that thread, and registers
/// itself into the shared domain registry immediately. The driving thread then
/// loops on [`WorkStealing::pick_next`] and parks via
/// [`WorkStealing::idle_park`] when nothing is runnable anywhere.
#[derive(Debug)]
pub struct WorkStealing {
    id: WorkerId,
    /// Victim pool: every worker id in the domain, self included. Draws that
    /// land on self are redrawn by the probe.
    pool: Vec<WorkerId>,
    domain: Weak<Registry<WorkStealing>>,
    rqueue: ReadyQueue,
    parker: IdleParker,
    suspend: bool,
    counters: Counters,
}

impl WorkStealing {
    /// Construct the scheduler for worker `id` in a domain of `thread_count`
    /// workers and register it into `domain`.
    ///
    /// Must run on the worker's own OS thread. The first constructor to run
    /// sizes the registry; the rest observe the sized table. The domain must
    /// not begin stealing until all `thread_count` workers have registered.
    pub fn new(
        domain: &Arc<Registry<WorkStealing>>,
        id: WorkerId,
        thread_count: usize,
        suspend: bool,
    ) -> Arc<WorkStealing> {
        domain.ensure_capacity(thread_count);
        affinity::name_current_thread(&format!("fiber-worker-{id}"));

        let scheduler = Arc::new(WorkStealing {
            id,
            pool: (0..thread_count).collect(),
            domain: Arc::downgrade(domain),
            rqueue: ReadyQueue::new(),
            parker: IdleParker::new(),
            suspend,
            counters: Counters::default(),
        });
        domain.register(id, Arc::clone(&scheduler));
        scheduler
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Make `ctx` runnable on this worker.
    ///
    /// A migratable context is detached from its previous affinity
    /// bookkeeping first; a pinned context is pushed as-is, it is already
    /// affine to this worker.
    pub fn enqueue(&self, ctx: Context) {
        if !ctx.is_pinned() {
            ctx.detach();
        }
        Counters::bump(&self.counters.enqueued);
        self.rqueue.push(ctx);
    }

    /// Pick the next context to run: own queue first, then a bounded random
    /// probe of the peer pool. Returns `None` when nothing is runnable
    /// anywhere the probe looked.
    pub fn pick_next(&self) -> Option<Context> {
        if let Some(ctx) = self.rqueue.pop() {
            Counters::bump(&self.counters.popped);
            ctx.prefetch();
            if !ctx.is_pinned() {
                ctx.attach(self.id);
            }
            return Some(ctx);
        }

        let domain = self
            .domain
            .upgrade()
            .expect("scheduling domain dropped while worker still running");
        let ctx = steal_from_pool(&domain, &self.pool, self.id)?;
        Counters::bump(&self.counters.stolen);
        ctx.prefetch();
        // Pinned contexts never leave their owning queue.
        assert!(!ctx.is_pinned(), "stole a pinned context");
        ctx.attach(self.id);
        Some(ctx)
    }

    /// Block the owning thread until woken, or until `deadline` if one is
    /// given. No-op when the scheduler was constructed with `suspend` off;
    /// such a domain busy-polls instead of parking.
    pub fn idle_park(&self, deadline: Option<Instant>) {
        if !self.suspend {
            return;
        }
        Counters::bump(&self.counters.parks);
        match deadline {
            None => self.parker.park(),
            Some(deadline) => self.parker.park_until(deadline),
        }
    }

    /// Wake the owning thread out of [`WorkStealing::idle_park`]. No-op when
    /// `suspend` is off.
    pub fn wake(&self) {
        if !self.suspend {
            return;
        }
        self.parker.notify();
    }

    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }
}

impl StealSource for WorkStealing {
    fn steal(&self) -> Option<Context> {
        let stolen = self.rqueue.steal();
        if stolen.is_some() {
            Counters::bump(&self.counters.lent);
        }
        stolen
    }
}
