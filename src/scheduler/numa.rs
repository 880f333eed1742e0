//! NUMA-aware work-stealing scheduler: same-node victims before remote nodes.

use crate::affinity;
use crate::context::Context;
use crate::park::IdleParker;
use crate::ready_queue::ReadyQueue;
use crate::registry::Registry;
use crate::scheduler::{steal_from_pool, Counters, SchedulerStats, StealSource};
use crate::topology::{self, NumaNode};
use crate::WorkerId;
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Per-worker scheduler that biases stealing toward cache/memory-local
/// victims.
///
/// Worker ids are logical CPU ids here. Victims on the same NUMA node are
/// probed first; only when the whole local probe comes up empty does the
/// scheduler cross to the remote pool. Remote nodes carry no distance
/// weighting — every remote CPU is an equally likely victim.
#[derive(Debug)]
pub struct NumaWorkStealing {
    cpu_id: WorkerId,
    node_id: usize,
    /// Same-node victims, self excluded.
    local_pool: Vec<WorkerId>,
    /// Every CPU on every other node, in snapshot order.
    remote_pool: Vec<WorkerId>,
    domain: Weak<Registry<NumaWorkStealing>>,
    rqueue: ReadyQueue,
    parker: IdleParker,
    suspend: bool,
    counters: Counters,
}

impl NumaWorkStealing {
    /// Construct the scheduler for logical CPU `cpu_id` on NUMA node
    /// `node_id`, partition the topology snapshot into victim pools, pin the
    /// calling thread to that CPU, and register into `domain`.
    ///
    /// Must run on the worker's own OS thread. Pinning is best-effort; a
    /// refusal by the OS changes locality, not correctness. The domain must
    /// not begin stealing until every CPU in the snapshot has registered.
    pub fn new(
        domain: &Arc<Registry<NumaWorkStealing>>,
        cpu_id: WorkerId,
        node_id: usize,
        topology: &[NumaNode],
        suspend: bool,
    ) -> Arc<NumaWorkStealing> {
        let capacity = topology::max_cpu_id(topology).map_or(0, |max| max + 1);
        domain.ensure_capacity(capacity);

        affinity::name_current_thread(&format!("fiber-worker-{cpu_id}"));
        let _ = affinity::pin_current_thread(cpu_id);

        let mut local_pool = topology::local_cpus(node_id, topology);
        local_pool.retain(|&cpu| cpu != cpu_id);
        let remote_pool = topology::remote_cpus(node_id, topology);

        let scheduler = Arc::new(NumaWorkStealing {
            cpu_id,
            node_id,
            local_pool,
            remote_pool,
            domain: Arc::downgrade(domain),
            rqueue: ReadyQueue::new(),
            parker: IdleParker::new(),
            suspend,
            counters: Counters::default(),
        });
        domain.register(cpu_id, Arc::clone(&scheduler));
        scheduler
    }

    pub fn id(&self) -> WorkerId {
        self.cpu_id
    }

    pub fn node_id(&self) -> usize {
        self.node_id
    }

    /// Make `ctx` runnable on this worker. Migratable contexts are detached
    /// first; pinned contexts are pushed as-is.
    pub fn enqueue(&self, ctx: Context) {
        if !ctx.is_pinned() {
            ctx.detach();
        }
        Counters::bump(&self.counters.enqueued);
        self.rqueue.push(ctx);
    }

    /// Pick the next context: own queue, then a bounded random probe of the
    /// same-node pool, then of the remote pool. `None` when all three phases
    /// come up empty.
    pub fn pick_next(&self) -> Option<Context> {
        if let Some(ctx) = self.rqueue.pop() {
            Counters::bump(&self.counters.popped);
            ctx.prefetch();
            if !ctx.is_pinned() {
                ctx.attach(self.cpu_id);
            }
            return Some(ctx);
        }

        let domain = self
            .domain
            .upgrade()
            .expect("scheduling domain dropped while worker still running");

        let ctx = match steal_from_pool(&domain, &self.local_pool, self.cpu_id) {
            Some(ctx) => {
                Counters::bump(&self.counters.stolen);
                ctx
            }
            None => {
                let ctx = steal_from_pool(&domain, &self.remote_pool, self.cpu_id)?;
                Counters::bump(&self.counters.stolen_remote);
                ctx
            }
        };
        ctx.prefetch();
        // Pinned contexts never leave their owning queue.
        assert!(!ctx.is_pinned(), "stole a pinned context");
        ctx.attach(self.cpu_id);
        Some(ctx)
    }

    /// Block the owning thread until woken, or until `deadline` if one is
    /// given. No-op when the scheduler was constructed with `suspend` off.
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

    /// Wake the owning thread out of [`NumaWorkStealing::idle_park`]. No-op
    /// when `suspend` is off.
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

impl StealSource for NumaWorkStealing {
    fn steal(&self) -> Option<Context> {
        let stolen = self.rqueue.steal();
        if stolen.is_some() {
            Counters::bump(&self.counters.lent);
        }
        stolen
    }
}
