//! Context handles shared by the schedulers and the ready queues.

use crate::WorkerId;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

static CONTEXT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sentinel stored in the affinity cell while a context is detached.
const DETACHED: usize = usize::MAX;

/// Lightweight handle to a schedulable unit of cooperative execution (a fiber).
///
/// Cloning a [`Context`] clones the handle, not the fiber: every clone refers to
/// the same underlying unit, identified by [`Context::id`]. The handle carries the
/// scheduling-relevant bookkeeping only — the pinned flag and the worker the
/// context is currently attached to. Suspend/resume mechanics live in the fiber
/// runtime, not here.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    id: u64,
    /// Pinned contexts run on exactly one worker and are never migrated.
    pinned: bool,
    /// Worker id the context is attached to, or `DETACHED` while in transit.
    worker: AtomicUsize,
}

impl Context {
    /// Create a migratable context, initially detached from any worker.
    pub fn new() -> Context {
        Context {
            inner: Arc::new(ContextInner {
                id: CONTEXT_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
                pinned: false,
                worker: AtomicUsize::new(DETACHED),
            }),
        }
    }

    /// Create a context pinned to `worker`. It is constructed already attached
    /// and must only ever be enqueued on that worker.
    pub fn pinned(worker: WorkerId) -> Context {
        Context {
            inner: Arc::new(ContextInner {
                id: CONTEXT_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
                pinned: true,
                worker: AtomicUsize::new(worker),
            }),
        }
    }

    /// Process-unique identifier of the underlying fiber.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether this context must stay on its designated worker.
    pub fn is_pinned(&self) -> bool {
        self.inner.pinned
    }

    /// Worker this context is currently attached to, if any.
    pub fn worker(&self) -> Option<WorkerId> {
        match self.inner.worker.load(Ordering::Acquire) {
            DETACHED => None,
            id => Some(id),
        }
    }

    /// Clear the affinity bookkeeping before the context migrates.
    ///
    /// Callers must not detach a pinned context; the schedulers skip the
    /// detach step for pinned contexts entirely.
    pub fn detach(&self) {
        debug_assert!(!self.inner.pinned, "detached a pinned context");
        self.inner.worker.store(DETACHED, Ordering::Release);
    }

    /// Record `worker` as the owner now advancing this context.
    pub fn attach(&self, worker: WorkerId) {
        self.inner.worker.store(worker, Ordering::Release);
    }

    /// Cache-prefetch hint on the context's memory. Non-semantic; a no-op on
    /// architectures without an explicit prefetch instruction.
    #[inline]
    pub fn prefetch(&self) {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
            _mm_prefetch::<_MM_HINT_T0>(Arc::as_ptr(&self.inner) as *const i8);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Context {}
