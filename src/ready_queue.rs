//! Per-worker ready queue with a stealable tail end.

use crate::context::Context;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// FIFO queue of runnable contexts owned by one worker.
///
/// The owning thread pushes at the tail and pops from the head; thieves take
/// from the tail end via [`ReadyQueue::steal`], so the owner and its thieves
/// contend on opposite ends of the deque. Critical sections are a handful of
/// pointer moves, so a mutex is sufficient here — no operation ever blocks
/// while holding it.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    deque: Mutex<VecDeque<Context>>,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue {
            deque: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a runnable context at the tail. Owner thread only.
    pub fn push(&self, ctx: Context) {
        self.deque.lock().push_back(ctx);
    }

    /// Take the head of the queue. Owner thread only.
    pub fn pop(&self) -> Option<Context> {
        self.deque.lock().pop_front()
    }

    /// Take a context on behalf of another worker.
    ///
    /// Scans from the tail for the first non-pinned entry; pinned contexts are
    /// never surfaced to a thief, whatever their position in the queue.
    pub fn steal(&self) -> Option<Context> {
        let mut deque = self.deque.lock();
        for idx in (0..deque.len()).rev() {
            if !deque[idx].is_pinned() {
                return deque.remove(idx);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.deque.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.deque.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_is_fifo() {
        let queue = ReadyQueue::new();
        let a = Context::new();
        let b = Context::new();
        let c = Context::new();
        queue.push(a.clone());
        queue.push(b.clone());
        queue.push(c.clone());

        assert_eq!(queue.pop(), Some(a));
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), Some(c));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn steal_takes_from_the_tail() {
        let queue = ReadyQueue::new();
        let a = Context::new();
        let b = Context::new();
        queue.push(a.clone());
        queue.push(b.clone());

        assert_eq!(queue.steal(), Some(b));
        assert_eq!(queue.pop(), Some(a));
    }

    #[test]
    fn steal_skips_pinned_contexts() {
        let queue = ReadyQueue::new();
        let migratable = Context::new();
        let stuck = Context::pinned(0);
        queue.push(migratable.clone());
        queue.push(stuck.clone());

        // Tail entry is pinned; the thief must reach past it.
        assert_eq!(queue.steal(), Some(migratable));
        assert_eq!(queue.steal(), None);
        // The pinned context is still there for the owner.
        assert_eq!(queue.pop(), Some(stuck));
    }

    #[test]
    fn steal_on_empty_queue_returns_none() {
        let queue = ReadyQueue::new();
        assert_eq!(queue.steal(), None);
    }
}
