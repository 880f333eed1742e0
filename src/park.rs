//! Idle-park/wake handshake between a worker and its notifiers.

use parking_lot::{Condvar, Mutex};
use std::time::Instant;

/// Mutex + condition variable + signalled flag letting a worker block its OS
/// thread when it finds no runnable work anywhere.
///
/// The protocol is pairwise: the owning thread parks, any number of other
/// threads may notify. The flag absorbs a wake that lands before the park —
/// a [`IdleParker::park`] call after a pending [`IdleParker::notify`] returns
/// immediately instead of blocking on a notification that already happened.
#[derive(Debug, Default)]
pub struct IdleParker {
    signalled: Mutex<bool>,
    cond: Condvar,
}

impl IdleParker {
    pub fn new() -> IdleParker {
        IdleParker {
            signalled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Block until notified. Spurious wakeups re-check the flag; the flag is
    /// cleared on exit so the next park blocks again.
    pub fn park(&self) {
        let mut signalled = self.signalled.lock();
        while !*signalled {
            self.cond.wait(&mut signalled);
        }
        *signalled = false;
    }

    /// Block until notified or until `deadline`, whichever comes first. The
    /// flag is cleared on exit regardless of which one occurred.
    pub fn park_until(&self, deadline: Instant) {
        let mut signalled = self.signalled.lock();
        while !*signalled {
            if self.cond.wait_until(&mut signalled, deadline).timed_out() {
                break;
            }
        }
        *signalled = false;
    }

    /// Set the flag and wake all waiters.
    pub fn notify(&self) {
        {
            let mut signalled = self.signalled.lock();
            *signalled = true;
        }
        self.cond.notify_all();
    }
}
