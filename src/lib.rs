//! Work-stealing scheduling core for cooperatively scheduled fibers.
//!
//! Each OS thread owns one scheduler and repeatedly asks it for the next
//! context to run. The scheduler drains its own ready queue first; on empty it
//! draws random victims from its peer pool(s) and steals from them, and when
//! nothing is runnable anywhere it parks the thread until woken or a deadline
//! elapses. The [`scheduler::WorkStealing`] variant treats all peers as one
//! pool; [`scheduler::NumaWorkStealing`] probes same-NUMA-node peers before
//! crossing to remote nodes.

pub mod affinity;
pub mod context;
pub mod park;
pub mod ready_queue;
pub mod registry;
pub mod scheduler;
pub mod topology;

// Re-export the types a fiber runtime wires together.
pub use context::Context;
pub use registry::Registry;
pub use scheduler::{NumaWorkStealing, SchedulerStats, WorkStealing};
pub use topology::NumaNode;

/// Dense worker identifier: a logical CPU id in the NUMA variant, a counter
/// value in the flat variant. Always small enough to index the registry.
pub type WorkerId = usize;
