//! NUMA topology snapshot and the local/remote victim partitioner.
//!
//! Topology discovery lives outside this crate; callers hand the schedulers a
//! snapshot of nodes and their logical CPUs. The partition functions here are
//! pure: they never touch shared state and are safe to call from any thread.

use crate::WorkerId;

/// One NUMA node: a domain id plus the logical CPUs that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumaNode {
    pub id: usize,
    pub cpus: Vec<WorkerId>,
}

impl NumaNode {
    pub fn new(id: usize, cpus: Vec<WorkerId>) -> NumaNode {
        NumaNode { id, cpus }
    }
}

/// All logical CPUs belonging to the node `node_id`, self included.
///
/// The caller excludes its own CPU before drawing victims. An unknown node id
/// yields an empty set: such a scheduler has no local peers and goes straight
/// to the remote pool.
pub fn local_cpus(node_id: usize, topology: &[NumaNode]) -> Vec<WorkerId> {
    topology
        .iter()
        .find(|node| node.id == node_id)
        .map(|node| node.cpus.clone())
        .unwrap_or_default()
}

/// All logical CPUs belonging to any node other than `node_id`.
///
/// Nodes are concatenated in snapshot order with no NUMA-distance weighting: a
/// node two hops away is as likely a victim as one hop away. Known
/// simplification, kept deliberately.
pub fn remote_cpus(node_id: usize, topology: &[NumaNode]) -> Vec<WorkerId> {
    topology
        .iter()
        .filter(|node| node.id != node_id)
        .flat_map(|node| node.cpus.iter().copied())
        .collect()
}

/// Highest logical CPU id present in the snapshot, if any. The registry is
/// sized to this plus one.
pub fn max_cpu_id(topology: &[NumaNode]) -> Option<WorkerId> {
    topology
        .iter()
        .flat_map(|node| node.cpus.iter().copied())
        .max()
}
