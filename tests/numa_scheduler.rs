// Integration tests for the NUMA-aware scheduler over a 2-node, 2-CPU-per-
// node topology: local-first stealing, remote fallback, exactly-once drains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use fiberwork::scheduler::NumaWorkStealing;
use fiberwork::{Context, NumaNode, Registry};

fn two_by_two() -> Vec<NumaNode> {
    vec![
        NumaNode::new(0, vec![0, 1]),
        NumaNode::new(1, vec![2, 3]),
    ]
}

/// Scenario: all work sits on a node-1 CPU while node-0 workers are idle.
/// The node-0 workers must eventually drain it through the remote-pool
/// probe, and every context is obtained exactly once across the domain.
#[test]
fn remote_work_is_drained_exactly_once() {
    const CONTEXTS: usize = 50;

    let topology = two_by_two();
    let contexts: Vec<Context> = (0..CONTEXTS).map(|_| Context::new()).collect();
    let mut expected: Vec<u64> = contexts.iter().map(|ctx| ctx.id()).collect();
    expected.sort_unstable();

    let domain: Arc<Registry<NumaWorkStealing>> = Arc::new(Registry::new());
    let registered = Arc::new(Barrier::new(4));
    let picked = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = crossbeam_channel::unbounded::<u64>();

    let mut threads = Vec::new();
    let mut to_enqueue = Some(contexts);
    for (cpu, node) in [(0usize, 0usize), (1, 0), (2, 1), (3, 1)] {
        let topology = topology.clone();
        let domain = Arc::clone(&domain);
        let registered = Arc::clone(&registered);
        let picked = Arc::clone(&picked);
        let tx = tx.clone();
        // CPU 3 holds all the work; it never picks, so its node-1 sibling and
        // the two node-0 workers must steal everything.
        let contexts = if cpu == 3 { to_enqueue.take() } else { None };

        threads.push(thread::spawn(move || {
            let scheduler = NumaWorkStealing::new(&domain, cpu, node, &topology, true);
            registered.wait();

            if let Some(contexts) = contexts {
                for ctx in contexts {
                    scheduler.enqueue(ctx);
                }
                return;
            }

            while picked.load(Ordering::Relaxed) < CONTEXTS {
                match scheduler.pick_next() {
                    Some(ctx) => {
                        picked.fetch_add(1, Ordering::Relaxed);
                        tx.send(ctx.id()).unwrap();
                    }
                    None => thread::yield_now(),
                }
            }
        }));
    }
    drop(tx);
    for handle in threads {
        handle.join().unwrap();
    }

    let mut obtained: Vec<u64> = rx.iter().collect();
    obtained.sort_unstable();
    assert_eq!(obtained, expected);
}

/// Scenario: a node-0 worker with an empty queue and an empty local peer, but
/// work on node 1, obtains a context via the remote probe with probability
/// approaching one over repeated `pick_next` calls.
#[test]
fn remote_probe_eventually_succeeds() {
    let topology = two_by_two();
    let domain: Arc<Registry<NumaWorkStealing>> = Arc::new(Registry::new());

    let schedulers: Vec<Arc<NumaWorkStealing>> = [(0usize, 0usize), (1, 0), (2, 1), (3, 1)]
        .iter()
        .map(|&(cpu, node)| NumaWorkStealing::new(&domain, cpu, node, &topology, true))
        .collect();

    schedulers[2].enqueue(Context::new());

    let picker = &schedulers[0];
    let picked = (0..10_000).find_map(|_| picker.pick_next());
    let ctx = picked.expect("remote probe never found the context");
    assert_eq!(ctx.worker(), Some(0));

    let stats = picker.stats();
    assert_eq!(stats.stolen, 0);
    assert_eq!(stats.stolen_remote, 1);
    assert_eq!(schedulers[2].stats().lent, 1);
}

/// A context pinned to a node-1 CPU is never surfaced by any other worker,
/// even with every other queue in the domain empty.
#[test]
fn pinned_context_stays_on_its_cpu() {
    let topology = two_by_two();
    let domain: Arc<Registry<NumaWorkStealing>> = Arc::new(Registry::new());

    let schedulers: Vec<Arc<NumaWorkStealing>> = [(0usize, 0usize), (1, 0), (2, 1), (3, 1)]
        .iter()
        .map(|&(cpu, node)| NumaWorkStealing::new(&domain, cpu, node, &topology, true))
        .collect();

    let stuck = Context::pinned(2);
    schedulers[2].enqueue(stuck.clone());

    for _ in 0..200 {
        assert!(schedulers[0].pick_next().is_none());
        assert!(schedulers[1].pick_next().is_none());
        assert!(schedulers[3].pick_next().is_none());
    }
    assert_eq!(schedulers[2].pick_next(), Some(stuck));
}
