//! Single-source best-path search
//!
//! Best-first expansion keyed by accumulated cost. Each hop onto node `v`
//! over edge `e` adds
//!
//! wc · util(e) / ū + wt · temp(v) / T̄
//!
//! so keys never decrease along a candidate path and the first candidate
//! popped at the target is minimal under the key. The returned score is then
//! recomputed with [`path_score`] on the finished path.

use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::scoring::path_score;
use crate::{NodeId, Route, Weights};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, trace};

/// Partial candidate in the frontier
#[derive(Debug)]
struct Candidate {
    key: f64,
    /// Insertion order, breaks key ties first-in first-out
    seq: u64,
    node: NodeId,
    from: Option<NodeId>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Reversed so the max-heap pops the lowest key, then the oldest entry
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn normalized(value: f64, mean: f64) -> f64 {
    if mean > 0.0 {
        value / mean
    } else {
        0.0
    }
}

/// Find the lowest-cost path from `source` to `target`.
///
/// Returns `Ok(None)` when the target is unreachable. Errors only on
/// out-of-range endpoints.
pub fn find_best_path(
    network: &Network,
    source: NodeId,
    target: NodeId,
    weights: &Weights,
) -> Result<Option<Route>> {
    for node in [source, target] {
        if !network.contains(node) {
            return Err(RoutingError::OutOfRangeNode {
                node,
                num_nodes: network.node_count(),
            });
        }
    }

    let mean_utilization = network.mean_utilization();
    let mean_temperature = network.mean_temperature();
    let node_cost = |node: NodeId| {
        let temperature = network.temperature(node).unwrap_or(0.0);
        weights.temperature() * normalized(temperature, mean_temperature)
    };

    // Scratch state lives only for this call
    let mut visited = vec![false; network.node_count()];
    let mut predecessor: Vec<Option<NodeId>> = vec![None; network.node_count()];
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    frontier.push(Candidate {
        key: node_cost(source),
        seq,
        node: source,
        from: None,
    });

    while let Some(Candidate { key, node, from, .. }) = frontier.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        predecessor[node] = from;

        if node == target {
            let path = trace_back(&predecessor, target);
            let score = path_score(network, &path, weights)?;
            debug!(
                source,
                target,
                hops = path.len() - 1,
                expanded,
                score,
                "Best path found"
            );
            return Ok(Some(Route::new(path, score)));
        }

        expanded += 1;
        for &next in network.neighbors(node) {
            if visited[next] {
                continue;
            }
            let Some(edge) = network.edge(node, next) else {
                continue;
            };
            let step = weights.congestion() * normalized(edge.utilization, mean_utilization)
                + node_cost(next);
            seq += 1;
            trace!(from = node, to = next, key = key + step, "Enqueue candidate");
            frontier.push(Candidate {
                key: key + step,
                seq,
                node: next,
                from: Some(node),
            });
        }
    }

    debug!(source, target, expanded, "No path");
    Ok(None)
}

fn trace_back(predecessor: &[Option<NodeId>], target: NodeId) -> Vec<NodeId> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = predecessor[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
