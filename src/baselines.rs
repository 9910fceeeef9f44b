//! Shortest-path-first baseline for comparison with weighted routing
//!
//! Ignores congestion and temperature entirely. Edges cost their static
//! `weight`, or 1 when none is set, so an unweighted network degrades to hop
//! count. The solver is pluggable through [`ShortestPath`].

use crate::error::Result;
use crate::graph::Network;
use crate::routing::{chain_targets, validate_endpoints, ChainedRoute};
use crate::{NodeId, Route};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use tracing::{debug, warn};

/// Trait for shortest-path primitives used by the baseline
pub trait ShortestPath: Sync {
    /// Minimum-cost path, or `None` when unreachable.
    /// Endpoints are assumed to be valid nodes.
    fn shortest_path(&self, network: &Network, source: NodeId, target: NodeId) -> Option<Route>;

    /// Get the name of the algorithm
    fn algorithm_name(&self) -> &str;
}

/// Dijkstra over edge weights, falling back to 1 per edge
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

#[derive(Debug)]
struct QueueEntry {
    cost: f64,
    seq: u64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn rebuild_path(previous: &[Option<NodeId>], source: NodeId, target: NodeId) -> Vec<NodeId> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match previous[current] {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

impl ShortestPath for Dijkstra {
    fn shortest_path(&self, network: &Network, source: NodeId, target: NodeId) -> Option<Route> {
        if !network.contains(source) || !network.contains(target) {
            return None;
        }

        let n = network.node_count();
        let mut distance = vec![f64::INFINITY; n];
        let mut previous: Vec<Option<NodeId>> = vec![None; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        distance[source] = 0.0;
        heap.push(QueueEntry {
            cost: 0.0,
            seq,
            node: source,
        });

        while let Some(QueueEntry { cost, node, .. }) = heap.pop() {
            if cost > distance[node] {
                continue;
            }
            if node == target {
                return Some(Route::new(rebuild_path(&previous, source, target), cost));
            }

            for &next in network.neighbors(node) {
                let Some(edge) = network.edge(node, next) else {
                    continue;
                };
                let candidate = cost + edge.spf_weight();
                if candidate < distance[next] {
                    distance[next] = candidate;
                    previous[next] = Some(node);
                    seq += 1;
                    heap.push(QueueEntry {
                        cost: candidate,
                        seq,
                        node: next,
                    });
                }
            }
        }

        None
    }

    fn algorithm_name(&self) -> &str {
        "Dijkstra"
    }
}

/// Breadth-first hop count, ignoring any edge weights
#[derive(Debug, Clone, Copy, Default)]
pub struct HopCount;

impl ShortestPath for HopCount {
    fn shortest_path(&self, network: &Network, source: NodeId, target: NodeId) -> Option<Route> {
        if !network.contains(source) || !network.contains(target) {
            return None;
        }

        let mut previous: Vec<Option<NodeId>> = vec![None; network.node_count()];
        let mut discovered = vec![false; network.node_count()];
        let mut queue = VecDeque::new();
        discovered[source] = true;
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            if node == target {
                let path = rebuild_path(&previous, source, target);
                let hops = (path.len() - 1) as f64;
                return Some(Route::new(path, hops));
            }
            for &next in network.neighbors(node) {
                if !discovered[next] {
                    discovered[next] = true;
                    previous[next] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    fn algorithm_name(&self) -> &str {
        "HopCount"
    }
}

/// Baseline result for one (source, target) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRoute {
    pub source: NodeId,
    pub target: NodeId,
    /// `None` when the target is unreachable
    pub route: Option<Route>,
}

/// Shortest-path baseline over a network
pub struct BaselineSpf<'a, S: ShortestPath = Dijkstra> {
    network: &'a Network,
    solver: S,
    parallel: bool,
}

impl<'a> BaselineSpf<'a, Dijkstra> {
    pub fn new(network: &'a Network) -> Self {
        Self::with_solver(network, Dijkstra)
    }
}

impl<'a, S: ShortestPath> BaselineSpf<'a, S> {
    pub fn with_solver(network: &'a Network, solver: S) -> Self {
        Self {
            network,
            solver,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn algorithm_name(&self) -> &str {
        self.solver.algorithm_name()
    }

    fn pairs_for_source(&self, source: NodeId, targets: &[NodeId]) -> Vec<PairRoute> {
        targets
            .iter()
            .map(|&target| {
                let route = self.solver.shortest_path(self.network, source, target);
                if route.is_none() {
                    warn!(source, target, algorithm = self.algorithm_name(), "Baseline found no path");
                }
                PairRoute {
                    source,
                    target,
                    route,
                }
            })
            .collect()
    }

    /// Independent shortest path for every (source, target) pair,
    /// grouped by source in input order.
    pub fn shortest_paths(&self, sources: &[NodeId], targets: &[NodeId]) -> Result<Vec<PairRoute>> {
        validate_endpoints(self.network.node_count(), sources, targets)?;
        debug!(
            sources = sources.len(),
            targets = targets.len(),
            algorithm = self.algorithm_name(),
            "Computing baseline shortest paths"
        );

        let grouped: Vec<Vec<PairRoute>> = if self.parallel {
            sources
                .par_iter()
                .map(|&source| self.pairs_for_source(source, targets))
                .collect()
        } else {
            sources
                .iter()
                .map(|&source| self.pairs_for_source(source, targets))
                .collect()
        };
        Ok(grouped.into_iter().flatten().collect())
    }

    /// Greedy nearest-first chaining through all targets, scored by path cost.
    pub fn chained(&self, sources: &[NodeId], targets: &[NodeId]) -> Result<Vec<ChainedRoute>> {
        validate_endpoints(self.network.node_count(), sources, targets)?;
        debug!(
            sources = sources.len(),
            targets = targets.len(),
            algorithm = self.algorithm_name(),
            "Chaining baseline routes"
        );

        let chain = |source: NodeId| {
            chain_targets(source, targets, |from, to| {
                Ok(self.solver.shortest_path(self.network, from, to))
            })
        };
        if self.parallel {
            sources.par_iter().map(|&source| chain(source)).collect()
        } else {
            sources.iter().map(|&source| chain(source)).collect()
        }
    }
}
