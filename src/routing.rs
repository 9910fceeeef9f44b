//! Ring routing: bidirectional selection and greedy multicast chaining
//!
//! On a ring every pair of nodes is joined by a clockwise and a
//! counter-clockwise arc. [`select_direction`] searches from both ends and
//! keeps the cheaper result, always oriented source → target.
//! [`MulticastPlanner`] visits a set of targets by repeatedly hopping to the
//! cheapest remaining target. This is a greedy heuristic with no optimality
//! guarantee over the visiting order.

use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::search::find_best_path;
use crate::{NodeId, Route, Weights};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Check every endpoint of a batch before any search runs.
pub fn validate_endpoints(num_nodes: usize, sources: &[NodeId], targets: &[NodeId]) -> Result<()> {
    match sources.iter().chain(targets).find(|&&n| n >= num_nodes) {
        Some(&node) => Err(RoutingError::OutOfRangeNode { node, num_nodes }),
        None => Ok(()),
    }
}

/// Search both ring directions and keep the cheaper route.
///
/// The reverse search runs target → source and its path is flipped. On an
/// exact tie the forward result wins. `None` only if neither direction
/// reaches the other end.
pub fn select_direction(
    network: &Network,
    source: NodeId,
    target: NodeId,
    weights: &Weights,
) -> Result<Option<Route>> {
    let forward = find_best_path(network, source, target, weights)?;
    let reverse = find_best_path(network, target, source, weights)?.map(Route::reversed);

    let chosen = match (forward, reverse) {
        (Some(f), Some(r)) if r.score < f.score => {
            debug!(source, target, forward = f.score, reverse = r.score, "Reverse direction selected");
            Some(r)
        }
        (Some(f), _) => Some(f),
        (None, r) => r,
    };
    Ok(chosen)
}

/// Combined route from one source through a set of targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainedRoute {
    pub source: NodeId,
    /// Concatenated segments, each node kept at its first occurrence
    pub path: Vec<NodeId>,
    /// Sum of segment scores
    pub score: f64,
    /// Targets in the order they were reached
    pub visit_order: Vec<NodeId>,
    /// Targets still pending when no segment could be found
    pub unreached: Vec<NodeId>,
    /// Per-target routes as selected, each a valid walk
    pub segments: Vec<Route>,
}

impl ChainedRoute {
    pub fn is_complete(&self) -> bool {
        self.unreached.is_empty()
    }

    /// Segments joined end to end without deduplication.
    /// Unlike `path`, every consecutive pair is an edge.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut walk: Vec<NodeId> = Vec::new();
        for segment in &self.segments {
            let skip = usize::from(walk.last().is_some() && walk.last() == segment.path.first());
            walk.extend_from_slice(&segment.path[skip..]);
        }
        walk
    }
}

/// Greedy nearest-target chaining.
///
/// From the current node, `step` is evaluated against every remaining target
/// and the lowest score wins (earliest target on ties). Stops early, keeping
/// the partial result, once no remaining target is reachable.
pub fn chain_targets<F>(source: NodeId, targets: &[NodeId], mut step: F) -> Result<ChainedRoute>
where
    F: FnMut(NodeId, NodeId) -> Result<Option<Route>>,
{
    let mut current = source;
    let mut remaining = targets.to_vec();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut path = Vec::new();
    let mut score = 0.0;
    let mut visit_order = Vec::with_capacity(targets.len());
    let mut segments = Vec::with_capacity(targets.len());

    while !remaining.is_empty() {
        let mut best: Option<(usize, Route)> = None;
        for (idx, &target) in remaining.iter().enumerate() {
            if let Some(route) = step(current, target)? {
                if best.as_ref().map_or(true, |(_, b)| route.score < b.score) {
                    best = Some((idx, route));
                }
            }
        }

        let Some((idx, route)) = best else {
            warn!(
                source,
                current,
                unreached = ?remaining,
                "No remaining target reachable, returning partial route"
            );
            break;
        };

        for &node in &route.path {
            if seen.insert(node) {
                path.push(node);
            }
        }
        score += route.score;
        segments.push(route);
        current = remaining.remove(idx);
        visit_order.push(current);
    }

    Ok(ChainedRoute {
        source,
        path,
        score,
        visit_order,
        unreached: remaining,
        segments,
    })
}

/// Plans one combined multicast route per source
pub struct MulticastPlanner<'a> {
    network: &'a Network,
    weights: Weights,
    /// Plan sources on the rayon pool
    parallel: bool,
}

impl<'a> MulticastPlanner<'a> {
    pub fn new(network: &'a Network, weights: Weights) -> Self {
        Self {
            network,
            weights,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Route from a single source through every target.
    pub fn plan_source(&self, source: NodeId, targets: &[NodeId]) -> Result<ChainedRoute> {
        chain_targets(source, targets, |from, to| {
            select_direction(self.network, from, to, &self.weights)
        })
    }

    /// One combined route per source, in source order.
    pub fn plan(&self, sources: &[NodeId], targets: &[NodeId]) -> Result<Vec<ChainedRoute>> {
        validate_endpoints(self.network.node_count(), sources, targets)?;
        info!(
            sources = sources.len(),
            targets = targets.len(),
            weights = %self.weights,
            parallel = self.parallel,
            "Planning multicast routes"
        );

        if self.parallel {
            sources
                .par_iter()
                .map(|&source| self.plan_source(source, targets))
                .collect()
        } else {
            sources
                .iter()
                .map(|&source| self.plan_source(source, targets))
                .collect()
        }
    }
}
