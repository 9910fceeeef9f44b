//! Discrete-event driver
//!
//! Each source generates packets with exponentially distributed
//! inter-arrival times. Every packet re-runs the weighted multicast planner
//! and the chained baseline for its source and records the outcome.

use crate::baselines::BaselineSpf;
use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::metrics::{PathMetrics, SummaryStats};
use crate::routing::{validate_endpoints, MulticastPlanner};
use crate::{NodeId, Weights};
use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::{debug, info};

/// Configuration for the event loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Mean time between packets from one source
    pub mean_interarrival: f64,
    /// Events scheduled after this time are dropped
    pub horizon: f64,
    /// Hard cap on processed events
    pub max_events: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            mean_interarrival: 10.0,
            horizon: 100.0,
            max_events: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EventKind {
    PacketGeneration { source: NodeId },
}

#[derive(Debug)]
struct SimulationEvent {
    time: f64,
    seq: u64,
    kind: EventKind,
}

impl PartialEq for SimulationEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimulationEvent {}

impl PartialOrd for SimulationEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimulationEvent {
    // Earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Named metric samples collected during a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    metrics: BTreeMap<String, Vec<f64>>,
}

impl SimulationStats {
    pub fn record_metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    pub fn samples(&self, name: &str) -> &[f64] {
        self.metrics.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self) -> BTreeMap<String, SummaryStats> {
        self.metrics
            .iter()
            .map(|(name, values)| (name.clone(), SummaryStats::from_values(values)))
            .collect()
    }
}

/// Result of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub stats: SimulationStats,
    pub events_processed: usize,
    pub final_time: f64,
}

/// Inter-arrival distribution with the given mean
fn interarrival(mean: f64) -> Result<Exp<f64>> {
    if mean.is_nan() || mean <= 0.0 {
        return Err(RoutingError::InvalidConfig(format!(
            "mean inter-arrival time must be positive, got {}",
            mean
        )));
    }
    Exp::new(1.0 / mean)
        .map_err(|e| RoutingError::InvalidConfig(format!("exponential rate 1/{}: {}", mean, e)))
}

/// Event-driven wrapper around the routing engine
pub struct Simulation<'a, R: Rng> {
    network: &'a Network,
    weights: Weights,
    params: SimulationParams,
    rng: R,
}

impl<'a, R: Rng> Simulation<'a, R> {
    pub fn new(network: &'a Network, weights: Weights, params: SimulationParams, rng: R) -> Self {
        Self {
            network,
            weights,
            params,
            rng,
        }
    }

    /// Run until the queue drains, the horizon passes or the event cap is hit.
    pub fn run(&mut self, sources: &[NodeId], targets: &[NodeId]) -> Result<SimulationOutcome> {
        validate_endpoints(self.network.node_count(), sources, targets)?;
        let arrivals = interarrival(self.params.mean_interarrival)?;
        if self.params.horizon.is_nan() || self.params.horizon < 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "horizon must be non-negative, got {}",
                self.params.horizon
            )));
        }

        let planner = MulticastPlanner::new(self.network, self.weights);
        let baseline = BaselineSpf::new(self.network);
        let mut stats = SimulationStats::default();
        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;
        for &source in sources {
            queue.push(SimulationEvent {
                time: 0.0,
                seq,
                kind: EventKind::PacketGeneration { source },
            });
            seq += 1;
        }

        info!(
            sources = sources.len(),
            horizon = self.params.horizon,
            max_events = self.params.max_events,
            "Starting discrete event simulation"
        );

        let mut processed = 0usize;
        let mut now = 0.0;
        while let Some(event) = queue.pop() {
            if event.time > self.params.horizon || processed >= self.params.max_events {
                break;
            }
            now = event.time;
            processed += 1;

            match event.kind {
                EventKind::PacketGeneration { source } => {
                    let weighted = planner.plan_source(source, targets)?;
                    let spf = baseline.chained(&[source], targets)?;

                    let weighted_metrics = PathMetrics::compute(self.network, &weighted.walk())?;
                    stats.record_metric("tempcon_congestion", weighted_metrics.congestion);
                    stats.record_metric("tempcon_temperature", weighted_metrics.mean_temperature);
                    stats.record_metric("tempcon_score", weighted.score);
                    stats.record_metric("tempcon_hops", weighted_metrics.hops as f64);
                    stats.record_metric(
                        "tempcon_unreached",
                        weighted.unreached.len() as f64,
                    );

                    if let Some(spf) = spf.first() {
                        let spf_metrics = PathMetrics::compute(self.network, &spf.walk())?;
                        stats.record_metric("spf_congestion", spf_metrics.congestion);
                        stats.record_metric("spf_temperature", spf_metrics.mean_temperature);
                        stats.record_metric("spf_hops", spf_metrics.hops as f64);
                    }

                    let next = now + arrivals.sample(&mut self.rng);
                    debug!(source, time = now, next, "Packet generated");
                    queue.push(SimulationEvent {
                        time: next,
                        seq,
                        kind: EventKind::PacketGeneration { source },
                    });
                    seq += 1;
                }
            }
        }

        info!(events = processed, final_time = now, "Discrete event simulation completed");
        Ok(SimulationOutcome {
            stats,
            events_processed: processed,
            final_time: now,
        })
    }
}
