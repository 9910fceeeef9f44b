//! Ring topology construction
//!
//! Builds a cycle over N nodes with random temperatures and link
//! utilizations drawn from an injected RNG, plus optional chords.

use crate::error::{Result, RoutingError};
use crate::graph::{EdgeAttrs, Network};
use crate::NodeId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for ring construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub num_nodes: usize,
    /// Initial node temperature range in °C
    pub temperature_range: (f64, f64),
    /// Initial link utilization range in percent
    pub utilization_range: (f64, f64),
    /// Extra edges on top of the cycle
    pub chords: Vec<(NodeId, NodeId)>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            num_nodes: 20,
            temperature_range: (25.0, 50.0),
            utilization_range: (10.0, 80.0),
            chords: Vec::new(),
        }
    }
}

fn sample_range<R: Rng>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn check_range(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(RoutingError::InvalidConfig(format!(
            "{} range ({}, {}) is not a finite ascending interval",
            name, lo, hi
        )));
    }
    Ok(())
}

/// Create a ring topology with randomized attributes.
pub fn create_ring_topology<R: Rng>(config: &TopologyConfig, rng: &mut R) -> Result<Network> {
    if config.num_nodes == 0 {
        return Err(RoutingError::InvalidConfig("ring needs at least one node".to_string()));
    }
    check_range("temperature", config.temperature_range)?;
    check_range("utilization", config.utilization_range)?;

    let n = config.num_nodes;
    let mut network = Network::new(n, 0.0);
    for node in 0..n {
        network.set_temperature(node, sample_range(rng, config.temperature_range))?;
    }
    if n >= 2 {
        for node in 0..n {
            let utilization = sample_range(rng, config.utilization_range);
            network.add_edge(node, (node + 1) % n, EdgeAttrs::new(utilization))?;
        }
    }
    for &(u, v) in &config.chords {
        let utilization = sample_range(rng, config.utilization_range);
        network.add_edge(u, v, EdgeAttrs::new(utilization))?;
    }

    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        chords = config.chords.len(),
        "Ring topology created"
    );
    Ok(network)
}

/// Split node ids into consecutive groups of `partition_size`.
/// The last group may be smaller.
pub fn partition_nodes(num_nodes: usize, partition_size: usize) -> Result<Vec<Vec<NodeId>>> {
    if partition_size == 0 {
        return Err(RoutingError::InvalidConfig(
            "partition size must be positive".to_string(),
        ));
    }
    let nodes: Vec<NodeId> = (0..num_nodes).collect();
    Ok(nodes.chunks(partition_size).map(<[NodeId]>::to_vec).collect())
}
