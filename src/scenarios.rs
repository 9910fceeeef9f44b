//! Stress scenarios that overwrite node and edge attributes
//!
//! Applied to a freshly built topology before any routing runs.

use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::NodeId;
use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Hotspot nodes used by [`Scenario::Hotspots`]
pub const HOTSPOTS: [NodeId; 3] = [5, 15, 25];

/// Attribute-mutating test scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Hot, congested first half of the ring
    HighStress,
    /// A few hot nodes with congested incident links
    Hotspots,
    /// Normally distributed temperature and load
    DynamicLoad,
    /// Random node failures heating their surroundings
    FaultInjection,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::HighStress => write!(f, "high_stress"),
            Scenario::Hotspots => write!(f, "hotspots"),
            Scenario::DynamicLoad => write!(f, "dynamic_load"),
            Scenario::FaultInjection => write!(f, "fault_injection"),
        }
    }
}

impl FromStr for Scenario {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "high_stress" | "1" => Ok(Scenario::HighStress),
            "hotspots" | "2" => Ok(Scenario::Hotspots),
            "dynamic_load" | "3" => Ok(Scenario::DynamicLoad),
            "fault_injection" | "4" => Ok(Scenario::FaultInjection),
            other => Err(RoutingError::InvalidConfig(format!("unknown scenario '{}'", other))),
        }
    }
}

impl Scenario {
    /// Overwrite network attributes for this scenario.
    pub fn apply<R: Rng>(&self, network: &mut Network, rng: &mut R) -> Result<()> {
        info!(scenario = %self, nodes = network.node_count(), "Applying scenario");
        match self {
            Scenario::HighStress => high_stress(network),
            Scenario::Hotspots => hotspots(network),
            Scenario::DynamicLoad => dynamic_load(network, rng),
            Scenario::FaultInjection => fault_injection(network, rng),
        }
    }
}

fn edge_list(network: &Network) -> Vec<(NodeId, NodeId)> {
    network.edges().map(|(u, v, _)| (u, v)).collect()
}

fn high_stress(network: &mut Network) -> Result<()> {
    let half = network.node_count() / 2;
    for node in 0..network.node_count() {
        let temperature = if node < half { 85.0 } else { 65.0 };
        network.set_temperature(node, temperature)?;
    }
    for (u, v) in edge_list(network) {
        let utilization = if u < half && v < half { 90.0 } else { 30.0 };
        network.set_utilization(u, v, utilization)?;
    }
    Ok(())
}

fn hotspots(network: &mut Network) -> Result<()> {
    let hot: HashSet<NodeId> = HOTSPOTS
        .iter()
        .copied()
        .filter(|&n| network.contains(n))
        .collect();

    for node in 0..network.node_count() {
        let temperature = if hot.contains(&node) { 90.0 } else { 60.0 };
        network.set_temperature(node, temperature)?;
    }
    for (u, v) in edge_list(network) {
        let utilization = if hot.contains(&u) || hot.contains(&v) { 85.0 } else { 25.0 };
        network.set_utilization(u, v, utilization)?;
    }
    debug!(hotspots = ?hot, "Hotspots created");
    Ok(())
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| {
        RoutingError::InvalidConfig(format!("normal({}, {}): {}", mean, std_dev, e))
    })
}

fn dynamic_load<R: Rng>(network: &mut Network, rng: &mut R) -> Result<()> {
    let n = network.node_count();
    let temperature_dist = normal(70.0, 10.0)?;
    let load_dist = normal(50.0, 20.0)?;
    let temperatures: Vec<f64> = (0..n).map(|_| temperature_dist.sample(rng)).collect();
    let loads: Vec<f64> = (0..n).map(|_| load_dist.sample(rng)).collect();

    for (node, temperature) in temperatures.iter().enumerate() {
        network.set_temperature(node, temperature.clamp(50.0, 90.0))?;
    }
    // Nodes write their load onto incident links in ascending order,
    // so the higher endpoint's draw is the one that sticks.
    for (u, v) in edge_list(network) {
        network.set_utilization(u, v, loads[u.max(v)].clamp(5.0, 95.0))?;
    }
    Ok(())
}

fn fault_injection<R: Rng>(network: &mut Network, rng: &mut R) -> Result<()> {
    let n = network.node_count();
    if n == 0 {
        return Ok(());
    }
    let failed: HashSet<NodeId> = sample(rng, n, (n / 10).max(1)).into_iter().collect();

    for node in 0..n {
        network.set_temperature(node, 65.0)?;
        network.set_failed(node, false)?;
    }
    let mut failed_sorted: Vec<NodeId> = failed.iter().copied().collect();
    failed_sorted.sort_unstable();
    for &node in &failed_sorted {
        network.set_temperature(node, 95.0)?;
        network.set_failed(node, true)?;
        let neighbors = network.neighbors(node).to_vec();
        for neighbor in neighbors {
            network.set_utilization(node, neighbor, 95.0)?;
            if !failed.contains(&neighbor) {
                let heated = network.temperature(neighbor).unwrap_or(65.0) + 20.0;
                network.set_temperature(neighbor, heated)?;
            }
        }
        debug!(node, "Simulated node failure");
    }
    info!(failed = ?failed_sorted, "Fault injection applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ring(n: usize) -> Network {
        Network::ring(n, 40.0, 20.0).unwrap()
    }

    #[test]
    fn test_high_stress() {
        let mut net = ring(10);
        Scenario::HighStress
            .apply(&mut net, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(net.temperature(0), Some(85.0));
        assert_eq!(net.temperature(4), Some(85.0));
        assert_eq!(net.temperature(5), Some(65.0));
        assert_eq!(net.edge(1, 2).unwrap().utilization, 90.0);
        assert_eq!(net.edge(4, 5).unwrap().utilization, 30.0);
        assert_eq!(net.edge(9, 0).unwrap().utilization, 30.0);
    }

    #[test]
    fn test_hotspots() {
        let mut net = ring(20);
        Scenario::Hotspots
            .apply(&mut net, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(net.temperature(5), Some(90.0));
        assert_eq!(net.temperature(15), Some(90.0));
        assert_eq!(net.temperature(6), Some(60.0));
        assert_eq!(net.edge(4, 5).unwrap().utilization, 85.0);
        assert_eq!(net.edge(5, 6).unwrap().utilization, 85.0);
        assert_eq!(net.edge(7, 8).unwrap().utilization, 25.0);
    }

    #[test]
    fn test_dynamic_load_bounds() {
        let mut net = ring(40);
        Scenario::DynamicLoad
            .apply(&mut net, &mut StdRng::seed_from_u64(3))
            .unwrap();
        for (_, attrs) in net.nodes() {
            assert!((50.0..=90.0).contains(&attrs.temperature));
        }
        for (_, _, attrs) in net.edges() {
            assert!((5.0..=95.0).contains(&attrs.utilization));
        }
    }

    #[test]
    fn test_dynamic_load_centered_on_normal_means() {
        let mut net = ring(400);
        Scenario::DynamicLoad
            .apply(&mut net, &mut StdRng::seed_from_u64(21))
            .unwrap();
        assert!((net.mean_temperature() - 70.0).abs() < 2.0);
        assert!((net.mean_utilization() - 50.0).abs() < 4.0);
        assert!(normal(50.0, -1.0).is_err());
    }

    #[test]
    fn test_fault_injection() {
        let mut net = ring(30);
        Scenario::FaultInjection
            .apply(&mut net, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let failed = net.failed_nodes();
        assert_eq!(failed.len(), 3);
        for &node in &failed {
            assert_eq!(net.temperature(node), Some(95.0));
            for &neighbor in net.neighbors(node) {
                assert_eq!(net.edge(node, neighbor).unwrap().utilization, 95.0);
                if !net.is_failed(neighbor) {
                    assert!(net.temperature(neighbor).unwrap() >= 85.0);
                }
            }
        }
    }

    #[test]
    fn test_fault_injection_small_network() {
        let mut net = ring(4);
        Scenario::FaultInjection
            .apply(&mut net, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(net.failed_nodes().len(), 1);
    }

    #[test]
    fn test_parse_scenario() {
        assert_eq!("hotspots".parse::<Scenario>().unwrap(), Scenario::Hotspots);
        assert_eq!("4".parse::<Scenario>().unwrap(), Scenario::FaultInjection);
        assert!("meltdown".parse::<Scenario>().is_err());
        assert_eq!(Scenario::DynamicLoad.to_string(), "dynamic_load");
    }
}
