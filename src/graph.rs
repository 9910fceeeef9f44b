//! Network graph model
//!
//! Undirected graph with a temperature reading per node and a utilization
//! reading per edge. The routing engine only reads it; topology builders and
//! scenarios write attributes before any search begins.

use crate::error::{Result, RoutingError};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound of the utilization scale (percent)
pub const MAX_UTILIZATION: f64 = 100.0;

/// Per-node attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    /// Thermal reading in °C
    pub temperature: f64,
    /// Set by fault scenarios
    pub failed: bool,
}

impl NodeAttrs {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            failed: false,
        }
    }
}

/// Per-edge attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    /// Link utilization in percent, within [0, 100]
    pub utilization: f64,
    /// Static link cost, only read by the shortest-path baseline
    pub weight: Option<f64>,
}

impl EdgeAttrs {
    pub fn new(utilization: f64) -> Self {
        Self {
            utilization,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Baseline cost of the edge; hop count when no weight is set.
    pub fn spf_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    fn validate(&self) -> Result<()> {
        if !self.utilization.is_finite() || !(0.0..=MAX_UTILIZATION).contains(&self.utilization) {
            return Err(RoutingError::InvalidAttribute(format!(
                "utilization {} outside [0, {}]",
                self.utilization, MAX_UTILIZATION
            )));
        }
        if let Some(w) = self.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(RoutingError::InvalidAttribute(format!(
                    "edge weight {} must be finite and non-negative",
                    w
                )));
            }
        }
        Ok(())
    }
}

/// Undirected network with symmetric edge attributes
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<NodeAttrs>,
    /// Neighbor lists in edge insertion order
    adjacency: Vec<Vec<NodeId>>,
    /// Keyed by (min, max) endpoint
    edges: BTreeMap<(NodeId, NodeId), EdgeAttrs>,
}

fn edge_key(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Network {
    /// Create `num_nodes` isolated nodes at a uniform temperature.
    pub fn new(num_nodes: usize, temperature: f64) -> Self {
        Self {
            nodes: vec![NodeAttrs::new(temperature); num_nodes],
            adjacency: vec![Vec::new(); num_nodes],
            edges: BTreeMap::new(),
        }
    }

    /// Cycle 0-1-...-(n-1)-0 with uniform attributes.
    pub fn ring(num_nodes: usize, temperature: f64, utilization: f64) -> Result<Self> {
        let mut network = Self::new(num_nodes, temperature);
        if num_nodes < 2 {
            return Ok(network);
        }
        for i in 0..num_nodes {
            let j = (i + 1) % num_nodes;
            network.add_edge(i, j, EdgeAttrs::new(utilization))?;
        }
        Ok(network)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node < self.nodes.len()
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(RoutingError::OutOfRangeNode {
                node,
                num_nodes: self.nodes.len(),
            })
        }
    }

    /// Add an undirected edge, overwriting the attributes of an existing one.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, attrs: EdgeAttrs) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        if u == v {
            return Err(RoutingError::InvalidAttribute(format!("self-loop on node {}", u)));
        }
        attrs.validate()?;

        if self.edges.insert(edge_key(u, v), attrs).is_none() {
            self.adjacency[u].push(v);
            self.adjacency[v].push(u);
        }
        Ok(())
    }

    /// Remove an edge, returning its attributes if it existed.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Option<EdgeAttrs> {
        let removed = self.edges.remove(&edge_key(u, v))?;
        self.adjacency[u].retain(|&n| n != v);
        self.adjacency[v].retain(|&n| n != u);
        Some(removed)
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edges.contains_key(&edge_key(u, v))
    }

    pub fn edge(&self, u: NodeId, v: NodeId) -> Option<&EdgeAttrs> {
        self.edges.get(&edge_key(u, v))
    }

    /// Neighbors of a node; empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn temperature(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(node).map(|n| n.temperature)
    }

    pub fn is_failed(&self, node: NodeId) -> bool {
        self.nodes.get(node).map(|n| n.failed).unwrap_or(false)
    }

    pub fn set_temperature(&mut self, node: NodeId, temperature: f64) -> Result<()> {
        self.check_node(node)?;
        if !temperature.is_finite() {
            return Err(RoutingError::InvalidAttribute(format!(
                "temperature {} on node {} is not finite",
                temperature, node
            )));
        }
        self.nodes[node].temperature = temperature;
        Ok(())
    }

    pub fn set_failed(&mut self, node: NodeId, failed: bool) -> Result<()> {
        self.check_node(node)?;
        self.nodes[node].failed = failed;
        Ok(())
    }

    pub fn set_utilization(&mut self, u: NodeId, v: NodeId, utilization: f64) -> Result<()> {
        let edge = self
            .edges
            .get_mut(&edge_key(u, v))
            .ok_or(RoutingError::InvalidPath { from: u, to: v })?;
        let updated = EdgeAttrs {
            utilization,
            weight: edge.weight,
        };
        updated.validate()?;
        *edge = updated;
        Ok(())
    }

    pub fn set_weight(&mut self, u: NodeId, v: NodeId, weight: Option<f64>) -> Result<()> {
        let edge = self
            .edges
            .get_mut(&edge_key(u, v))
            .ok_or(RoutingError::InvalidPath { from: u, to: v })?;
        let updated = EdgeAttrs {
            utilization: edge.utilization,
            weight,
        };
        updated.validate()?;
        *edge = updated;
        Ok(())
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeAttrs)> {
        self.nodes.iter().enumerate()
    }

    /// Edges as (min, max, attrs) in ascending key order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &EdgeAttrs)> {
        self.edges.iter().map(|(&(u, v), attrs)| (u, v, attrs))
    }

    /// Mean utilization over all edges, 0 for an edgeless graph.
    pub fn mean_utilization(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edges.values().map(|e| e.utilization).sum::<f64>() / self.edges.len() as f64
    }

    /// Mean temperature over all nodes, 0 for an empty graph.
    pub fn mean_temperature(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.nodes.iter().map(|n| n.temperature).sum::<f64>() / self.nodes.len() as f64
    }

    pub fn failed_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, attrs)| attrs.failed)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_structure() {
        let ring = Network::ring(6, 50.0, 20.0).unwrap();
        assert_eq!(ring.node_count(), 6);
        assert_eq!(ring.edge_count(), 6);
        assert!(ring.has_edge(5, 0));
        assert!(ring.has_edge(0, 5));
        assert_eq!(ring.neighbors(0), &[1, 5]);
        assert_eq!(ring.neighbors(3), &[2, 4]);
    }

    #[test]
    fn test_edge_attributes_symmetric() {
        let mut net = Network::ring(4, 30.0, 10.0).unwrap();
        net.set_utilization(2, 1, 75.0).unwrap();
        assert_eq!(net.edge(1, 2).unwrap().utilization, 75.0);
        assert_eq!(net.edge(2, 1).unwrap().utilization, 75.0);
    }

    #[test]
    fn test_add_edge_overwrites_without_duplicating() {
        let mut net = Network::ring(4, 30.0, 10.0).unwrap();
        net.add_edge(1, 0, EdgeAttrs::new(40.0).with_weight(2.0)).unwrap();
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.neighbors(0), &[1, 3]);
        assert_eq!(net.edge(0, 1).unwrap().spf_weight(), 2.0);
    }

    #[test]
    fn test_rejects_invalid_attributes() {
        let mut net = Network::new(3, 25.0);
        assert!(matches!(
            net.add_edge(0, 1, EdgeAttrs::new(120.0)),
            Err(RoutingError::InvalidAttribute(_))
        ));
        assert!(matches!(
            net.add_edge(0, 3, EdgeAttrs::new(10.0)),
            Err(RoutingError::OutOfRangeNode { node: 3, num_nodes: 3 })
        ));
        assert!(net.add_edge(1, 1, EdgeAttrs::new(10.0)).is_err());
        assert!(net.add_edge(0, 1, EdgeAttrs::new(10.0).with_weight(-1.0)).is_err());
        assert!(net.set_temperature(0, f64::NAN).is_err());
        assert!(matches!(
            net.set_utilization(0, 2, 10.0),
            Err(RoutingError::InvalidPath { from: 0, to: 2 })
        ));
    }

    #[test]
    fn test_remove_edge() {
        let mut net = Network::ring(5, 30.0, 10.0).unwrap();
        let removed = net.remove_edge(4, 0).unwrap();
        assert_eq!(removed.utilization, 10.0);
        assert!(!net.has_edge(0, 4));
        assert_eq!(net.neighbors(0), &[1]);
        assert_eq!(net.neighbors(4), &[3]);
        assert!(net.remove_edge(4, 0).is_none());
    }

    #[test]
    fn test_means() {
        let mut net = Network::ring(4, 40.0, 20.0).unwrap();
        net.set_temperature(0, 80.0).unwrap();
        net.set_utilization(0, 1, 60.0).unwrap();
        assert!((net.mean_temperature() - 50.0).abs() < 1e-12);
        assert!((net.mean_utilization() - 30.0).abs() < 1e-12);
        assert_eq!(Network::new(3, 10.0).mean_utilization(), 0.0);
        assert_eq!(Network::default().mean_temperature(), 0.0);
    }

    #[test]
    fn test_unknown_node_lookups() {
        let net = Network::ring(3, 30.0, 10.0).unwrap();
        assert!(net.neighbors(7).is_empty());
        assert!(net.temperature(7).is_none());
        assert!(!net.is_failed(7));
    }
}
