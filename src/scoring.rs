//! Weighted path scoring
//!
//! A path's score is a convex combination of its normalized congestion and
//! normalized temperature:
//!
//! score = wc · C / (|p| · ū) + wt · T / (|p| · T̄)
//!
//! where C sums edge utilization along the path, T sums node temperature,
//! |p| is the node count, and ū, T̄ are the graph-wide means. A term whose
//! mean is zero contributes 0.

use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::{NodeId, Weights};

/// Sum of edge utilization along a path. A single-node path has congestion 0.
pub fn path_congestion(network: &Network, path: &[NodeId]) -> Result<f64> {
    path.windows(2).try_fold(0.0, |acc, pair| {
        let (u, v) = (pair[0], pair[1]);
        network
            .edge(u, v)
            .map(|e| acc + e.utilization)
            .ok_or(RoutingError::InvalidPath { from: u, to: v })
    })
}

/// Sum of node temperature along a path.
pub fn path_temperature(network: &Network, path: &[NodeId]) -> Result<f64> {
    path.iter().try_fold(0.0, |acc, &node| {
        network
            .temperature(node)
            .map(|t| acc + t)
            .ok_or(RoutingError::OutOfRangeNode {
                node,
                num_nodes: network.node_count(),
            })
    })
}

/// Normalized weighted score of a complete path.
pub fn path_score(network: &Network, path: &[NodeId], weights: &Weights) -> Result<f64> {
    if path.is_empty() {
        return Err(RoutingError::EmptyPath);
    }
    let congestion = path_congestion(network, path)?;
    let temperature = path_temperature(network, path)?;
    let len = path.len() as f64;

    let norm_congestion = normalize(congestion, len, network.mean_utilization());
    let norm_temperature = normalize(temperature, len, network.mean_temperature());

    Ok(weights.congestion() * norm_congestion + weights.temperature() * norm_temperature)
}

/// Convenience wrapper validating a raw (wc, wt) pair first.
pub fn path_score_raw(network: &Network, path: &[NodeId], wc: f64, wt: f64) -> Result<f64> {
    let weights = Weights::new(wc, wt)?;
    path_score(network, path, &weights)
}

fn normalize(total: f64, len: f64, mean: f64) -> f64 {
    if mean > 0.0 {
        total / (len * mean)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_ring() -> Network {
        Network::ring(6, 50.0, 20.0).unwrap()
    }

    #[test]
    fn test_path_congestion() {
        let ring = uniform_ring();
        assert_eq!(path_congestion(&ring, &[0, 1, 2, 3]).unwrap(), 60.0);
        assert_eq!(path_congestion(&ring, &[4]).unwrap(), 0.0);
        assert_eq!(path_congestion(&ring, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let ring = uniform_ring();
        let err = path_congestion(&ring, &[0, 1, 3]).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidPath { from: 1, to: 3 }));
        assert!(path_score_raw(&ring, &[0, 2], 0.5, 0.5).is_err());
    }

    #[test]
    fn test_uniform_ring_score() {
        let ring = uniform_ring();
        let score = path_score_raw(&ring, &[0, 1, 2, 3], 0.6, 0.4).unwrap();
        assert!((score - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_single_node_score() {
        let ring = uniform_ring();
        let score = path_score_raw(&ring, &[2], 0.6, 0.4).unwrap();
        // no congestion, temperature equals the mean
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let ring = uniform_ring();
        assert!(matches!(
            path_score_raw(&ring, &[0, 1], 0.6, 0.6),
            Err(RoutingError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        let ring = uniform_ring();
        assert!(matches!(
            path_score_raw(&ring, &[], 0.5, 0.5),
            Err(RoutingError::EmptyPath)
        ));
    }

    #[test]
    fn test_zero_means_contribute_nothing() {
        let ring = Network::ring(4, 0.0, 0.0).unwrap();
        assert_eq!(path_score_raw(&ring, &[0, 1, 2], 0.5, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_hot_path_scores_higher() {
        let mut ring = uniform_ring();
        ring.set_temperature(1, 90.0).unwrap();
        let hot = path_score_raw(&ring, &[0, 1, 2], 0.0, 1.0).unwrap();
        let cool = path_score_raw(&ring, &[0, 5, 4], 0.0, 1.0).unwrap();
        assert!(hot > cool);
    }
}
