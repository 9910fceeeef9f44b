//! TempCon: temperature- and congestion-aware routing on ring networks
//!
//! Core library for weighted path scoring, best-path search, bidirectional
//! ring routing, greedy multicast chaining and a shortest-path baseline.

pub mod baselines;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod routing;
pub mod scenarios;
pub mod scoring;
pub mod search;
pub mod simulation;
pub mod topology;

pub use error::{Result, RoutingError};
pub use graph::{EdgeAttrs, Network, NodeAttrs};

use serde::{Deserialize, Serialize};

/// Node identifier: index into the network's node table
pub type NodeId = usize;

/// Tolerance for the weights summing to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Congestion/temperature weighting (wc, wt).
/// Both lie in [0, 1] and sum to 1, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    congestion: f64,
    temperature: f64,
}

/// Unchecked wire form of [`Weights`]
#[derive(Deserialize)]
struct RawWeights {
    congestion: f64,
    temperature: f64,
}

impl TryFrom<RawWeights> for Weights {
    type Error = RoutingError;

    fn try_from(raw: RawWeights) -> Result<Self> {
        Weights::new(raw.congestion, raw.temperature)
    }
}

impl Weights {
    /// Validate and build a weight pair.
    pub fn new(wc: f64, wt: f64) -> Result<Self> {
        let in_unit = |w: f64| (0.0..=1.0).contains(&w);
        if !in_unit(wc) || !in_unit(wt) || (wc + wt - 1.0).abs() >= WEIGHT_SUM_TOLERANCE {
            return Err(RoutingError::InvalidWeight { wc, wt });
        }
        Ok(Self {
            congestion: wc,
            temperature: wt,
        })
    }

    /// Congestion weight (wc)
    pub fn congestion(&self) -> f64 {
        self.congestion
    }

    /// Temperature weight (wt)
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(wc={:.3}, wt={:.3})", self.congestion, self.temperature)
    }
}

/// A path with its score. Lower scores are better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Vec<NodeId>,
    pub score: f64,
}

impl Route {
    pub fn new(path: Vec<NodeId>, score: f64) -> Self {
        Self { path, score }
    }

    pub fn source(&self) -> Option<NodeId> {
        self.path.first().copied()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Same route traversed the other way
    pub fn reversed(mut self) -> Self {
        self.path.reverse();
        self
    }
}
