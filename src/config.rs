//! Simulation configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.
//!
//! ```json
//! {
//!   "num_nodes": 40,
//!   "wc": 0.6,
//!   "wt": 0.4,
//!   "sources": [0, 20],
//!   "targets": [5, 15, 30],
//!   "scenario": "hotspots"
//! }
//! ```

use crate::error::{Result, RoutingError};
use crate::routing::validate_endpoints;
use crate::scenarios::Scenario;
use crate::simulation::SimulationParams;
use crate::topology::TopologyConfig;
use crate::{NodeId, Weights};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Full configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_nodes: usize,
    pub partition_size: usize,
    /// Congestion weight
    pub wc: f64,
    /// Temperature weight
    pub wt: f64,
    pub sources: Vec<NodeId>,
    pub targets: Vec<NodeId>,
    /// Seed for topology, scenario and event randomness
    pub seed: u64,
    pub scenario: Option<Scenario>,
    pub chords: Vec<(NodeId, NodeId)>,
    pub temperature_range: (f64, f64),
    pub utilization_range: (f64, f64),
    pub mean_interarrival: f64,
    pub horizon: f64,
    pub max_events: usize,
    /// Spread independent sources over the rayon pool
    pub parallel: bool,
    pub log_dir: Option<PathBuf>,
    /// Where to write the JSON report
    pub output: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let topology = TopologyConfig::default();
        let params = SimulationParams::default();
        Self {
            num_nodes: topology.num_nodes,
            partition_size: 5,
            wc: 0.7,
            wt: 0.3,
            sources: vec![0, 10],
            targets: vec![5, 15],
            seed: 42,
            scenario: None,
            chords: topology.chords,
            temperature_range: topology.temperature_range,
            utilization_range: topology.utilization_range,
            mean_interarrival: params.mean_interarrival,
            horizon: params.horizon,
            max_events: params.max_events,
            parallel: false,
            log_dir: None,
            output: None,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Check the whole configuration before anything runs.
    /// Returns the validated weights.
    pub fn validate(&self) -> Result<Weights> {
        if self.num_nodes == 0 {
            return Err(RoutingError::InvalidConfig(
                "number of nodes must be positive".to_string(),
            ));
        }
        if self.partition_size == 0 || self.partition_size > self.num_nodes {
            return Err(RoutingError::InvalidConfig(format!(
                "partition size {} must be in 1..={}",
                self.partition_size, self.num_nodes
            )));
        }
        let weights = Weights::new(self.wc, self.wt)?;
        validate_endpoints(self.num_nodes, &self.sources, &self.targets)?;
        if let Some(&(u, v)) = self
            .chords
            .iter()
            .find(|(u, v)| *u >= self.num_nodes || *v >= self.num_nodes)
        {
            return Err(RoutingError::InvalidConfig(format!(
                "chord ({}, {}) outside a network of {} nodes",
                u, v, self.num_nodes
            )));
        }
        if self.mean_interarrival.is_nan() || self.mean_interarrival <= 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "mean inter-arrival time must be positive, got {}",
                self.mean_interarrival
            )));
        }
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "horizon must be finite and non-negative, got {}",
                self.horizon
            )));
        }

        info!(
            nodes = self.num_nodes,
            partition_size = self.partition_size,
            weights = %weights,
            sources = ?self.sources,
            targets = ?self.targets,
            "Input parameters validated"
        );
        Ok(weights)
    }

    pub fn topology(&self) -> TopologyConfig {
        TopologyConfig {
            num_nodes: self.num_nodes,
            temperature_range: self.temperature_range,
            utilization_range: self.utilization_range,
            chords: self.chords.clone(),
        }
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            mean_interarrival: self.mean_interarrival,
            horizon: self.horizon,
            max_events: self.max_events,
        }
    }
}
