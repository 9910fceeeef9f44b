//! Weighted-vs-baseline comparison report
//!
//! Collects the planned routes, per-source comparisons, partition figures
//! and the simulation summary into one serializable document.

use crate::baselines::BaselineSpf;
use crate::error::Result;
use crate::graph::Network;
use crate::metrics::{
    partition_metrics, NetworkPerformance, PartitionMetrics, RouteComparison, SummaryStats,
};
use crate::routing::{ChainedRoute, MulticastPlanner};
use crate::scenarios::Scenario;
use crate::simulation::SimulationOutcome;
use crate::{NodeId, Weights};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Discrete-event run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub events_processed: usize,
    pub final_time: f64,
    pub metrics: BTreeMap<String, SummaryStats>,
}

impl From<&SimulationOutcome> for SimulationSummary {
    fn from(outcome: &SimulationOutcome) -> Self {
        Self {
            events_processed: outcome.events_processed,
            final_time: outcome.final_time,
            metrics: outcome.stats.summary(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub num_nodes: usize,
    pub weights: Weights,
    pub scenario: Option<Scenario>,
    pub sources: Vec<NodeId>,
    pub targets: Vec<NodeId>,
    pub tempcon_routes: Vec<ChainedRoute>,
    pub spf_routes: Vec<ChainedRoute>,
    pub comparisons: Vec<RouteComparison>,
    pub tempcon_performance: NetworkPerformance,
    pub spf_performance: NetworkPerformance,
    pub partitions: Vec<PartitionMetrics>,
    pub simulation: Option<SimulationSummary>,
}

impl ComparisonReport {
    /// Plan weighted and baseline routes for every source and compare them.
    pub fn build(
        network: &Network,
        weights: Weights,
        sources: &[NodeId],
        targets: &[NodeId],
        partitions: &[Vec<NodeId>],
        parallel: bool,
    ) -> Result<Self> {
        let tempcon_routes = MulticastPlanner::new(network, weights)
            .with_parallel(parallel)
            .plan(sources, targets)?;
        let spf_routes = BaselineSpf::new(network)
            .with_parallel(parallel)
            .chained(sources, targets)?;

        let comparisons = tempcon_routes
            .iter()
            .zip(&spf_routes)
            .map(|(weighted, baseline)| RouteComparison::compare(network, weighted, baseline))
            .collect::<Result<Vec<_>>>()?;

        let walks = |routes: &[ChainedRoute]| {
            routes.iter().map(ChainedRoute::walk).collect::<Vec<_>>()
        };
        let tempcon_performance =
            NetworkPerformance::compute(network, &walks(&tempcon_routes), None);
        let spf_performance = NetworkPerformance::compute(network, &walks(&spf_routes), None);

        info!(
            sources = sources.len(),
            targets = targets.len(),
            tempcon_latency = tempcon_performance.latency,
            spf_latency = spf_performance.latency,
            "Comparison report built"
        );

        Ok(Self {
            generated_at: Utc::now(),
            num_nodes: network.node_count(),
            weights,
            scenario: None,
            sources: sources.to_vec(),
            targets: targets.to_vec(),
            tempcon_routes,
            spf_routes,
            comparisons,
            tempcon_performance,
            spf_performance,
            partitions: partition_metrics(network, partitions),
            simulation: None,
        })
    }

    pub fn with_scenario(mut self, scenario: Option<Scenario>) -> Self {
        self.scenario = scenario;
        self
    }

    /// Attach a simulation run. Throughput is the hops carried over its final time.
    pub fn with_simulation(mut self, outcome: &SimulationOutcome) -> Self {
        let summary = SimulationSummary::from(outcome);
        if summary.final_time > 0.0 {
            let per_time = |hops: Option<&SummaryStats>| {
                hops.map(|s| s.mean * s.count as f64 / summary.final_time)
            };
            self.tempcon_performance.throughput = per_time(summary.metrics.get("tempcon_hops"));
            self.spf_performance.throughput = per_time(summary.metrics.get("spf_hops"));
        }
        self.simulation = Some(summary);
        self
    }

    /// Pretty-printed JSON, creating parent directories as needed.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TempCon vs SPF on {} nodes {}", self.num_nodes, self.weights)?;
        if let Some(scenario) = self.scenario {
            writeln!(f, "Scenario: {}", scenario)?;
        }
        for ((weighted, baseline), comparison) in self
            .tempcon_routes
            .iter()
            .zip(&self.spf_routes)
            .zip(&self.comparisons)
        {
            writeln!(f, "Source {}:", weighted.source)?;
            writeln!(
                f,
                "  TempCon path {:?} (score {:.4}, visit order {:?})",
                weighted.path, weighted.score, weighted.visit_order
            )?;
            if !weighted.unreached.is_empty() {
                writeln!(f, "  TempCon unreached {:?}", weighted.unreached)?;
            }
            writeln!(f, "  SPF path {:?} (cost {:.1})", baseline.path, baseline.score)?;
            writeln!(
                f,
                "  Congestion reduction {:.1}%, temperature reduction {:.1}%, extra hops {}",
                comparison.congestion_reduction_pct,
                comparison.temperature_reduction_pct,
                comparison.extra_hops
            )?;
        }
        writeln!(
            f,
            "Reliability: TempCon {:.3}, SPF {:.3}",
            self.tempcon_performance.reliability, self.spf_performance.reliability
        )?;
        if let Some(sim) = &self.simulation {
            writeln!(f, "Simulation: {} events up to t={:.2}", sim.events_processed, sim.final_time)?;
            for (name, stats) in &sim.metrics {
                writeln!(
                    f,
                    "  {:<22} mean {:>8.3}  std {:>7.3}  min {:>8.3}  max {:>8.3}",
                    name, stats.mean, stats.std, stats.min, stats.max
                )?;
            }
        }
        Ok(())
    }
}
