//! Route and network metrics for reporting
//!
//! Consumes routes produced by the routing engine and the baseline and turns
//! them into comparable figures.

use crate::error::{Result, RoutingError};
use crate::graph::Network;
use crate::routing::ChainedRoute;
use crate::scoring::{path_congestion, path_temperature};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thermo-optic coefficient α of the microring resonators
pub const THERMO_OPTIC_COEFFICIENT: f64 = 1.86e-4;
/// Reference resonant wavelength λ0 in nm
pub const REFERENCE_WAVELENGTH_NM: f64 = 1550.0;
/// Ambient temperature T0 in °C
pub const REFERENCE_TEMPERATURE_C: f64 = 25.0;

/// Temperature from a resonant wavelength shift:
/// T = T0 + Δλ / (λ0 · α)
pub fn temperature_from_wavelength_shift(delta_lambda: f64) -> Result<f64> {
    if !delta_lambda.is_finite() || delta_lambda < 0.0 {
        return Err(RoutingError::InvalidWavelengthShift(delta_lambda));
    }
    Ok(REFERENCE_TEMPERATURE_C + delta_lambda / (REFERENCE_WAVELENGTH_NM * THERMO_OPTIC_COEFFICIENT))
}

/// Raw congestion and temperature figures of a walkable path
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathMetrics {
    pub hops: usize,
    /// Summed link utilization
    pub congestion: f64,
    /// Summed node temperature
    pub temperature: f64,
    pub mean_temperature: f64,
    pub peak_temperature: f64,
    pub peak_utilization: f64,
}

impl PathMetrics {
    pub fn compute(network: &Network, path: &[NodeId]) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::default());
        }
        let congestion = path_congestion(network, path)?;
        let temperature = path_temperature(network, path)?;
        let peak_temperature = path
            .iter()
            .filter_map(|&n| network.temperature(n))
            .fold(f64::NEG_INFINITY, f64::max);
        let peak_utilization = path
            .windows(2)
            .filter_map(|pair| network.edge(pair[0], pair[1]))
            .map(|e| e.utilization)
            .fold(0.0, f64::max);

        Ok(Self {
            hops: path.len() - 1,
            congestion,
            temperature,
            mean_temperature: temperature / path.len() as f64,
            peak_temperature,
            peak_utilization,
        })
    }
}

/// Weighted route against the baseline route for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteComparison {
    pub source: NodeId,
    pub weighted: PathMetrics,
    pub baseline: PathMetrics,
    /// Percent less congestion than the baseline (negative when worse)
    pub congestion_reduction_pct: f64,
    /// Percent lower mean temperature than the baseline
    pub temperature_reduction_pct: f64,
    pub extra_hops: i64,
}

fn reduction_pct(baseline: f64, weighted: f64) -> f64 {
    if baseline > 0.0 {
        (baseline - weighted) / baseline * 100.0
    } else {
        0.0
    }
}

impl RouteComparison {
    pub fn compare(network: &Network, weighted: &ChainedRoute, baseline: &ChainedRoute) -> Result<Self> {
        let weighted_metrics = PathMetrics::compute(network, &weighted.walk())?;
        let baseline_metrics = PathMetrics::compute(network, &baseline.walk())?;
        let comparison = Self {
            source: weighted.source,
            congestion_reduction_pct: reduction_pct(
                baseline_metrics.congestion,
                weighted_metrics.congestion,
            ),
            temperature_reduction_pct: reduction_pct(
                baseline_metrics.mean_temperature,
                weighted_metrics.mean_temperature,
            ),
            extra_hops: weighted_metrics.hops as i64 - baseline_metrics.hops as i64,
            weighted: weighted_metrics,
            baseline: baseline_metrics,
        };
        debug!(
            source = comparison.source,
            congestion_reduction = comparison.congestion_reduction_pct,
            temperature_reduction = comparison.temperature_reduction_pct,
            "Route comparison"
        );
        Ok(comparison)
    }
}

/// Aggregate performance of a set of delivered paths
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkPerformance {
    /// Hops carried per time unit, when a window is given
    pub throughput: Option<f64>,
    /// Mean path length in nodes
    pub latency: f64,
    /// hops / (hops + 1) over all paths
    pub energy_efficiency: f64,
    /// 1 - (peak temperature / 100 + peak utilization / 100) / 2
    pub reliability: f64,
}

impl NetworkPerformance {
    /// Empty paths count toward the latency mean but carry no hops.
    pub fn compute(network: &Network, paths: &[Vec<NodeId>], time_window: Option<f64>) -> Self {
        let total_hops = paths
            .iter()
            .map(|p| p.len().saturating_sub(1))
            .sum::<usize>() as f64;
        let total_nodes = paths.iter().map(Vec::len).sum::<usize>() as f64;

        let throughput = time_window
            .filter(|w| *w > 0.0)
            .map(|w| total_hops / w);
        let latency = if paths.is_empty() {
            0.0
        } else {
            total_nodes / paths.len() as f64
        };
        let energy_efficiency = total_hops / (total_hops + 1.0);

        let peak_temperature = network
            .nodes()
            .map(|(_, n)| n.temperature)
            .fold(0.0, f64::max);
        let peak_utilization = network
            .edges()
            .map(|(_, _, e)| e.utilization)
            .fold(0.0, f64::max);
        let reliability = 1.0 - (peak_temperature / 100.0 + peak_utilization / 100.0) / 2.0;

        Self {
            throughput,
            latency,
            energy_efficiency,
            reliability,
        }
    }
}

/// Thermal and load figures of one node partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetrics {
    pub index: usize,
    pub nodes: Vec<NodeId>,
    pub mean_temperature: f64,
    pub peak_temperature: f64,
    /// Mean utilization of links touching the partition
    pub mean_utilization: f64,
    pub failed_nodes: usize,
}

pub fn partition_metrics(network: &Network, partitions: &[Vec<NodeId>]) -> Vec<PartitionMetrics> {
    partitions
        .iter()
        .enumerate()
        .map(|(index, nodes)| {
            let temperatures: Vec<f64> = nodes.iter().filter_map(|&n| network.temperature(n)).collect();
            let utilizations: Vec<f64> = network
                .edges()
                .filter(|(u, v, _)| nodes.contains(u) || nodes.contains(v))
                .map(|(_, _, e)| e.utilization)
                .collect();
            PartitionMetrics {
                index,
                nodes: nodes.clone(),
                mean_temperature: SummaryStats::from_values(&temperatures).mean,
                peak_temperature: SummaryStats::from_values(&temperatures).max,
                mean_utilization: SummaryStats::from_values(&utilizations).mean,
                failed_nodes: nodes.iter().filter(|&&n| network.is_failed(n)).count(),
            }
        })
        .collect()
}

/// Mean, population standard deviation and range of a sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// All zeros for an empty sample.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        Self {
            count,
            mean,
            std: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baselines::BaselineSpf;
    use crate::routing::MulticastPlanner;
    use crate::Weights;

    #[test]
    fn test_wavelength_shift() {
        assert_eq!(temperature_from_wavelength_shift(0.0).unwrap(), 25.0);
        let t = temperature_from_wavelength_shift(1550.0 * 1.86e-4 * 10.0).unwrap();
        assert!((t - 35.0).abs() < 1e-9);
        assert!(matches!(
            temperature_from_wavelength_shift(-0.1),
            Err(RoutingError::InvalidWavelengthShift(_))
        ));
    }

    #[test]
    fn test_path_metrics() {
        let mut ring = Network::ring(6, 50.0, 20.0).unwrap();
        ring.set_temperature(1, 80.0).unwrap();
        ring.set_utilization(1, 2, 60.0).unwrap();
        let m = PathMetrics::compute(&ring, &[0, 1, 2, 3]).unwrap();
        assert_eq!(m.hops, 3);
        assert_eq!(m.congestion, 100.0);
        assert_eq!(m.temperature, 230.0);
        assert_eq!(m.mean_temperature, 57.5);
        assert_eq!(m.peak_temperature, 80.0);
        assert_eq!(m.peak_utilization, 60.0);
        assert!(PathMetrics::compute(&ring, &[0, 2]).is_err());
        assert_eq!(PathMetrics::compute(&ring, &[]).unwrap(), PathMetrics::default());
    }

    #[test]
    fn test_route_comparison_favors_cool_path() {
        let mut ring = Network::ring(8, 40.0, 20.0).unwrap();
        ring.set_utilization(0, 1, 95.0).unwrap();
        ring.set_utilization(1, 2, 95.0).unwrap();
        let weights = Weights::new(1.0, 0.0).unwrap();
        let weighted = MulticastPlanner::new(&ring, weights).plan(&[0], &[2]).unwrap();
        let baseline = BaselineSpf::new(&ring).chained(&[0], &[2]).unwrap();

        let cmp = RouteComparison::compare(&ring, &weighted[0], &baseline[0]).unwrap();
        assert_eq!(cmp.baseline.congestion, 190.0);
        assert_eq!(cmp.weighted.congestion, 120.0);
        assert!(cmp.congestion_reduction_pct > 36.0);
        assert_eq!(cmp.extra_hops, 4);
    }

    #[test]
    fn test_network_performance() {
        let mut ring = Network::ring(6, 50.0, 20.0).unwrap();
        ring.set_temperature(2, 90.0).unwrap();
        ring.set_utilization(3, 4, 70.0).unwrap();
        let perf = NetworkPerformance::compute(&ring, &[vec![0, 1, 2], vec![3, 4]], Some(10.0));
        assert!((perf.throughput.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(perf.latency, 2.5);
        assert_eq!(perf.energy_efficiency, 0.75);
        assert!((perf.reliability - 0.2).abs() < 1e-12);

        let idle = NetworkPerformance::compute(&ring, &[], None);
        assert_eq!(idle.latency, 0.0);
        assert_eq!(idle.energy_efficiency, 0.0);
        assert!(idle.throughput.is_none());

        // A source that reached nothing still counts toward mean length
        let partial = NetworkPerformance::compute(&ring, &[vec![0, 1, 2], vec![]], Some(0.0));
        assert_eq!(partial.latency, 1.5);
        assert!(partial.throughput.is_none());
    }

    #[test]
    fn test_partition_metrics() {
        let mut ring = Network::ring(6, 50.0, 20.0).unwrap();
        ring.set_temperature(0, 80.0).unwrap();
        ring.set_failed(0, true).unwrap();
        let parts = crate::topology::partition_nodes(6, 3).unwrap();
        let metrics = partition_metrics(&ring, &parts);
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].mean_temperature, 60.0);
        assert_eq!(metrics[0].peak_temperature, 80.0);
        assert_eq!(metrics[0].failed_nodes, 1);
        assert_eq!(metrics[1].failed_nodes, 0);
        assert_eq!(metrics[1].mean_utilization, 20.0);
    }

    #[test]
    fn test_summary_stats() {
        let stats = SummaryStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 2.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(SummaryStats::from_values(&[]), SummaryStats::default());
    }
}
