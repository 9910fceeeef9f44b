//! End-to-end routing scenarios
//!
//! Fixed rings with known answers, disconnected batches, and the full
//! config → topology → scenario → report pipeline.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempcon::baselines::BaselineSpf;
use tempcon::config::SimulationConfig;
use tempcon::report::ComparisonReport;
use tempcon::routing::{select_direction, MulticastPlanner};
use tempcon::scenarios::Scenario;
use tempcon::scoring::path_score_raw;
use tempcon::search::find_best_path;
use tempcon::simulation::Simulation;
use tempcon::topology::{create_ring_topology, partition_nodes};
use tempcon::{Network, RoutingError, Weights};

fn uniform_ring() -> Network {
    Network::ring(6, 50.0, 20.0).unwrap()
}

/// Ring of six split into {5, 0, 1} and {2, 3, 4}
fn split_ring() -> Network {
    let mut net = uniform_ring();
    net.remove_edge(1, 2).unwrap();
    net.remove_edge(4, 5).unwrap();
    net
}

#[test]
fn test_uniform_ring_forward_tie_break() {
    let ring = uniform_ring();
    let weights = Weights::new(0.6, 0.4).unwrap();

    let route = select_direction(&ring, 0, 3, &weights).unwrap().unwrap();
    assert_eq!(route.path, vec![0, 1, 2, 3]);
    assert!((route.score - 0.85).abs() < 1e-12);

    let reverse_arc = path_score_raw(&ring, &[0, 5, 4, 3], 0.6, 0.4).unwrap();
    assert!((reverse_arc - route.score).abs() < 1e-12);
}

#[test]
fn test_baseline_unit_weights() {
    let mut ring = uniform_ring();
    for i in 0..6 {
        ring.set_weight(i, (i + 1) % 6, Some(1.0)).unwrap();
    }
    let pairs = BaselineSpf::new(&ring).shortest_paths(&[0], &[3]).unwrap();
    let route = pairs[0].route.as_ref().unwrap();
    assert_eq!(route.path, vec![0, 1, 2, 3]);
    assert_eq!(route.score, 3.0);
}

#[test]
fn test_disconnected_pairs_isolated_in_batch() {
    let net = split_ring();
    let weights = Weights::new(0.6, 0.4).unwrap();

    assert!(find_best_path(&net, 0, 3, &weights).unwrap().is_none());
    assert!(select_direction(&net, 0, 3, &weights).unwrap().is_none());

    let pairs = BaselineSpf::new(&net).shortest_paths(&[0, 3], &[1, 4]).unwrap();
    assert_eq!(pairs.len(), 4);
    assert_eq!(pairs[0].route.as_ref().unwrap().path, vec![0, 1]);
    assert!(pairs[1].route.is_none());
    assert!(pairs[2].route.is_none());
    assert_eq!(pairs[3].route.as_ref().unwrap().path, vec![3, 4]);

    let plans = MulticastPlanner::new(&net, weights).plan(&[0, 3], &[1, 4]).unwrap();
    assert_eq!(plans[0].visit_order, vec![1]);
    assert_eq!(plans[0].unreached, vec![4]);
    assert_eq!(plans[1].visit_order, vec![4]);
    assert_eq!(plans[1].unreached, vec![1]);
}

#[test]
fn test_batch_validation_happens_before_search() {
    let ring = uniform_ring();
    let weights = Weights::new(0.5, 0.5).unwrap();
    let result = MulticastPlanner::new(&ring, weights).plan(&[0, 1], &[2, 6]);
    assert!(matches!(
        result,
        Err(RoutingError::OutOfRangeNode { node: 6, num_nodes: 6 })
    ));
    assert!(matches!(
        Weights::new(0.6, 0.6),
        Err(RoutingError::InvalidWeight { .. })
    ));
}

#[test]
fn test_pipeline_for_every_scenario() {
    let scenarios = [
        Scenario::HighStress,
        Scenario::Hotspots,
        Scenario::DynamicLoad,
        Scenario::FaultInjection,
    ];
    for scenario in scenarios {
        let config = SimulationConfig {
            scenario: Some(scenario),
            max_events: 50,
            ..Default::default()
        };
        let weights = config.validate().unwrap();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut network = create_ring_topology(&config.topology(), &mut rng).unwrap();
        scenario.apply(&mut network, &mut rng).unwrap();
        let partitions = partition_nodes(config.num_nodes, config.partition_size).unwrap();

        let outcome = Simulation::new(&network, weights, config.simulation_params(), &mut rng)
            .run(&config.sources, &config.targets)
            .unwrap();
        let report = ComparisonReport::build(
            &network,
            weights,
            &config.sources,
            &config.targets,
            &partitions,
            false,
        )
        .unwrap()
        .with_scenario(config.scenario)
        .with_simulation(&outcome);

        // Failed nodes stay traversable, so every target is reached
        for route in report.tempcon_routes.iter().chain(&report.spf_routes) {
            assert!(route.is_complete(), "{} left targets unreached", scenario);
        }
        assert_eq!(report.partitions.len(), 4);
        assert!(outcome.events_processed <= 50);
    }
}

#[test]
fn test_pipeline_is_reproducible() {
    let run = |seed: u64| {
        let config = SimulationConfig {
            seed,
            scenario: Some(Scenario::DynamicLoad),
            ..Default::default()
        };
        let weights = config.validate().unwrap();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut network = create_ring_topology(&config.topology(), &mut rng).unwrap();
        Scenario::DynamicLoad.apply(&mut network, &mut rng).unwrap();
        ComparisonReport::build(&network, weights, &config.sources, &config.targets, &[], true)
            .unwrap()
    };

    let first = run(7);
    let second = run(7);
    assert_eq!(first.tempcon_routes, second.tempcon_routes);
    assert_eq!(first.spf_routes, second.spf_routes);
    assert_eq!(first.comparisons, second.comparisons);
}

#[test]
fn test_report_written_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let report_path = dir.path().join("report.json");
    std::fs::write(
        &config_path,
        r#"{"num_nodes": 12, "partition_size": 3, "sources": [0], "targets": [4, 8], "wc": 0.5, "wt": 0.5}"#,
    )
    .unwrap();

    let config = SimulationConfig::from_file(&config_path).unwrap();
    let weights = config.validate().unwrap();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let network = create_ring_topology(&config.topology(), &mut rng).unwrap();
    let partitions = partition_nodes(config.num_nodes, config.partition_size).unwrap();

    let report = ComparisonReport::build(&network, weights, &config.sources, &config.targets, &partitions, false)
        .unwrap();
    report.write_json(&report_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["num_nodes"], 12);
    assert_eq!(json["tempcon_routes"][0]["source"], 0);
    assert_eq!(json["partitions"].as_array().unwrap().len(), 4);
}
