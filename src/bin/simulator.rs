//! TempCon Simulator
//!
//! Builds a seeded ring network, applies an optional stress scenario, runs
//! the discrete-event simulation and compares weighted routing against the
//! shortest-path baseline.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tempcon::config::SimulationConfig;
use tempcon::logging::init_logging;
use tempcon::report::ComparisonReport;
use tempcon::scenarios::Scenario;
use tempcon::simulation::Simulation;
use tempcon::topology::{create_ring_topology, partition_nodes};

/// Command-line overrides, applied on top of the config file
#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    nodes: Option<usize>,
    seed: Option<u64>,
    scenario: Option<Scenario>,
    output: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    parallel: bool,
}

fn flag_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args
        .get(i + 1)
        .ok_or_else(|| format!("{} expects a value", flag))?;
    raw.parse()
        .map_err(|_| format!("invalid value '{}' for {}", raw, flag))
}

fn print_usage() {
    println!("Usage: simulator [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config FILE     JSON configuration file");
    println!("  -n, --nodes NUM       Number of ring nodes (default: 20)");
    println!("      --seed NUM        Random seed (default: 42)");
    println!("  -s, --scenario NAME   high_stress, hotspots, dynamic_load, fault_injection (or 1-4)");
    println!("  -o, --output FILE     Write the JSON report to FILE");
    println!("      --log-dir DIR     Also log JSON lines to DIR/simulation.log");
    println!("  -p, --parallel        Plan independent sources in parallel");
    println!("  -h, --help            Show this help");
}

/// `Ok(None)` when only help was requested
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                options.config_path = Some(flag_value(args, i, "--config")?);
                i += 1;
            }
            "--nodes" | "-n" => {
                options.nodes = Some(flag_value(args, i, "--nodes")?);
                i += 1;
            }
            "--seed" => {
                options.seed = Some(flag_value(args, i, "--seed")?);
                i += 1;
            }
            "--scenario" | "-s" => {
                options.scenario = Some(flag_value(args, i, "--scenario")?);
                i += 1;
            }
            "--output" | "-o" => {
                options.output = Some(flag_value(args, i, "--output")?);
                i += 1;
            }
            "--log-dir" => {
                options.log_dir = Some(flag_value(args, i, "--log-dir")?);
                i += 1;
            }
            "--parallel" | "-p" => {
                options.parallel = true;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
        i += 1;
    }
    Ok(Some(options))
}

fn load_config(options: Options) -> tempcon::Result<SimulationConfig> {
    let mut config = match &options.config_path {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(nodes) = options.nodes {
        config.num_nodes = nodes;
    }
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if options.scenario.is_some() {
        config.scenario = options.scenario;
    }
    if options.output.is_some() {
        config.output = options.output;
    }
    if options.log_dir.is_some() {
        config.log_dir = options.log_dir;
    }
    config.parallel |= options.parallel;
    Ok(config)
}

fn run(config: SimulationConfig) -> tempcon::Result<()> {
    let _guard = init_logging(config.log_dir.as_deref())?;
    let weights = config.validate()?;

    println!("Configuration:");
    println!("  Nodes:     {}", config.num_nodes);
    println!("  Weights:   {}", weights);
    println!("  Sources:   {:?}", config.sources);
    println!("  Targets:   {:?}", config.targets);
    println!("  Seed:      {}", config.seed);
    println!(
        "  Scenario:  {}",
        config
            .scenario
            .map_or_else(|| "none".to_string(), |s| s.to_string())
    );
    println!();

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut network = create_ring_topology(&config.topology(), &mut rng)?;
    if let Some(scenario) = config.scenario {
        scenario.apply(&mut network, &mut rng)?;
    }
    let partitions = partition_nodes(config.num_nodes, config.partition_size)?;

    let outcome = Simulation::new(&network, weights, config.simulation_params(), &mut rng)
        .run(&config.sources, &config.targets)?;

    let report = ComparisonReport::build(
        &network,
        weights,
        &config.sources,
        &config.targets,
        &partitions,
        config.parallel,
    )?
    .with_scenario(config.scenario)
    .with_simulation(&outcome);

    println!("{}", report);
    println!("Completed in {} ms", start.elapsed().as_millis());

    if let Some(path) = &config.output {
        report.write_json(path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn main() {
    println!("TempCon Simulator");
    println!("=================\n");

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = load_config(options).and_then(run) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
