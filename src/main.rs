use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_rcpsp::ga::{Evolution, GaConfig, TracingSink};
use u_rcpsp::io::{read_def, write_params, write_solution, write_stats};
use u_rcpsp::scheduler::ScheduleKpi;

#[derive(Parser)]
#[command(
    name = "u-rcpsp",
    author,
    version,
    about = "Genetic scheduler for multi-skill resource-constrained projects"
)]
struct Cli {
    /// Instance file in iMOPSE `.def` format.
    #[arg(short, long)]
    instance: PathBuf,

    /// JSON run configuration; defaults apply to omitted keys.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving result.sol, dump.txt and params.json.
    #[arg(short, long, default_value = "_solutions")]
    output: PathBuf,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    population: Option<usize>,

    /// Evaluate fitness on all cores.
    #[arg(long)]
    parallel: bool,

    /// Append makespan, cost and precedence violations to result.sol.
    #[arg(long)]
    debug: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<GaConfig> {
    let mut config = match &cli.config {
        Some(path) => GaConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GaConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(generations) = cli.generations {
        config = config.with_generation_limit(generations);
    }
    if let Some(population) = cli.population {
        config = config.with_population_size(population);
    }
    if cli.parallel {
        config = config.with_parallel(true);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let instance = read_def(&cli.instance)
        .with_context(|| format!("loading instance {}", cli.instance.display()))?;
    info!(
        tasks = instance.task_count(),
        resources = instance.resource_count(),
        "instance loaded"
    );

    let mut evolution = Evolution::new(&instance, config.clone())?;
    let result = evolution.run(&mut TracingSink)?;

    let (outcome, schedule) = result.best.replay(&instance, &config.fitness);
    let kpi = ScheduleKpi::calculate(&schedule, &instance);

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    write_solution(
        cli.output.join("result.sol"),
        &instance,
        &outcome,
        &schedule,
        cli.debug,
    )?;
    write_stats(cli.output.join("dump.txt"), &result.stats)?;
    write_params(cli.output.join("params.json"), &config)?;

    info!(
        reason = ?result.reason,
        generations = result.generations,
        fitness = result.best_fitness,
        makespan = kpi.makespan,
        cost = kpi.total_cost,
        avg_utilization = kpi.avg_utilization,
        violations = kpi.violation_count,
        "run complete"
    );
    Ok(())
}
