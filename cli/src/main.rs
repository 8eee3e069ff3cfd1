//! Command-line runner for the container terminal simulation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use terminal_simulator_core_rs::{
    AdmissionPolicy, ContainerCount, InterArrival, Orchestrator, SimulationOutcome, TerminalConfig,
};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Discrete-event simulation of a container terminal")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run length in time units
    #[arg(long)]
    horizon: Option<f64>,

    #[arg(long)]
    berths: Option<usize>,

    #[arg(long)]
    cranes: Option<usize>,

    /// Crane index per berth, comma separated (e.g. 0,0)
    #[arg(long, value_delimiter = ',')]
    crane_assignment: Option<Vec<usize>>,

    #[arg(long)]
    trucks: Option<usize>,

    /// Mean of the exponential inter-arrival gap
    #[arg(long, conflicts_with = "arrival_interval")]
    mean_interarrival: Option<f64>,

    /// Fixed inter-arrival gap instead of an exponential one
    #[arg(long)]
    arrival_interval: Option<f64>,

    #[arg(long)]
    crane_cycle: Option<f64>,

    #[arg(long)]
    transport: Option<f64>,

    /// Fixed number of containers per vessel
    #[arg(long, conflicts_with_all = ["containers_min", "containers_max"])]
    containers: Option<u32>,

    /// Lower bound of a uniform container count (requires --containers-max)
    #[arg(long, requires = "containers_max")]
    containers_min: Option<u32>,

    #[arg(long, requires = "containers_min")]
    containers_max: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// What happens to an arrival that finds every berth occupied
    #[arg(long, value_enum)]
    admission: Option<Admission>,

    /// Stop generating arrivals after this many
    #[arg(long)]
    max_arrivals: Option<u64>,

    /// Print the full outcome as JSON instead of the event log
    #[arg(long)]
    json: bool,

    /// Only print the summary
    #[arg(long, conflicts_with = "json")]
    summary_only: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Admission {
    Drop,
    Queue,
}

impl From<Admission> for AdmissionPolicy {
    fn from(value: Admission) -> Self {
        match value {
            Admission::Drop => AdmissionPolicy::Drop,
            Admission::Queue => AdmissionPolicy::Queue,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = build_config(&args)?;
    debug!(?config, "resolved config");

    let outcome = Orchestrator::new(config)
        .context("failed to assemble terminal")?
        .run()
        .context("simulation failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).context("failed to serialize outcome")?;
        println!("{json}");
        return Ok(());
    }

    if !args.summary_only {
        for line in outcome.event_log.render() {
            println!("{line}");
        }
        println!();
    }
    print_summary(&outcome);

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so stdout stays the event log.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> Result<TerminalConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn build_config(args: &Args) -> Result<TerminalConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TerminalConfig::default(),
    };

    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(berths) = args.berths {
        config.berth_count = berths;
    }
    if let Some(cranes) = args.cranes {
        config.crane_count = cranes;
    }
    if let Some(assignment) = &args.crane_assignment {
        config.crane_assignment = assignment.clone();
    }
    if let Some(trucks) = args.trucks {
        config.truck_capacity = trucks;
    }
    if let Some(mean) = args.mean_interarrival {
        config.inter_arrival = InterArrival::Exponential { mean };
    }
    if let Some(interval) = args.arrival_interval {
        config.inter_arrival = InterArrival::Fixed { interval };
    }
    if let Some(delay) = args.crane_cycle {
        config.crane_cycle_delay = delay;
    }
    if let Some(delay) = args.transport {
        config.transport_delay = delay;
    }
    if let Some(count) = args.containers {
        config.containers = ContainerCount::Fixed { count };
    }
    match (args.containers_min, args.containers_max) {
        (Some(min), Some(max)) => config.containers = ContainerCount::Uniform { min, max },
        (None, None) => {}
        _ => bail!("--containers-min and --containers-max must be given together"),
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    if let Some(admission) = args.admission {
        config.admission = admission.into();
    }
    if args.max_arrivals.is_some() {
        config.max_arrivals = args.max_arrivals;
    }

    Ok(config)
}

fn print_summary(outcome: &SimulationOutcome) {
    let report = &outcome.report;

    println!("end time:               {}", report.end_time);
    println!("events dispatched:      {}", report.events_dispatched);
    println!("vessels departed:       {}", outcome.vessels_departed());
    println!("arrivals dropped:       {}", outcome.arrivals_dropped());
    println!("containers transported: {}", outcome.containers_transported());
    println!("live processes:         {}", report.live_processes);

    for pool in &report.pools {
        println!(
            "  {:<10} capacity {:>2}  held {:>2}  waiting {:>2}  grants {:>5}  delayed {:>5}",
            pool.name,
            pool.capacity,
            pool.held,
            pool.waiting,
            pool.stats.grants,
            pool.stats.delayed_grants
        );
    }

    if !report.starved.is_empty() {
        warn!(count = report.starved.len(), "processes still waiting at the horizon");
        for starved in &report.starved {
            println!(
                "  starved: {} ({}) waiting on {} at position {}",
                starved.name, starved.process, starved.pool, starved.position
            );
        }
    }

    println!("event log digest:       {}", outcome.event_log.digest());
    println!("config hash:            {}", outcome.config_hash);
}
