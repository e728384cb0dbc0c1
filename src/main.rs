use std::path::PathBuf;

use clap::Parser;

use whatif::params::BaseParameters;
use whatif::run::{run_scenario, RunOptions, DEFAULT_N_RUNS, DEFAULT_OUTPUT_DIR};
use whatif::scenarios::ScenarioRegistry;

#[derive(Parser, Debug)]
#[command(name = "whatif", about = "Run one intervention scenario as a replicate ensemble")]
struct Args {
    /// Scenario name to run
    #[arg(short, long)]
    scenario: String,

    /// Number of stochastic replicates
    #[arg(short, long, default_value_t = DEFAULT_N_RUNS)]
    n_runs: u32,

    /// Directory for run artifacts
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Optional path to a JSON file overriding base parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed; overrides the config file's seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut base = match &args.config {
        Some(path) => BaseParameters::from_json_file(path)?,
        None => BaseParameters::default(),
    };
    if let Some(seed) = args.seed {
        base.rand_seed = seed;
    }

    let registry = ScenarioRegistry::standard();
    let options = RunOptions {
        n_runs: args.n_runs,
        output_dir: args.output_dir,
    };

    run_scenario(&registry, &base, &args.scenario, &options)?;
    Ok(())
}
