use std::path::PathBuf;

use clap::Parser;

use whatif::merge::{merge_and_plot, MERGED_IMAGE};
use whatif::run::DEFAULT_OUTPUT_DIR;

#[derive(Parser, Debug)]
#[command(
    name = "whatif-merge",
    about = "Merge every saved run bundle into one comparison plot"
)]
struct Args {
    /// Directory holding the run bundles
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    dir: PathBuf,

    /// Path of the combined comparison image
    #[arg(short, long, default_value = MERGED_IMAGE)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let merged = merge_and_plot(&args.dir, &args.output)?;
    println!(
        "Merged {} run bundles into {}",
        merged.group_count(),
        args.output.display()
    );
    Ok(())
}
