//! The run driver: resolve a scenario, run its ensemble, and persist the
//! three artifacts (run bundle, CSV export, plot image).

use std::fs::create_dir_all;
use std::path::PathBuf;
use std::time::{Instant, SystemTime};

use log::info;

use crate::ensemble::{Ensemble, BUNDLE_EXTENSION};
use crate::error::WhatifError;
use crate::params::{BaseParameters, SimConfig};
use crate::plot::plot_ensemble;
use crate::scenarios::ScenarioRegistry;

/// Conventional output directory for run artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "Saved_Sims";
/// Reference ensemble size.
pub const DEFAULT_N_RUNS: u32 = 100;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub n_runs: u32,
    pub output_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            n_runs: DEFAULT_N_RUNS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// The three files one scenario run leaves behind. A run either produces
/// all three or fails; there is no partial-success state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub bundle: PathBuf,
    pub table: PathBuf,
    pub image: PathBuf,
}

/// Runs one scenario end to end and persists its artifacts.
///
/// # Errors
///
/// Returns `UnknownScenario` for an unregistered name and propagates any
/// persistence failure; nothing is retried.
pub fn run_scenario(
    registry: &ScenarioRegistry,
    base: &BaseParameters,
    scenario_name: &str,
    options: &RunOptions,
) -> Result<ArtifactSet, WhatifError> {
    let scenario = registry.lookup(scenario_name)?;
    base.validate()?;

    let config = SimConfig::new(&scenario.label, base.clone(), scenario.interventions.clone());

    info!(
        "running scenario '{}' with {} replicates",
        scenario_name, options.n_runs
    );
    let started = Instant::now();
    let mut ensemble = Ensemble::run(config, options.n_runs);
    let elapsed = started.elapsed();

    ensemble.reduce_median();

    // Timestamp granularity is one second; two concurrent runs of the
    // same scenario within the same second would collide. Known
    // limitation.
    let stem = artifact_stem(scenario_name, SystemTime::now());

    create_dir_all(&options.output_dir)?;
    let bundle = options
        .output_dir
        .join(format!("{stem}.{BUNDLE_EXTENSION}"));
    let table = options.output_dir.join(format!("{stem}.csv"));
    let image = options.output_dir.join(format!("{stem}.png"));

    ensemble.save(&bundle)?;
    ensemble.write_csv(&table)?;
    plot_ensemble(&ensemble, &image)?;

    println!("Finished scenario: {scenario_name}");
    println!(
        "Total simulation time: {}",
        humantime::format_duration(elapsed)
    );

    Ok(ArtifactSet {
        bundle,
        table,
        image,
    })
}

/// Filesystem-safe artifact base name:
/// `Simulation_<scenario>_<YYYY-MM-DD>_at_<HH-MM-SS>`.
fn artifact_stem(scenario_name: &str, completed_at: SystemTime) -> String {
    // humantime renders e.g. "2025-01-31T12:04:05Z".
    let rfc3339 = humantime::format_rfc3339_seconds(completed_at).to_string();
    let timestamp = rfc3339
        .trim_end_matches('Z')
        .replace('T', "_at_")
        .replace(':', "-");
    format!(
        "Simulation_{}_{}",
        scenario_name.replace(' ', "_"),
        timestamp
    )
}
