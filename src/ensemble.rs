//! Replicate ensembles: running, median reduction, run-bundle
//! persistence, tabular export, and merging with source-group retention.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::WhatifError;
use crate::params::SimConfig;
use crate::sim::{Sim, Trajectory};

/// File extension of a persisted run bundle.
pub const BUNDLE_EXTENSION: &str = "sim";

/// An ensemble of stochastic replicates run under one configuration,
/// plus the derived median trajectory once reduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    pub config: SimConfig,
    pub replicates: Vec<Trajectory>,
    pub median: Option<Trajectory>,
}

impl Ensemble {
    /// Runs `n_runs` replicates sequentially. The engine owns
    /// per-replicate seeding; callers only choose the count.
    #[must_use]
    pub fn run(config: SimConfig, n_runs: u32) -> Self {
        let mut replicates = Vec::with_capacity(n_runs as usize);
        for replicate in 0..n_runs {
            debug!("running replicate {}/{}", replicate + 1, n_runs);
            replicates.push(Sim::new(&config, replicate).run());
        }
        Ensemble {
            config,
            replicates,
            median: None,
        }
    }

    /// Reduces the ensemble to its elementwise per-day median trajectory
    /// and stores it on the ensemble. A no-op on an empty ensemble.
    pub fn reduce_median(&mut self) {
        if self.replicates.is_empty() {
            return;
        }
        let days = self.replicates[0].len();
        let mut median = Trajectory {
            day: self.replicates[0].day.clone(),
            n_susceptible: Vec::with_capacity(days),
            n_infectious: Vec::with_capacity(days),
            n_recovered: Vec::with_capacity(days),
            n_vaccinated: Vec::with_capacity(days),
            new_infections: Vec::with_capacity(days),
            cum_infections: Vec::with_capacity(days),
        };
        for index in 0..days {
            median
                .n_susceptible
                .push(column_median(&self.replicates, |t| t.n_susceptible[index]));
            median
                .n_infectious
                .push(column_median(&self.replicates, |t| t.n_infectious[index]));
            median
                .n_recovered
                .push(column_median(&self.replicates, |t| t.n_recovered[index]));
            median
                .n_vaccinated
                .push(column_median(&self.replicates, |t| t.n_vaccinated[index]));
            median
                .new_infections
                .push(column_median(&self.replicates, |t| t.new_infections[index]));
            median
                .cum_infections
                .push(column_median(&self.replicates, |t| t.cum_infections[index]));
        }
        self.median = Some(median);
    }

    /// Serializes the ensemble to a run bundle.
    ///
    /// # Errors
    ///
    /// Returns a `WhatifError` on file-creation or encoding failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WhatifError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        info!("saved run bundle to {}", path.as_ref().display());
        Ok(())
    }

    /// Loads a previously saved run bundle.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be opened, or `DecodeError`
    /// naming the path if its contents are not a valid bundle.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WhatifError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard()).map_err(
            |source| WhatifError::DecodeError {
                path: path.as_ref().to_path_buf(),
                source,
            },
        )
    }

    /// Writes the ensemble as a long-format CSV: one row per replicate
    /// per day, with the median rows last.
    ///
    /// # Errors
    ///
    /// Returns a `WhatifError` on file-creation or write failure.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), WhatifError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for (index, trajectory) in self.replicates.iter().enumerate() {
            write_trajectory_rows(&mut writer, &index.to_string(), trajectory)?;
        }
        if let Some(median) = &self.median {
            write_trajectory_rows(&mut writer, "median", median)?;
        }
        writer.flush().map_err(WhatifError::IoError)?;
        Ok(())
    }

    /// Merges ensembles into one combined structure, retaining each
    /// source as a distinguishable group.
    ///
    /// # Errors
    ///
    /// Returns an error when `sources` is empty; an empty comparison
    /// would misrepresent "nothing ran" as a result.
    pub fn merge(sources: Vec<Ensemble>) -> Result<MergedEnsemble, WhatifError> {
        if sources.is_empty() {
            return Err(WhatifError::from("no ensembles to merge"));
        }
        Ok(MergedEnsemble { sources })
    }
}

/// A combined ensemble built from several run bundles. Each source keeps
/// its identity so comparison plots can color per source scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEnsemble {
    pub sources: Vec<Ensemble>,
}

impl MergedEnsemble {
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.sources
            .iter()
            .map(|source| source.config.label.as_str())
            .collect()
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    replicate: &'a str,
    day: u32,
    n_susceptible: u64,
    n_infectious: u64,
    n_recovered: u64,
    n_vaccinated: u64,
    new_infections: u64,
    cum_infections: u64,
}

fn write_trajectory_rows(
    writer: &mut csv::Writer<File>,
    replicate: &str,
    trajectory: &Trajectory,
) -> Result<(), WhatifError> {
    for index in 0..trajectory.len() {
        writer.serialize(CsvRow {
            replicate,
            day: trajectory.day[index],
            n_susceptible: trajectory.n_susceptible[index],
            n_infectious: trajectory.n_infectious[index],
            n_recovered: trajectory.n_recovered[index],
            n_vaccinated: trajectory.n_vaccinated[index],
            new_infections: trajectory.new_infections[index],
            cum_infections: trajectory.cum_infections[index],
        })?;
    }
    Ok(())
}

/// Median of one per-day column across replicates. Even-sized ensembles
/// take the mean of the two middle values.
fn column_median<F: Fn(&Trajectory) -> u64>(replicates: &[Trajectory], column: F) -> u64 {
    let mut values: Vec<u64> = replicates.iter().map(column).collect();
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        values[mid - 1].midpoint(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BaseParameters;

    fn tiny_config() -> SimConfig {
        SimConfig::new(
            "test",
            BaseParameters {
                pop_size: 500,
                pop_infected: 5,
                start_day: "2025-01-01".to_string(),
                n_days: 20,
                rand_seed: 4,
            },
            vec![],
        )
    }

    #[test]
    fn run_produces_requested_replicates() {
        let ensemble = Ensemble::run(tiny_config(), 3);
        assert_eq!(ensemble.replicates.len(), 3);
        assert!(ensemble.median.is_none());
    }

    #[test]
    fn median_has_full_horizon() {
        let mut ensemble = Ensemble::run(tiny_config(), 4);
        ensemble.reduce_median();
        let median = ensemble.median.as_ref().unwrap();
        assert_eq!(median.len(), 21);
    }

    #[test]
    fn column_median_odd_and_even() {
        let mut ensemble = Ensemble::run(tiny_config(), 3);
        // Rig a known column for the median.
        for (value, trajectory) in [30u64, 10, 20].iter().zip(&mut ensemble.replicates) {
            trajectory.n_infectious[0] = *value;
        }
        assert_eq!(column_median(&ensemble.replicates, |t| t.n_infectious[0]), 20);

        ensemble.replicates.push(ensemble.replicates[0].clone());
        ensemble.replicates[3].n_infectious[0] = 40;
        assert_eq!(column_median(&ensemble.replicates, |t| t.n_infectious[0]), 25);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.sim");
        let mut ensemble = Ensemble::run(tiny_config(), 2);
        ensemble.reduce_median();
        ensemble.save(&path).unwrap();

        let loaded = Ensemble::load(&path).unwrap();
        assert_eq!(loaded, ensemble);
    }

    #[test]
    fn load_corrupt_bundle_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.sim");
        std::fs::write(&path, b"not a bundle").unwrap();

        let error = Ensemble::load(&path).unwrap_err();
        assert!(matches!(error, WhatifError::DecodeError { .. }));
        assert!(error.to_string().contains("corrupt.sim"));
    }

    #[test]
    fn csv_export_covers_replicates_and_median() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut ensemble = Ensemble::run(tiny_config(), 2);
        ensemble.reduce_median();
        ensemble.write_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let replicates: Vec<String> = reader
            .records()
            .map(|record| record.unwrap()[0].to_string())
            .collect();
        // 2 replicates + median, 21 days each.
        assert_eq!(replicates.len(), 3 * 21);
        assert_eq!(replicates.iter().filter(|r| *r == "median").count(), 21);
    }

    #[test]
    fn merge_retains_source_groups() {
        let first = Ensemble::run(tiny_config(), 2);
        let mut second_config = tiny_config();
        second_config.label = "other".to_string();
        let second = Ensemble::run(second_config, 2);

        let merged = Ensemble::merge(vec![first, second]).unwrap();
        assert_eq!(merged.group_count(), 2);
        assert_eq!(merged.labels(), vec!["test", "other"]);
    }

    #[test]
    fn merge_of_nothing_is_an_error() {
        let result = Ensemble::merge(vec![]);
        assert!(result.is_err());
    }
}
