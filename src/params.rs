//! Base simulation parameters and the merged per-run configuration.
//!
//! `BaseParameters` holds the constants shared by every scenario in an
//! execution. Defaults match the reference configuration; individual
//! fields can be overridden from a JSON file, so a config of
//! `{"pop_size": 500, "n_days": 30}` keeps the defaults for everything
//! else.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WhatifError;
use crate::interventions::Intervention;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseParameters {
    /// Total population size.
    #[serde(default = "default_pop_size")]
    pub pop_size: u64,
    /// Number of people infected on day 0.
    #[serde(default = "default_pop_infected")]
    pub pop_infected: u64,
    /// Calendar date of day 0 (ISO-8601), carried through to exports.
    #[serde(default = "default_start_day")]
    pub start_day: String,
    /// Simulation horizon in days.
    #[serde(default = "default_n_days")]
    pub n_days: u32,
    /// Base random seed; per-replicate seeds are derived from it.
    #[serde(default = "default_rand_seed")]
    pub rand_seed: u64,
}

fn default_pop_size() -> u64 {
    218_000
}

fn default_pop_infected() -> u64 {
    100
}

fn default_start_day() -> String {
    "2025-01-01".to_string()
}

fn default_n_days() -> u32 {
    365
}

fn default_rand_seed() -> u64 {
    4
}

impl Default for BaseParameters {
    fn default() -> Self {
        BaseParameters {
            pop_size: default_pop_size(),
            pop_infected: default_pop_infected(),
            start_day: default_start_day(),
            n_days: default_n_days(),
            rand_seed: default_rand_seed(),
        }
    }
}

impl BaseParameters {
    /// Loads parameter overrides from a JSON file; fields absent from the
    /// file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `WhatifError` if the file cannot be read, does not parse,
    /// or fails validation.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, WhatifError> {
        let file = File::open(path.as_ref())?;
        let parameters: BaseParameters = serde_json::from_reader(BufReader::new(file))?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty population, more initial
    /// infections than people, or a zero-day horizon.
    pub fn validate(&self) -> Result<(), WhatifError> {
        if self.pop_size == 0 {
            return Err(WhatifError::InvalidParameter(
                "pop_size must be positive".to_string(),
            ));
        }
        if self.pop_infected > self.pop_size {
            return Err(WhatifError::InvalidParameter(format!(
                "pop_infected ({}) exceeds pop_size ({})",
                self.pop_infected, self.pop_size
            )));
        }
        if self.n_days == 0 {
            return Err(WhatifError::InvalidParameter(
                "n_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The full configuration for one ensemble run: base parameters plus the
/// scenario's intervention list. Built once by the run driver and never
/// mutated afterward; persisted inside the run bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Display label for plots (the scenario's label).
    pub label: String,
    pub base: BaseParameters,
    pub interventions: Vec<Intervention>,
}

impl SimConfig {
    pub fn new(label: &str, base: BaseParameters, interventions: Vec<Intervention>) -> Self {
        SimConfig {
            label: label.to_string(),
            base,
            interventions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_configuration() {
        let base = BaseParameters::default();
        assert_eq!(base.pop_size, 218_000);
        assert_eq!(base.pop_infected, 100);
        assert_eq!(base.start_day, "2025-01-01");
        assert_eq!(base.n_days, 365);
        assert_eq!(base.rand_seed, 4);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pars.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"pop_size": 500, "n_days": 30}}"#).unwrap();

        let base = BaseParameters::from_json_file(&path).unwrap();
        assert_eq!(base.pop_size, 500);
        assert_eq!(base.n_days, 30);
        assert_eq!(base.pop_infected, 100);
        assert_eq!(base.rand_seed, 4);
    }

    #[test]
    fn rejects_infected_exceeding_population() {
        let base = BaseParameters {
            pop_size: 10,
            pop_infected: 11,
            ..BaseParameters::default()
        };
        let result = base.validate();
        assert!(matches!(result, Err(WhatifError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_zero_horizon() {
        let base = BaseParameters {
            n_days: 0,
            ..BaseParameters::default()
        };
        assert!(base.validate().is_err());
    }

    #[test]
    fn unreadable_config_file_errors() {
        let result = BaseParameters::from_json_file("no/such/file.json");
        assert!(matches!(result, Err(WhatifError::IoError(_))));
    }
}
