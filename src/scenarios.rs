//! The scenario registry: a fixed, read-only table mapping scenario names
//! to intervention lists and display labels.
//!
//! The registry is constructed once at process start and passed by
//! reference to the run driver; there is no mutation API.

use crate::error::WhatifError;
use crate::interventions::{change_beta, vaccinate, Intervention};

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Unique registry key.
    pub name: String,
    /// Display string used for plot legends and sim labels.
    pub label: String,
    /// Ordered intervention list applied on top of the base parameters.
    pub interventions: Vec<Intervention>,
}

pub struct ScenarioRegistry {
    scenarios: Vec<Scenario>,
}

impl ScenarioRegistry {
    /// Builds the standard scenario table: baseline, two masking levels,
    /// two vaccination timings, and one combination.
    #[must_use]
    pub fn standard() -> Self {
        let mask_non_strict =
            change_beta(21, 0.85, None).expect("mask factor is in range");
        let mask_strict = change_beta(21, 0.50, None).expect("mask factor is in range");
        let early_vaccine = vaccinate(21).expect("campaign constants are in range");
        let late_vaccine = vaccinate(42).expect("campaign constants are in range");

        let scenarios = vec![
            Scenario {
                name: "Baseline".to_string(),
                label: "Baseline".to_string(),
                interventions: vec![],
            },
            Scenario {
                name: "Mask(non-strict)".to_string(),
                label: "Mask (non-strict)".to_string(),
                interventions: vec![mask_non_strict.clone()],
            },
            Scenario {
                name: "Mask(strict)".to_string(),
                label: "Mask (strict)".to_string(),
                interventions: vec![mask_strict],
            },
            Scenario {
                name: "Vaccine(early)".to_string(),
                label: "Vaccine (early)".to_string(),
                interventions: vec![early_vaccine],
            },
            Scenario {
                name: "Vaccine(late)".to_string(),
                label: "Vaccine (late)".to_string(),
                interventions: vec![late_vaccine.clone()],
            },
            Scenario {
                name: "Mask(non-strict),Vaccine(late)".to_string(),
                label: "Mask (non-strict), Vaccine (late)".to_string(),
                interventions: vec![mask_non_strict, late_vaccine],
            },
        ];

        ScenarioRegistry { scenarios }
    }

    /// Resolves a scenario by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownScenario`, enumerating every registered key, when
    /// `name` is not in the table.
    pub fn lookup(&self, name: &str) -> Result<&Scenario, WhatifError> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| WhatifError::UnknownScenario {
                name: name.to_string(),
                valid: self.names().iter().map(ToString::to_string).collect(),
            })
    }

    /// Registered scenario keys, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scenarios
            .iter()
            .map(|scenario| scenario.name.as_str())
            .collect()
    }
}
