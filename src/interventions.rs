//! Intervention descriptors and their validating builders.
//!
//! An `Intervention` is a time-triggered modification to simulation
//! dynamics. The type is a closed tagged enum so the engine boundary is
//! type-checked; descriptors are immutable once constructed and travel
//! inside the persisted run bundle.

use serde::{Deserialize, Serialize};

use crate::error::WhatifError;

/// Contact layers of the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactLayer {
    Household,
    School,
    Work,
    Community,
}

pub const ALL_LAYERS: [ContactLayer; 4] = [
    ContactLayer::Household,
    ContactLayer::School,
    ContactLayer::Work,
    ContactLayer::Community,
];

impl ContactLayer {
    /// Share of the base daily transmission rate carried by this layer.
    /// The four weights sum to 1.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            ContactLayer::Household => 0.40,
            ContactLayer::School => 0.20,
            ContactLayer::Work => 0.20,
            ContactLayer::Community => 0.20,
        }
    }
}

/// Fixed rollout length of a vaccination campaign, in days.
pub const VACCINE_DURATION: u32 = 7;
/// Fraction of the susceptible population the campaign aims to reach
/// over its duration.
pub const VACCINE_COVERAGE: f64 = 0.8;
/// Vaccine identity used by every campaign in the reference configuration.
pub const VACCINE_ID: &str = "pfizer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intervention {
    /// Contact-rate multiplier applied from `day` onward to the named
    /// layers, or to all layers when `layers` is `None`.
    BetaChange {
        day: u32,
        factor: f64,
        layers: Option<Vec<ContactLayer>>,
    },
    /// Probabilistic vaccination rollout starting at `start_day`. The
    /// daily-probability curve is derived by the engine from `duration`
    /// and `coverage`.
    VaccinationCampaign {
        start_day: u32,
        vaccine: String,
        duration: u32,
        coverage: f64,
    },
}

/// Builds a beta-change descriptor.
///
/// # Errors
///
/// Returns `InvalidParameter` when `factor` is outside (0, 1].
pub fn change_beta(
    day: u32,
    factor: f64,
    layers: Option<Vec<ContactLayer>>,
) -> Result<Intervention, WhatifError> {
    if !(factor > 0.0 && factor <= 1.0) {
        return Err(WhatifError::InvalidParameter(format!(
            "beta change factor must be in (0, 1], got {factor}"
        )));
    }
    Ok(Intervention::BetaChange {
        day,
        factor,
        layers,
    })
}

/// Builds a vaccination-campaign descriptor with the fixed reference
/// duration, coverage, and vaccine identity.
///
/// # Errors
///
/// Currently infallible for any `rollout_day`; returns `Result` so the
/// signature stays stable if campaign parameters become configurable.
pub fn vaccinate(rollout_day: u32) -> Result<Intervention, WhatifError> {
    vaccinate_with(rollout_day, VACCINE_ID, VACCINE_DURATION, VACCINE_COVERAGE)
}

/// # Errors
///
/// Returns `InvalidParameter` when `coverage` is outside (0, 1] or
/// `duration` is zero.
pub fn vaccinate_with(
    rollout_day: u32,
    vaccine: &str,
    duration: u32,
    coverage: f64,
) -> Result<Intervention, WhatifError> {
    if !(coverage > 0.0 && coverage <= 1.0) {
        return Err(WhatifError::InvalidParameter(format!(
            "vaccination coverage must be in (0, 1], got {coverage}"
        )));
    }
    if duration == 0 {
        return Err(WhatifError::InvalidParameter(
            "vaccination duration must be positive".to_string(),
        ));
    }
    Ok(Intervention::VaccinationCampaign {
        start_day: rollout_day,
        vaccine: vaccine.to_string(),
        duration,
        coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_weights_sum_to_one() {
        let total: f64 = ALL_LAYERS.iter().map(|layer| layer.weight()).sum();
        assert_approx_eq::assert_approx_eq!(total, 1.0);
    }

    #[test]
    fn beta_change_descriptors_differ_only_in_factor() {
        let non_strict = change_beta(21, 0.85, None).unwrap();
        let strict = change_beta(21, 0.50, None).unwrap();

        let Intervention::BetaChange {
            day: day_a,
            factor: factor_a,
            layers: layers_a,
        } = non_strict
        else {
            panic!("expected BetaChange");
        };
        let Intervention::BetaChange {
            day: day_b,
            factor: factor_b,
            layers: layers_b,
        } = strict
        else {
            panic!("expected BetaChange");
        };

        assert_eq!(day_a, day_b);
        assert_eq!(layers_a, layers_b);
        assert_approx_eq::assert_approx_eq!(factor_a, 0.85);
        assert_approx_eq::assert_approx_eq!(factor_b, 0.50);
    }

    #[test]
    fn rejects_factor_outside_unit_interval() {
        assert!(change_beta(21, 0.0, None).is_err());
        assert!(change_beta(21, 1.5, None).is_err());
        assert!(change_beta(21, -0.85, None).is_err());
        assert!(change_beta(21, 1.0, None).is_ok());
    }

    #[test]
    fn vaccinate_uses_reference_campaign_constants() {
        let campaign = vaccinate(21).unwrap();
        assert_eq!(
            campaign,
            Intervention::VaccinationCampaign {
                start_day: 21,
                vaccine: "pfizer".to_string(),
                duration: 7,
                coverage: 0.8,
            }
        );
    }

    #[test]
    fn rejects_bad_campaign_parameters() {
        assert!(vaccinate_with(21, "pfizer", 0, 0.8).is_err());
        assert!(vaccinate_with(21, "pfizer", 7, 0.0).is_err());
        assert!(vaccinate_with(21, "pfizer", 7, 1.2).is_err());
    }
}
