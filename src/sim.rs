//! The stochastic epidemic engine: a daily-step compartmental S/I/R/V
//! model with contact layers, beta-change events, and probabilistic
//! vaccination rollouts.
//!
//! One `Sim` produces one replicate trajectory. Per-replicate seeding is
//! owned here: replicate `k` runs on an rng seeded from a hash of the
//! base seed and `k`, so replicates are decorrelated but the whole
//! ensemble is reproducible from the base seed alone.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::interventions::{ContactLayer, Intervention, ALL_LAYERS};
use crate::params::SimConfig;

/// Base daily transmission rate summed over all contact layers.
pub const BASE_BETA: f64 = 0.25;
/// Mean infectious period in days; daily recovery probability is its
/// reciprocal.
pub const INFECTIOUS_PERIOD_DAYS: f64 = 7.0;

/// Susceptibility reduction for a vaccinated person, per vaccine identity.
/// Unrecognized identities fall back to a conservative default.
#[must_use]
pub fn vaccine_efficacy(vaccine: &str) -> f64 {
    match vaccine {
        "pfizer" => 0.9,
        _ => 0.7,
    }
}

/// Daily vaccination probability that reaches `coverage` of the
/// susceptible pool over `duration` days.
#[must_use]
pub fn daily_vaccination_prob(duration: u32, coverage: f64) -> f64 {
    1.0 - (1.0 - coverage).powf(1.0 / f64::from(duration))
}

/// One replicate's per-day output series. All vectors have length
/// `n_days + 1` (day 0 is the initial state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub day: Vec<u32>,
    pub n_susceptible: Vec<u64>,
    pub n_infectious: Vec<u64>,
    pub n_recovered: Vec<u64>,
    /// Cumulative vaccine doses administered.
    pub n_vaccinated: Vec<u64>,
    pub new_infections: Vec<u64>,
    pub cum_infections: Vec<u64>,
}

impl Trajectory {
    fn with_capacity(days: usize) -> Self {
        Trajectory {
            day: Vec::with_capacity(days),
            n_susceptible: Vec::with_capacity(days),
            n_infectious: Vec::with_capacity(days),
            n_recovered: Vec::with_capacity(days),
            n_vaccinated: Vec::with_capacity(days),
            new_infections: Vec::with_capacity(days),
            cum_infections: Vec::with_capacity(days),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.day.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.day.is_empty()
    }
}

pub struct Sim<'a> {
    config: &'a SimConfig,
    rng: StdRng,
}

impl<'a> Sim<'a> {
    /// Constructs the simulation for replicate `replicate` of an ensemble.
    #[must_use]
    pub fn new(config: &'a SimConfig, replicate: u32) -> Self {
        let seed = replicate_seed(config.base.rand_seed, replicate);
        Sim {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Effective transmission rate on `day`, after applying every active
    /// beta change to the layers it affects.
    fn effective_beta(&self, day: u32) -> f64 {
        ALL_LAYERS
            .iter()
            .map(|&layer| {
                let mut layer_beta = BASE_BETA * layer.weight();
                for intervention in &self.config.interventions {
                    if let Intervention::BetaChange {
                        day: change_day,
                        factor,
                        layers,
                    } = intervention
                    {
                        if day >= *change_day && affects_layer(layers.as_deref(), layer) {
                            layer_beta *= factor;
                        }
                    }
                }
                layer_beta
            })
            .sum()
    }

    /// Vaccine doses to draw on `day`: `Some((daily_prob, efficacy))`
    /// while a campaign is active.
    fn vaccination_today(&self, day: u32) -> Option<(f64, f64)> {
        for intervention in &self.config.interventions {
            if let Intervention::VaccinationCampaign {
                start_day,
                vaccine,
                duration,
                coverage,
            } = intervention
            {
                if day >= *start_day && day < start_day + duration {
                    return Some((
                        daily_vaccination_prob(*duration, *coverage),
                        vaccine_efficacy(vaccine),
                    ));
                }
            }
        }
        None
    }

    /// Runs the replicate to the horizon and returns its trajectory.
    pub fn run(mut self) -> Trajectory {
        let base = &self.config.base;
        let n = base.pop_size;
        let mut susceptible = n - base.pop_infected;
        let mut infectious = base.pop_infected;
        let mut recovered: u64 = 0;
        let mut doses: u64 = 0;
        let mut cum_infections = base.pop_infected;

        let days = base.n_days as usize + 1;
        let mut trajectory = Trajectory::with_capacity(days);
        record_day(
            &mut trajectory,
            0,
            susceptible,
            infectious,
            recovered,
            doses,
            0,
            cum_infections,
        );

        let recovery_prob = 1.0 / INFECTIOUS_PERIOD_DAYS;

        for day in 1..=base.n_days {
            // Vaccination draws happen before transmission, as a rollout
            // protects people from that day's exposure onward.
            if let Some((daily_prob, efficacy)) = self.vaccination_today(day) {
                let dosed = self.binomial(susceptible, daily_prob);
                let protected = self.binomial(dosed, efficacy);
                susceptible -= protected;
                recovered += protected;
                doses += dosed;
            }

            let lambda = self.effective_beta(day) * infectious as f64 / n as f64;
            let infection_prob = 1.0 - (-lambda).exp();
            let infected_today = self.binomial(susceptible, infection_prob);
            let recovered_today = self.binomial(infectious, recovery_prob);

            susceptible -= infected_today;
            infectious = infectious + infected_today - recovered_today;
            recovered += recovered_today;
            cum_infections += infected_today;

            record_day(
                &mut trajectory,
                day,
                susceptible,
                infectious,
                recovered,
                doses,
                infected_today,
                cum_infections,
            );
        }

        trajectory
    }

    fn binomial(&mut self, n: u64, p: f64) -> u64 {
        if n == 0 || p <= 0.0 {
            return 0;
        }
        if p >= 1.0 {
            return n;
        }
        let distribution = Binomial::new(n, p).expect("p is in (0, 1)");
        distribution.sample(&mut self.rng)
    }
}

fn affects_layer(layers: Option<&[ContactLayer]>, layer: ContactLayer) -> bool {
    match layers {
        None => true,
        Some(affected) => affected.contains(&layer),
    }
}

#[allow(clippy::too_many_arguments)]
fn record_day(
    trajectory: &mut Trajectory,
    day: u32,
    susceptible: u64,
    infectious: u64,
    recovered: u64,
    doses: u64,
    new_infections: u64,
    cum_infections: u64,
) {
    trajectory.day.push(day);
    trajectory.n_susceptible.push(susceptible);
    trajectory.n_infectious.push(infectious);
    trajectory.n_recovered.push(recovered);
    trajectory.n_vaccinated.push(doses);
    trajectory.new_infections.push(new_infections);
    trajectory.cum_infections.push(cum_infections);
}

/// Seed for replicate `replicate`, decorrelated from neighboring
/// replicates by hashing rather than offsetting.
#[must_use]
pub fn replicate_seed(base_seed: u64, replicate: u32) -> u64 {
    let mut key = [0u8; 12];
    key[..8].copy_from_slice(&base_seed.to_le_bytes());
    key[8..].copy_from_slice(&replicate.to_le_bytes());
    xxh3_64(&key)
}
