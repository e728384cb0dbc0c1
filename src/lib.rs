//! Scenario-driven what-if runs of a stochastic epidemic model
//!
//! `whatif` drives ensemble runs of a daily-step stochastic epidemic
//! simulation under a fixed set of named intervention scenarios and
//! persists the results for later comparison. The pieces are:
//!
//! * A scenario registry mapping names like `Mask(strict)` or
//!   `Vaccine(early)` to ordered intervention lists (contact-rate
//!   changes, vaccination campaigns) applied on top of shared base
//!   parameters.
//! * A run driver that resolves a scenario, runs N stochastic
//!   replicates sequentially, reduces them to a median trajectory, and
//!   writes three artifacts per run into a shared directory: a
//!   serialized run bundle (`.sim`), a tabular export (`.csv`), and a
//!   rendered plot (`.png`).
//! * A merge utility that loads every run bundle a directory holds,
//!   combines them while keeping each source distinguishable, and
//!   renders one comparison plot.
//!
//! Each run-driver invocation is independent and stateless apart from
//! the files it writes; artifact names carry the scenario name and a
//! completion timestamp so runs never overwrite one another.

pub mod ensemble;
pub mod error;
pub mod interventions;
pub mod merge;
pub mod params;
pub mod plot;
pub mod run;
pub mod scenarios;
pub mod sim;

pub use error::WhatifError;
