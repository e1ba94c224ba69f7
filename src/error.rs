use thiserror::Error;

use crate::attitude::inertia::InertiaError;

/// Failures surfaced by the simulation core.
///
/// Configuration problems are returned as `Err` before any step runs. An error
/// raised by a step (normally `NumericDivergence`) ends a run already in
/// progress and is reported as `RunStatus::Failed` with the partial trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid inertia: {0}")]
    InvalidInertia(#[from] InertiaError),
    #[error("invalid time step {0} s (must be finite and > 0)")]
    InvalidTimeStep(f64),
    #[error("numeric divergence at t = {time:.4} s: {quantity} is not finite")]
    NumericDivergence { time: f64, quantity: &'static str },
}

/// Errors while loading a [`SimConfig`](crate::sim::SimConfig) from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{0}")]
    Invalid(#[from] SimError),
}
