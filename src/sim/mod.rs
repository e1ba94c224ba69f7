pub mod config;
pub mod event;
pub mod presets;
pub mod runner;
pub mod sweep;
pub mod trajectory;

pub use config::{DisturbanceConfig, GainConfig, SimConfig, SimConfigBuilder};
pub use event::{EventDetector, EventKind, RateDetector, SettleDetector, SimEvent};
pub use runner::{run, simulate, simulate_with, RunStatus, SaturationSummary, Scenario, SimOutcome, Simulation};
pub use sweep::{gain_variants, run_sweep, run_sweep_cancellable};
pub use trajectory::{StepRecord, Trajectory};
