pub mod attitude;
pub mod control;
pub mod error;
pub mod orbit;
pub mod sim;

pub use attitude::{AttitudeState, InertiaProperties, Integrator};
pub use control::{ControlGains, ControlLaw, ControlLawKind, ControlReference, ReferenceTrajectory};
pub use error::{ConfigError, SimError};
pub use orbit::DisturbanceSource;
pub use sim::{run, simulate, simulate_with, RunStatus, Scenario, SimConfig, SimOutcome, Trajectory};
