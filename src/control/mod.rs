pub mod attitude_error;
pub mod evaluator;
pub mod law;
pub mod lqr;
pub mod pd;
pub mod pid;
pub mod reference;
pub mod saturation;
pub mod sliding_mode;

pub use attitude_error::{attitude_error, AttitudeError};
pub use evaluator::{ControlLawEvaluator, ControlLawKind, ControlOutput};
pub use law::{ControlGains, ControlLaw, PassiveLaw};
pub use lqr::{LqrLaw, LqrWeights};
pub use pd::PdLaw;
pub use pid::PidLaw;
pub use reference::{ControlReference, ReferenceTrajectory};
pub use saturation::ActuatorLimits;
pub use sliding_mode::SlidingModeLaw;
