pub mod dynamics;
pub mod inertia;
pub mod kinematics;
pub mod state;

pub use dynamics::{angular_acceleration, net_torque};
pub use inertia::{InertiaError, InertiaProperties};
pub use kinematics::{renormalize, step, Integrator};
pub use state::{AttitudeState, Deriv};
