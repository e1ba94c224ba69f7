pub mod disturbance;
pub mod elements;
pub mod gravity;
pub mod gravity_gradient;
pub mod propagator;

pub use disturbance::{ConstantDisturbance, DisturbanceSource, NoDisturbance};
pub use elements::KeplerianElements;
pub use gravity_gradient::{gravity_gradient_torque, GravityGradient};
pub use propagator::{OrbitPropagator, OrbitalState};
