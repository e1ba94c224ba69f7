use nalgebra::Vector3;

use super::inertia::InertiaProperties;
use super::state::AttitudeState;

// ---------------------------------------------------------------------------
// Torque model
// ---------------------------------------------------------------------------

/// Net body-frame torque: commanded actuator torque plus every disturbance.
///
/// Disturbances are computed elsewhere (see [`crate::orbit::DisturbanceSource`])
/// and enter here as opaque vectors.
pub fn net_torque(commanded: &Vector3<f64>, disturbances: &[Vector3<f64>]) -> Vector3<f64> {
    disturbances.iter().fold(*commanded, |acc, d| acc + d)
}

// ---------------------------------------------------------------------------
// Euler's rotational equation
// ---------------------------------------------------------------------------

/// α = I⁻¹ (τ − ω × (I ω))
pub fn angular_acceleration(
    omega: &Vector3<f64>,
    torque: &Vector3<f64>,
    inertia: &InertiaProperties,
) -> Vector3<f64> {
    let i_omega = inertia.apply(omega);
    inertia.solve(&(torque - omega.cross(&i_omega)))
}

// ---------------------------------------------------------------------------
// Rigid-body invariants
// ---------------------------------------------------------------------------

/// Angular momentum H = I ω, body frame.
pub fn angular_momentum_body(state: &AttitudeState, inertia: &InertiaProperties) -> Vector3<f64> {
    inertia.apply(&state.omega)
}

/// Angular momentum in the inertial frame (conserved when torque-free).
pub fn angular_momentum_inertial(
    state: &AttitudeState,
    inertia: &InertiaProperties,
) -> Vector3<f64> {
    state.quat * angular_momentum_body(state, inertia)
}

/// Rotational kinetic energy T = ½ ωᵀ I ω, J.
pub fn kinetic_energy(state: &AttitudeState, inertia: &InertiaProperties) -> f64 {
    0.5 * state.omega.dot(&inertia.apply(&state.omega))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
