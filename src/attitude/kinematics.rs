use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::dynamics::angular_acceleration;
use super::inertia::InertiaProperties;
use super::state::{AttitudeState, Deriv};
use crate::error::SimError;

/// Quaternions whose raw norm falls below this are treated as collapsed.
const MIN_RAW_NORM: f64 = 1e-12;

/// Fixed-step integration scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Integrator {
    /// Forward Euler, first order. Kept mainly as a baseline.
    Euler,
    /// Classical 4th-order Runge-Kutta.
    #[default]
    Rk4,
}

// ---------------------------------------------------------------------------
// Rotational equations of motion
// ---------------------------------------------------------------------------

/// Time derivative of the attitude state under a constant body torque.
///
///   dω/dt = I⁻¹ (τ − ω × Iω)
///   dq/dt = ½ q ⊗ [0, ω]
pub fn derivatives(state: &AttitudeState, torque: &Vector3<f64>, inertia: &InertiaProperties) -> Deriv {
    let omega_quat = Quaternion::new(0.0, state.omega.x, state.omega.y, state.omega.z);
    Deriv {
        dquat: state.quat.quaternion() * omega_quat * 0.5,
        domega: angular_acceleration(&state.omega, torque, inertia),
    }
}

// ---------------------------------------------------------------------------
// Single step
// ---------------------------------------------------------------------------

/// Advance `state` by `dt` with `net_torque` held constant over the step.
///
/// The returned orientation is always renormalized; a non-finite result is
/// reported as [`SimError::NumericDivergence`].
pub fn step(
    state: &AttitudeState,
    net_torque: &Vector3<f64>,
    inertia: &InertiaProperties,
    dt: f64,
    integrator: Integrator,
) -> Result<AttitudeState, SimError> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidTimeStep(dt));
    }

    let (q_raw, omega) = match integrator {
        Integrator::Euler => euler_increment(state, net_torque, inertia, dt),
        Integrator::Rk4 => rk4_increment(state, net_torque, inertia, dt),
    };

    let time = state.time + dt;
    if omega.iter().any(|w| !w.is_finite()) {
        return Err(SimError::NumericDivergence { time, quantity: "angular velocity" });
    }
    let quat = renormalize(q_raw, time)?;

    Ok(AttitudeState { time, quat, omega })
}

fn euler_increment(
    state: &AttitudeState,
    torque: &Vector3<f64>,
    inertia: &InertiaProperties,
    dt: f64,
) -> (Quaternion<f64>, Vector3<f64>) {
    let d = derivatives(state, torque, inertia);
    (
        state.quat.quaternion() + d.dquat * dt,
        state.omega + d.domega * dt,
    )
}

fn rk4_increment(
    state: &AttitudeState,
    torque: &Vector3<f64>,
    inertia: &InertiaProperties,
    dt: f64,
) -> (Quaternion<f64>, Vector3<f64>) {
    let k1 = derivatives(state, torque, inertia);
    let k2 = derivatives(&state.apply(&k1, dt * 0.5), torque, inertia);
    let k3 = derivatives(&state.apply(&k2, dt * 0.5), torque, inertia);
    let k4 = derivatives(&state.apply(&k3, dt), torque, inertia);

    let q = state.quat.quaternion()
        + (k1.dquat + k2.dquat * 2.0 + k3.dquat * 2.0 + k4.dquat) * (dt / 6.0);
    let omega = state.omega
        + (k1.domega + 2.0 * k2.domega + 2.0 * k3.domega + k4.domega) * (dt / 6.0);
    (q, omega)
}

// ---------------------------------------------------------------------------
// Unit-norm post-condition
// ---------------------------------------------------------------------------

/// Project an integrated quaternion back onto the unit sphere.
///
/// Fails if the raw quaternion is non-finite or has collapsed towards zero,
/// since no rotation can be recovered from it.
pub fn renormalize(raw: Quaternion<f64>, time: f64) -> Result<UnitQuaternion<f64>, SimError> {
    let norm = raw.norm();
    if !norm.is_finite() || norm < MIN_RAW_NORM {
        return Err(SimError::NumericDivergence { time, quantity: "orientation quaternion" });
    }
    let q = UnitQuaternion::new_unchecked(raw / norm);
    debug_assert!((q.quaternion().norm() - 1.0).abs() < 1e-12);
    Ok(q)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
