use nalgebra::Vector3;

use super::attitude_error::attitude_error;
use super::law::{ControlGains, ControlLaw};
use super::reference::ControlReference;
use crate::attitude::{AttitudeState, InertiaProperties};
use crate::error::SimError;

/// LQR cost weights, per body axis.
///
/// Cost: ∫ q_att·θ² + q_rate·ω² + r·τ² dt on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LqrWeights {
    pub q_attitude: Vector3<f64>,
    pub q_rate: Vector3<f64>,
    pub r: Vector3<f64>,
}

impl Default for LqrWeights {
    fn default() -> Self {
        Self {
            q_attitude: Vector3::repeat(1.0),
            q_rate: Vector3::zeros(),
            r: Vector3::repeat(1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Gain design
// ---------------------------------------------------------------------------

/// Steady-state LQR gains for the linearized, axis-decoupled plant
/// J θ̈ = τ about each principal axis.
///
/// With state [θ, ω] the algebraic Riccati equation has the closed form
///
///   kp = √(q_att / r)
///   kd = √((q_rate + 2 J √(q_att·r)) / r)
///
/// Products of inertia are ignored; only the diagonal moments enter.
pub fn design(weights: &LqrWeights, inertia: &InertiaProperties) -> Result<ControlGains, SimError> {
    let valid = weights
        .q_attitude
        .iter()
        .chain(weights.q_rate.iter())
        .chain(weights.r.iter())
        .all(|w| w.is_finite() && *w >= 0.0)
        && weights.r.iter().all(|r| *r > 0.0);
    if !valid {
        return Err(SimError::InvalidConfiguration(
            "LQR weights must be finite, Q >= 0 and R > 0".into(),
        ));
    }

    let j = inertia.principal_moments();
    let mut gains = ControlGains::pd(0.0, 0.0);
    for axis in 0..3 {
        let (qa, qr, r) = (weights.q_attitude[axis], weights.q_rate[axis], weights.r[axis]);
        gains.kp[axis] = (qa / r).sqrt();
        gains.kd[axis] = ((qr + 2.0 * j[axis] * (qa * r).sqrt()) / r).sqrt();
    }
    Ok(gains)
}

// ---------------------------------------------------------------------------
// LQR law
// ---------------------------------------------------------------------------

/// State feedback u = −K x on x = [2·vec(q_err), ω_err].
///
/// Uses gains produced by [`design`]; 2·vec(q_err) is the small-angle
/// attitude state the gains were designed for.
#[derive(Debug, Clone, Copy, Default)]
pub struct LqrLaw;

impl ControlLaw for LqrLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
        _dt: f64,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        -gains.kp.component_mul(&err.small_angle()) - gains.kd.component_mul(&err.rate)
    }

    fn name(&self) -> &str {
        "LQR"
    }
}
