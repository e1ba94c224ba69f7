use nalgebra::Vector3;

use super::attitude_error::attitude_error;
use super::law::{ControlGains, ControlLaw};
use super::reference::ControlReference;
use crate::attitude::AttitudeState;

// ---------------------------------------------------------------------------
// Quaternion-feedback PD law
// ---------------------------------------------------------------------------

/// τ = −Kp ∘ vec(q_err) − Kd ∘ ω_err, with shortest-path sign correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdLaw;

impl ControlLaw for PdLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
        _dt: f64,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        -gains.kp.component_mul(&err.vector()) - gains.kd.component_mul(&err.rate)
    }

    fn name(&self) -> &str {
        "PD"
    }
}
