use nalgebra::Vector3;

use super::attitude_error::attitude_error;
use super::law::{ControlGains, ControlLaw};
use super::reference::ControlReference;
use crate::attitude::AttitudeState;

// ---------------------------------------------------------------------------
// PID law (three axes)
// ---------------------------------------------------------------------------

/// PD law plus integral action on vec(q_err).
///
/// The derivative term uses the measured rate error rather than a finite
/// difference of the attitude error, so there is no derivative kick when the
/// reference switches.
#[derive(Debug, Clone)]
pub struct PidLaw {
    integral: Vector3<f64>,
    /// Anti-windup: each integral component is clamped to ±this.
    pub integral_limit: f64,
}

impl PidLaw {
    pub fn new(integral_limit: f64) -> Self {
        Self { integral: Vector3::zeros(), integral_limit: integral_limit.abs() }
    }

    pub fn integral(&self) -> &Vector3<f64> {
        &self.integral
    }
}

impl Default for PidLaw {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ControlLaw for PidLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
        dt: f64,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        let e = err.vector();
        if dt > 0.0 {
            let limit = self.integral_limit;
            self.integral = (self.integral + e * dt).map(|v| v.clamp(-limit, limit));
        }
        -gains.kp.component_mul(&e)
            - gains.ki.component_mul(&self.integral)
            - gains.kd.component_mul(&err.rate)
    }

    fn reset(&mut self) {
        self.integral = Vector3::zeros();
    }

    fn name(&self) -> &str {
        "PID"
    }
}
