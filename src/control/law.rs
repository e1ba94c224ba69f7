use nalgebra::Vector3;

use super::reference::ControlReference;
use crate::attitude::AttitudeState;
use crate::error::SimError;

/// Per-axis feedback gains (body x, y, z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlGains {
    pub kp: Vector3<f64>,  // N·m per unit of vec(q_err)
    pub kd: Vector3<f64>,  // N·m per rad/s
    pub ki: Vector3<f64>,  // N·m per unit of ∫vec(q_err) dt
}

impl ControlGains {
    /// Same PD gains on every axis, no integral action.
    pub fn pd(kp: f64, kd: f64) -> Self {
        Self {
            kp: Vector3::repeat(kp),
            kd: Vector3::repeat(kd),
            ki: Vector3::zeros(),
        }
    }

    pub fn with_ki(mut self, ki: Vector3<f64>) -> Self {
        self.ki = ki;
        self
    }

    /// Gains must be finite and non-negative.
    pub fn validate(&self) -> Result<(), SimError> {
        let ok = self
            .kp
            .iter()
            .chain(self.kd.iter())
            .chain(self.ki.iter())
            .all(|g| g.is_finite() && *g >= 0.0);
        if ok {
            Ok(())
        } else {
            Err(SimError::InvalidConfiguration(
                "control gains must be finite and non-negative".into(),
            ))
        }
    }
}

impl Default for ControlGains {
    fn default() -> Self {
        Self::pd(1.0, 2.0)
    }
}

/// Trait for attitude control laws.
///
/// Implement this to plug a custom law into the simulation loop. The law gets
/// the current state, the active reference and the configured gains, and
/// returns the commanded body torque before actuator saturation.
pub trait ControlLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
        dt: f64,
    ) -> Vector3<f64>;

    /// Reset internal state (e.g., integrators) before a new run.
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Law that never commands torque (free tumble, disturbance-only runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveLaw;

impl ControlLaw for PassiveLaw {
    fn commanded_torque(
        &mut self,
        _state: &AttitudeState,
        _reference: &ControlReference,
        _gains: &ControlGains,
        _dt: f64,
    ) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn name(&self) -> &str {
        "Passive"
    }
}
