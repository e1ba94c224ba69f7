use nalgebra::Vector3;

use crate::attitude::AttitudeState;

/// Pull-based source of external (uncommanded) body torque.
///
/// The simulation driver queries every source once per step, with the state
/// at the start of the step. Implementations may keep internal state (e.g. an
/// orbit propagator) but must not depend on anything other than the queried
/// time and attitude for their output.
pub trait DisturbanceSource {
    /// Disturbance torque in the body frame, N·m.
    fn disturbance_torque(&mut self, time: f64, state: &AttitudeState) -> Vector3<f64>;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// No disturbance at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisturbance;

impl DisturbanceSource for NoDisturbance {
    fn disturbance_torque(&mut self, _time: f64, _state: &AttitudeState) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Fixed body-frame torque (e.g. a residual-dipole or thruster-leak bias).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantDisturbance {
    pub torque: Vector3<f64>,
}

impl ConstantDisturbance {
    pub fn new(torque: Vector3<f64>) -> Self {
        Self { torque }
    }
}

impl DisturbanceSource for ConstantDisturbance {
    fn disturbance_torque(&mut self, _time: f64, _state: &AttitudeState) -> Vector3<f64> {
        self.torque
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Any closure `(time, state) -> torque` is a disturbance source.
impl<F> DisturbanceSource for F
where
    F: FnMut(f64, &AttitudeState) -> Vector3<f64>,
{
    fn disturbance_torque(&mut self, time: f64, state: &AttitudeState) -> Vector3<f64> {
        self(time, state)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_is_constant() {
        let mut d = ConstantDisturbance::new(Vector3::new(1e-5, 0.0, -2e-5));
        let s = AttitudeState::at_rest();
        assert_eq!(d.disturbance_torque(0.0, &s), d.disturbance_torque(100.0, &s));
    }

    #[test]
    fn closure_source() {
        let mut d = |t: f64, _s: &AttitudeState| Vector3::new(t, 0.0, 0.0);
        assert_eq!(d.disturbance_torque(2.0, &AttitudeState::at_rest()).x, 2.0);
    }
}
