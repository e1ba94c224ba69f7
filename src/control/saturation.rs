use nalgebra::Vector3;

use crate::error::SimError;

/// Per-axis actuator torque limits, N·m.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorLimits {
    pub max_torque: Vector3<f64>,
}

impl ActuatorLimits {
    pub fn new(max_torque: Vector3<f64>) -> Result<Self, SimError> {
        if max_torque.iter().any(|m| !(m.is_finite() && *m > 0.0)) {
            return Err(SimError::InvalidConfiguration(
                "actuator limits must be finite and > 0".into(),
            ));
        }
        Ok(Self { max_torque })
    }

    /// Same limit on every axis.
    pub fn uniform(max_torque: f64) -> Result<Self, SimError> {
        Self::new(Vector3::repeat(max_torque))
    }

    /// Clamp `torque` axis by axis. The flag is true when any axis was clipped.
    pub fn saturate(&self, torque: &Vector3<f64>) -> (Vector3<f64>, bool) {
        let clamped = torque.zip_map(&self.max_torque, |t, m| t.clamp(-m, m));
        let saturated = clamped != *torque;
        (clamped, saturated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_limits_untouched() {
        let lim = ActuatorLimits::uniform(1.0).unwrap();
        let t = Vector3::new(0.5, -0.99, 1.0);
        assert_eq!(lim.saturate(&t), (t, false));
    }

    #[test]
    fn clamps_each_axis() {
        let lim = ActuatorLimits::new(Vector3::new(0.1, 0.2, 0.3)).unwrap();
        let (t, sat) = lim.saturate(&Vector3::new(1.0, -1.0, 0.05));
        assert!(sat);
        assert_eq!(t, Vector3::new(0.1, -0.2, 0.05));
    }

    #[test]
    fn rejects_non_positive_limit() {
        assert!(ActuatorLimits::uniform(0.0).is_err());
        assert!(ActuatorLimits::new(Vector3::new(1.0, -1.0, 1.0)).is_err());
    }
}
