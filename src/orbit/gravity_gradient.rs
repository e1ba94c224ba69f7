use nalgebra::Vector3;

use super::disturbance::DisturbanceSource;
use super::elements::KeplerianElements;
use super::gravity::mean_motion_squared;
use super::propagator::OrbitPropagator;
use crate::attitude::{AttitudeState, InertiaProperties};

/// Gravity-gradient torque on a rigid body, body frame, N·m.
///
///   τ = 3 μ / r³ · n̂ × (I n̂)
///
/// `pos_eci` is the spacecraft position, `state.quat` maps body → ECI.
pub fn gravity_gradient_torque(
    pos_eci: &Vector3<f64>,
    state: &AttitudeState,
    inertia: &InertiaProperties,
) -> Vector3<f64> {
    let r = pos_eci.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    let n2 = mean_motion_squared(r);
    let nadir_body = state.quat.inverse_transform_vector(&(-pos_eci / r));
    3.0 * n2 * nadir_body.cross(&inertia.apply(&nadir_body))
}

/// Gravity-gradient disturbance fed by an orbit propagator.
#[derive(Debug, Clone)]
pub struct GravityGradient {
    orbit: OrbitPropagator,
    inertia: InertiaProperties,
}

impl GravityGradient {
    pub fn new(orbit: OrbitPropagator, inertia: InertiaProperties) -> Self {
        Self { orbit, inertia }
    }

    pub fn from_elements(elements: &KeplerianElements, use_j2: bool, inertia: InertiaProperties) -> Self {
        Self::new(OrbitPropagator::from_elements(elements, 0.0, use_j2), inertia)
    }
}

impl DisturbanceSource for GravityGradient {
    fn disturbance_torque(&mut self, time: f64, state: &AttitudeState) -> Vector3<f64> {
        let pos = self.orbit.state_at(time).pos;
        gravity_gradient_torque(&pos, state, &self.inertia)
    }

    fn name(&self) -> &str {
        "gravity-gradient"
    }
}
