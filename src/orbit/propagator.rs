use nalgebra::Vector3;

use super::elements::KeplerianElements;
use super::gravity::{gravity_j2_eci, gravity_pointmass_eci, R_EARTH};

/// Translational orbit state (no attitude).
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalState {
    pub time: f64,
    pub pos: Vector3<f64>,  // m, ECI
    pub vel: Vector3<f64>,  // m/s, ECI
}

impl OrbitalState {
    pub fn altitude(&self) -> f64 {
        self.pos.norm() - R_EARTH
    }
}

/// RK4 step for orbital propagation.
fn rk4_orbital_step(state: &OrbitalState, dt: f64, use_j2: bool) -> OrbitalState {
    let accel = |pos: &Vector3<f64>| {
        if use_j2 {
            gravity_j2_eci(pos)
        } else {
            gravity_pointmass_eci(pos)
        }
    };

    let k1_dr = state.vel;
    let k1_dv = accel(&state.pos);
    let k2_dr = state.vel + k1_dv * dt * 0.5;
    let k2_dv = accel(&(state.pos + k1_dr * dt * 0.5));
    let k3_dr = state.vel + k2_dv * dt * 0.5;
    let k3_dv = accel(&(state.pos + k2_dr * dt * 0.5));
    let k4_dr = state.vel + k3_dv * dt;
    let k4_dv = accel(&(state.pos + k3_dr * dt));

    OrbitalState {
        time: state.time + dt,
        pos: state.pos + (k1_dr + 2.0 * k2_dr + 2.0 * k3_dr + k4_dr) * (dt / 6.0),
        vel: state.vel + (k1_dv + 2.0 * k2_dv + 2.0 * k3_dv + k4_dv) * (dt / 6.0),
    }
}

// ---------------------------------------------------------------------------
// Pull-based orbit propagator
// ---------------------------------------------------------------------------

/// Lazily propagates an orbit to whatever time the caller asks for.
///
/// Queries are expected to move forward in time; a query earlier than the
/// cached state restarts from the initial conditions.
#[derive(Debug, Clone)]
pub struct OrbitPropagator {
    initial: OrbitalState,
    current: OrbitalState,
    max_step: f64,
    use_j2: bool,
}

impl OrbitPropagator {
    /// Default internal step, s.
    pub const DEFAULT_STEP: f64 = 10.0;

    pub fn new(initial: OrbitalState, use_j2: bool) -> Self {
        Self {
            current: initial.clone(),
            initial,
            max_step: Self::DEFAULT_STEP,
            use_j2,
        }
    }

    /// Start from Keplerian elements at `epoch` (simulation time, s).
    pub fn from_elements(elements: &KeplerianElements, epoch: f64, use_j2: bool) -> Self {
        let (pos, vel) = elements.to_state_vector();
        Self::new(OrbitalState { time: epoch, pos, vel }, use_j2)
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        if max_step.is_finite() && max_step > 0.0 {
            self.max_step = max_step;
        }
        self
    }

    /// Orbit state at simulation time `t`.
    pub fn state_at(&mut self, t: f64) -> &OrbitalState {
        if t < self.current.time {
            self.current = self.initial.clone();
        }
        while self.current.time < t {
            let h = (t - self.current.time).min(self.max_step);
            self.current = rk4_orbital_step(&self.current, h, self.use_j2);
        }
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::gravity::MU_EARTH;

    #[test]
    fn circular_orbit_stays_circular() {
        let elements = KeplerianElements::circular(400_000.0, 0.0);
        let mut prop = OrbitPropagator::from_elements(&elements, 0.0, false).with_max_step(1.0);
        let start = prop.state_at(0.0).clone();

        let end = prop.state_at(elements.period()).clone();
        let pos_error = (end.pos - start.pos).norm();
        let circumference = 2.0 * std::f64::consts::PI * elements.sma;
        assert!(
            pos_error / circumference < 2e-4,
            "Relative position error after one orbit: {:.2e}",
            pos_error / circumference
        );
        assert!((end.altitude() - 400_000.0).abs() < 100.0);
    }

    #[test]
    fn lands_exactly_on_requested_time() {
        let mut prop = OrbitPropagator::from_elements(&KeplerianElements::circular(500_000.0, 0.5), 0.0, false);
        assert_eq!(prop.state_at(123.456).time, 123.456);
    }

    #[test]
    fn rewinding_restarts_from_initial() {
        let mut prop = OrbitPropagator::from_elements(&KeplerianElements::circular(500_000.0, 0.5), 0.0, false);
        let early = prop.state_at(60.0).clone();
        prop.state_at(3000.0);
        let again = prop.state_at(60.0).clone();
        assert!((again.pos - early.pos).norm() < 1e-6);
    }

    #[test]
    fn j2_causes_drift() {
        let r = R_EARTH + 400_000.0;
        let v = (MU_EARTH / r).sqrt();
        let inc = 51.6_f64.to_radians();
        let initial = OrbitalState {
            time: 0.0,
            pos: Vector3::new(r, 0.0, 0.0),
            vel: Vector3::new(0.0, v * inc.cos(), v * inc.sin()),
        };
        let period = 2.0 * std::f64::consts::PI * (r.powi(3) / MU_EARTH).sqrt();
        let pos_pm = OrbitPropagator::new(initial.clone(), false).state_at(period).pos;
        let pos_j2 = OrbitPropagator::new(initial, true).state_at(period).pos;
        let diff = (pos_j2 - pos_pm).norm();
        assert!(diff > 10.0, "J2 should cause measurable position difference, got {:.1} m", diff);
    }
}
