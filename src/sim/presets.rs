use nalgebra::{UnitQuaternion, Vector3};

use super::config::{DisturbanceConfig, SimConfig};
use super::runner::Scenario;
use crate::attitude::{AttitudeState, InertiaProperties, Integrator};
use crate::control::{ControlGains, ControlLawKind, ControlReference, ReferenceTrajectory};
use crate::error::SimError;

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 3] = ["detumble", "large-slew", "gravity-gradient-hold"];

pub fn by_name(name: &str) -> Result<Scenario, SimError> {
    match name {
        "detumble" => detumble(),
        "large-slew" => large_slew(),
        "gravity-gradient-hold" => gravity_gradient_hold(),
        other => Err(SimError::InvalidConfiguration(format!(
            "unknown scenario '{other}' (expected one of {})",
            NAMES.join(", ")
        ))),
    }
}

/// Small satellite after deployment: tumbling, rate-damping only.
pub fn detumble() -> Result<Scenario, SimError> {
    Ok(Scenario {
        name: "detumble".into(),
        initial: AttitudeState::new(0.0, UnitQuaternion::identity(), Vector3::new(0.20, -0.15, 0.10)),
        inertia: InertiaProperties::from_moments(12.0, 14.0, 8.0, 0.3, -0.2, 0.1)?,
        reference: ControlReference::identity().into(),
        config: SimConfig::builder()
            .dt(0.1)
            .step_count(3000)
            .gains(ControlGains::pd(0.0, 2.0))
            .actuator_limits([0.02; 3])
            .build()?,
    })
}

/// 170 degree eigen-axis slew under torque limits, then a 90 degree yaw.
pub fn large_slew() -> Result<Scenario, SimError> {
    let axis = nalgebra::Unit::new_normalize(Vector3::new(1.0, 1.0, 0.2));
    let target = UnitQuaternion::from_axis_angle(&axis, 170f64.to_radians());
    let reference = ReferenceTrajectory::schedule(vec![
        (0.0, ControlReference::hold(target)),
        (400.0, ControlReference::hold(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90f64.to_radians()) * target)),
    ])?;
    Ok(Scenario {
        name: "large-slew".into(),
        initial: AttitudeState::at_rest(),
        inertia: InertiaProperties::diagonal(120.0, 100.0, 80.0)?,
        reference,
        config: SimConfig::builder()
            .dt(0.1)
            .step_count(8000)
            .control_law(ControlLawKind::Pid { integral_limit: 0.2 })
            .gains(ControlGains::pd(8.0, 40.0).with_ki(Vector3::repeat(0.05)))
            .actuator_limits([0.5; 3])
            .build()?,
    })
}

/// LQR inertial hold against gravity-gradient torque in a 500 km ISS-like orbit.
pub fn gravity_gradient_hold() -> Result<Scenario, SimError> {
    Ok(Scenario {
        name: "gravity-gradient-hold".into(),
        initial: AttitudeState::new(
            0.0,
            UnitQuaternion::from_euler_angles(0.05, -0.03, 0.02),
            Vector3::zeros(),
        ),
        inertia: InertiaProperties::diagonal(300.0, 280.0, 60.0)?,
        reference: ControlReference::identity().into(),
        config: SimConfig::builder()
            .dt(0.5)
            .step_count(11_000)
            .integrator(Integrator::Rk4)
            .control_law(ControlLawKind::Lqr {
                q_attitude: [1.0; 3],
                q_rate: [10.0; 3],
                r: [100.0; 3],
            })
            .disturbance(DisturbanceConfig::GravityGradient {
                altitude: 500_000.0,
                inclination_deg: 51.6,
                j2: true,
            })
            .build()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::runner::simulate;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            let s = by_name(name).unwrap();
            assert_eq!(s.name, name);
            assert!(s.config.validate().is_ok());
        }
        assert!(by_name("nope").is_err());
    }

    #[test]
    fn detumble_removes_rate() {
        let s = detumble().unwrap();
        let out = simulate(&s).unwrap();
        assert!(out.is_completed());
        assert!(out.saturation.steps > 0);
        let w0 = s.initial.omega.norm();
        let w1 = out.trajectory.final_state().unwrap().omega.norm();
        assert!(w1 < 0.05 * w0, "rate {w1} after detumble");
    }

    #[test]
    fn slew_reaches_first_target() {
        let mut s = large_slew().unwrap();
        s.config.step_count = 4000;
        let out = simulate(&s).unwrap();
        let last = out.trajectory.final_state().unwrap();
        let target = &s.reference.at(0.0).quat;
        assert!(last.angle_to(target) < 1f64.to_radians());
    }

    #[test]
    fn gravity_gradient_hold_stays_close() {
        let mut s = gravity_gradient_hold().unwrap();
        s.config.step_count = 2000;
        let out = simulate(&s).unwrap();
        assert!(out.is_completed());
        let worst = out
            .trajectory
            .pointing_error(&s.reference)
            .iter()
            .map(|(_, e)| *e)
            .fold(0.0_f64, f64::max);
        assert!(worst < 0.1);
        assert!(out.trajectory.records().iter().any(|r| r.disturbance.norm() > 0.0));
    }
}
