use nalgebra::Vector3;

use spacecraft_dynamics::attitude::AttitudeState;
use spacecraft_dynamics::control::attitude_error;
use spacecraft_dynamics::sim::presets;
use spacecraft_dynamics::{simulate_with, ControlGains, ControlLaw, ControlReference};

/// Bang-bang law with a dead band: full torque against the switching line
/// s = ω_err + λ·vec(q_err) on each axis, nothing inside the band.
struct BangBangLaw {
    torque: f64,     // N·m per axis
    lambda: f64,     // 1/s
    dead_band: f64,
}

impl ControlLaw for BangBangLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        _gains: &ControlGains,
        _dt: f64,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        let s = err.rate + err.vector() * self.lambda;
        s.map(|si| {
            if si > self.dead_band {
                -self.torque
            } else if si < -self.dead_band {
                self.torque
            } else {
                0.0
            }
        })
    }

    fn name(&self) -> &str {
        "BangBang"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = presets::large_slew()?;
    scenario.config.step_count = 4000;

    let law = BangBangLaw { torque: 0.4, lambda: 0.05, dead_band: 1e-3 };
    println!("Simulating {} with {} law...", scenario.name, law.name());
    let outcome = simulate_with(&scenario, Box::new(law))?;

    let traj = &outcome.trajectory;
    let target = &scenario.reference.at(0.0).quat;
    if let Some(last) = traj.final_state() {
        println!("Final error: {:.3} deg", last.angle_to(target).to_degrees());
        println!("Final rate: {:.5} deg/s", last.omega.norm().to_degrees());
    }
    println!("Max rate: {:.3} deg/s", traj.max_rate().to_degrees());
    println!("Saturated steps: {}", outcome.saturation.steps);
    println!("Trajectory points: {}", traj.len());
    Ok(())
}
