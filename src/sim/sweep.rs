use std::sync::atomic::AtomicBool;

use rayon::prelude::*;

use super::runner::{Scenario, SimOutcome, Simulation};
use crate::control::ControlGains;
use crate::error::SimError;

/// Run independent scenarios in parallel, one isolated run per scenario.
///
/// Results come back in input order. A scenario that fails validation only
/// affects its own slot.
pub fn run_sweep(scenarios: &[Scenario]) -> Vec<Result<SimOutcome, SimError>> {
    scenarios
        .par_iter()
        .map(|scenario| Simulation::new(scenario)?.run())
        .collect()
}

/// Like [`run_sweep`], with one cancellation flag shared by every run.
pub fn run_sweep_cancellable(
    scenarios: &[Scenario],
    cancel: &AtomicBool,
) -> Vec<Result<SimOutcome, SimError>> {
    scenarios
        .par_iter()
        .map(|scenario| Simulation::new(scenario)?.with_cancel(cancel).run())
        .collect()
}

/// Copies of `base`, one per gain set, named `<base>/<index>`.
pub fn gain_variants(base: &Scenario, gains: &[ControlGains]) -> Vec<Scenario> {
    gains
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let mut s = base.clone();
            s.name = format!("{}/{}", base.name, i);
            s.config.gains = (*g).into();
            s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attitude::{AttitudeState, InertiaProperties};
    use crate::control::ControlReference;
    use crate::sim::config::SimConfig;
    use crate::sim::runner::{simulate, RunStatus};
    use nalgebra::{UnitQuaternion, Vector3};
    use std::sync::atomic::Ordering;

    fn base() -> Scenario {
        Scenario {
            name: "sweep".into(),
            initial: AttitudeState::new(
                0.0,
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 1.0),
                Vector3::zeros(),
            ),
            inertia: InertiaProperties::diagonal(5.0, 6.0, 7.0).unwrap(),
            reference: ControlReference::identity().into(),
            config: SimConfig::builder().dt(0.1).step_count(300).build().unwrap(),
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let gains = [ControlGains::pd(0.5, 2.0), ControlGains::pd(1.0, 3.0), ControlGains::pd(4.0, 6.0)];
        let scenarios = gain_variants(&base(), &gains);
        assert_eq!(scenarios[2].name, "sweep/2");

        let results = run_sweep(&scenarios);
        assert_eq!(results.len(), 3);
        for (scenario, result) in scenarios.iter().zip(&results) {
            let parallel = result.as_ref().unwrap();
            let sequential = simulate(scenario).unwrap();
            assert_eq!(parallel.trajectory, sequential.trajectory);
        }
    }

    #[test]
    fn invalid_scenario_only_fails_its_slot() {
        let mut bad = base();
        bad.config.dt = -1.0;
        let results = run_sweep(&[base(), bad]);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err(), &SimError::InvalidTimeStep(-1.0));
    }

    #[test]
    fn pre_set_cancel_stops_every_run() {
        let flag = AtomicBool::new(true);
        let results = run_sweep_cancellable(&[base(), base()], &flag);
        for r in results {
            let out = r.unwrap();
            assert_eq!(out.status, RunStatus::Cancelled);
            assert_eq!(out.trajectory.len(), 1);
        }
        flag.store(false, Ordering::Relaxed);
    }
}
