use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use super::config::SimConfig;
use super::event::{EventDetector, EventKind, SaturationEdges, SimEvent};
use super::trajectory::{StepRecord, Trajectory};
use crate::attitude::state::UNIT_NORM_TOL;
use crate::attitude::{kinematics, net_torque, AttitudeState, InertiaProperties};
use crate::control::{ControlGains, ControlLaw, ControlLawEvaluator, ReferenceTrajectory};
use crate::error::SimError;
use crate::orbit::DisturbanceSource;

// ---------------------------------------------------------------------------
// Run inputs and results
// ---------------------------------------------------------------------------

/// Everything a run needs besides pluggable laws and disturbance sources.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub initial: AttitudeState,
    pub inertia: InertiaProperties,
    pub reference: ReferenceTrajectory,
    pub config: SimConfig,
}

/// Terminal state of a run that got past validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed,
    Failed(SimError),
    Cancelled,
}

/// How often the actuators clipped during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaturationSummary {
    pub steps: usize,
    pub first_time: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub status: RunStatus,
    pub trajectory: Trajectory,
    pub saturation: SaturationSummary,
    pub events: Vec<SimEvent>,
}

impl SimOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// The per-step error that ended the run, if any.
    pub fn error(&self) -> Option<&SimError> {
        match &self.status {
            RunStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation driver
// ---------------------------------------------------------------------------

/// A configured run. Built from a [`Scenario`], optionally customized, then
/// consumed by [`Simulation::run`].
pub struct Simulation<'a> {
    scenario: &'a Scenario,
    evaluator: ControlLawEvaluator,
    disturbances: Vec<Box<dyn DisturbanceSource + 'a>>,
    detectors: Vec<Box<dyn EventDetector + 'a>>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Simulation<'a> {
    /// Control law and disturbance sources as named in the scenario config.
    pub fn new(scenario: &'a Scenario) -> Result<Self, SimError> {
        scenario.config.validate()?;
        Ok(Self {
            scenario,
            evaluator: scenario.config.evaluator(&scenario.inertia)?,
            disturbances: scenario
                .config
                .disturbance_sources(&scenario.inertia)?
                .into_iter()
                .map(|d| d as Box<dyn DisturbanceSource + 'a>)
                .collect(),
            detectors: Vec::new(),
            cancel: None,
        })
    }

    /// Replace the configured law, keeping the configured gains and limits.
    pub fn with_law(mut self, law: Box<dyn ControlLaw>) -> Self {
        let gains = *self.evaluator.gains();
        let limits = self.evaluator.limits().copied();
        self.evaluator = ControlLawEvaluator::new(law, gains, limits);
        self
    }

    /// Add a disturbance source on top of the configured ones.
    pub fn with_disturbance(mut self, source: Box<dyn DisturbanceSource + 'a>) -> Self {
        self.disturbances.push(source);
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn EventDetector + 'a>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Stop at the next step boundary once `flag` is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn validate_initial(&self) -> Result<(), SimError> {
        let initial = &self.scenario.initial;
        if !initial.is_finite() {
            return Err(SimError::InvalidConfiguration("initial state is not finite".into()));
        }
        if (initial.quat_norm() - 1.0).abs() > UNIT_NORM_TOL {
            return Err(SimError::InvalidConfiguration(format!(
                "initial quaternion norm {} is not 1",
                initial.quat_norm()
            )));
        }
        self.evaluator.gains().validate()
    }

    /// Run to completion, failure or cancellation.
    ///
    /// Configuration problems come back as `Err` before any step runs. Once
    /// stepping has started the outcome always carries the trajectory so far.
    pub fn run(mut self) -> Result<SimOutcome, SimError> {
        self.validate_initial()?;
        let scenario = self.scenario;
        let config = &scenario.config;
        let dt = config.dt;
        let t0 = scenario.initial.time;
        let steps = config.steps_from(t0)?;

        info!(
            scenario = %scenario.name,
            law = self.evaluator.name(),
            integrator = ?config.integrator,
            dt,
            steps,
            "run started"
        );

        self.evaluator.reset();
        let mut state = scenario.initial.clone();
        let mut trajectory = Trajectory::new(state.clone(), steps.min(200_000));
        let mut saturation = SaturationSummary::default();
        let mut edges = SaturationEdges::default();
        let mut events = Vec::new();
        let mut status = RunStatus::Completed;

        for k in 0..steps {
            if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                status = RunStatus::Cancelled;
                break;
            }

            // Control → dynamics → kinematics
            let reference = scenario.reference.at(state.time);
            let control = self.evaluator.evaluate(&state, reference, dt);
            let disturbance_terms: Vec<Vector3<f64>> = self
                .disturbances
                .iter_mut()
                .map(|d| d.disturbance_torque(state.time, &state))
                .collect();
            let disturbance = net_torque(&Vector3::zeros(), &disturbance_terms);
            let net = net_torque(&control.applied, &disturbance_terms);

            if net.iter().any(|t| !t.is_finite()) {
                status = RunStatus::Failed(SimError::NumericDivergence {
                    time: state.time,
                    quantity: "net torque",
                });
                break;
            }

            let mut next = match kinematics::step(&state, &net, &scenario.inertia, dt, config.integrator) {
                Ok(next) => next,
                Err(e) => {
                    status = RunStatus::Failed(e);
                    break;
                }
            };
            // Clock from the step index so long runs do not accumulate drift
            next.time = t0 + (k + 1) as f64 * dt;

            // Saturation bookkeeping
            if control.saturated {
                saturation.steps += 1;
                saturation.first_time.get_or_insert(state.time);
            }
            if let Some(kind) = edges.update(control.saturated) {
                if kind == EventKind::SaturationOnset {
                    debug!(t = state.time, commanded = ?control.commanded, "actuator saturation onset");
                }
                events.push(SimEvent { time: state.time, kind });
            }

            for detector in self.detectors.iter_mut() {
                if let Some(kind) = detector.check(&state, &next, scenario.reference.at(next.time)) {
                    events.push(SimEvent { time: next.time, kind });
                }
            }

            trajectory.push(
                StepRecord {
                    time: state.time,
                    commanded: control.commanded,
                    applied: control.applied,
                    disturbance,
                    net,
                    saturated: control.saturated,
                },
                next.clone(),
            );
            state = next;
        }

        match &status {
            RunStatus::Completed => info!(
                scenario = %scenario.name,
                t = state.time,
                pointing_error = state.angle_to(&scenario.reference.at(state.time).quat),
                saturated_steps = saturation.steps,
                "run completed"
            ),
            RunStatus::Failed(e) => warn!(
                scenario = %scenario.name,
                steps = trajectory.steps(),
                error = %e,
                "run failed"
            ),
            RunStatus::Cancelled => warn!(
                scenario = %scenario.name,
                steps = trajectory.steps(),
                "run cancelled"
            ),
        }

        Ok(SimOutcome { status, trajectory, saturation, events })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// PD run with the given gains, no actuator limits and no disturbances.
pub fn run(
    initial: &AttitudeState,
    inertia: &InertiaProperties,
    reference: &ReferenceTrajectory,
    gains: &ControlGains,
    dt: f64,
    step_count: usize,
) -> Result<SimOutcome, SimError> {
    let scenario = Scenario {
        name: "run".into(),
        initial: initial.clone(),
        inertia: inertia.clone(),
        reference: reference.clone(),
        config: SimConfig::builder().dt(dt).step_count(step_count).gains(*gains).build()?,
    };
    simulate(&scenario)
}

/// Run a scenario exactly as configured.
pub fn simulate(scenario: &Scenario) -> Result<SimOutcome, SimError> {
    Simulation::new(scenario)?.run()
}

/// Run a scenario with a custom control law.
pub fn simulate_with(scenario: &Scenario, law: Box<dyn ControlLaw>) -> Result<SimOutcome, SimError> {
    Simulation::new(scenario)?.with_law(law).run()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attitude::dynamics::kinetic_energy;
    use crate::attitude::Integrator;
    use crate::control::{ControlLawKind, ControlReference};
    use crate::orbit::{ConstantDisturbance, NoDisturbance};
    use crate::sim::config::DisturbanceConfig;
    use crate::sim::event::SettleDetector;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn inertia() -> InertiaProperties {
        InertiaProperties::diagonal(10.0, 12.0, 8.0).unwrap()
    }

    fn yawed(angle: f64) -> AttitudeState {
        AttitudeState::new(0.0, UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle), Vector3::zeros())
    }

    fn scenario(initial: AttitudeState, config: SimConfig) -> Scenario {
        Scenario {
            name: "test".into(),
            initial,
            inertia: inertia(),
            reference: ControlReference::identity().into(),
            config,
        }
    }

    #[test]
    fn quaternion_stays_unit() {
        let initial = AttitudeState::new(0.0, UnitQuaternion::identity(), Vector3::new(0.4, -0.7, 1.1));
        let config = SimConfig::builder()
            .control_law(ControlLawKind::Passive)
            .dt(0.05)
            .step_count(2000)
            .build()
            .unwrap();
        let out = simulate(&scenario(initial, config)).unwrap();
        assert!(out.is_completed());
        assert_eq!(out.trajectory.len(), 2001);
        for s in &out.trajectory {
            assert!((s.quat_norm() - 1.0).abs() < 1e-9, "norm {} at t={:.2}", s.quat_norm(), s.time);
        }
    }

    #[test]
    fn negative_dt_rejected_before_stepping() {
        let r = run(&yawed(0.3), &inertia(), &ControlReference::identity().into(), &ControlGains::default(), -1.0, 10);
        assert_eq!(r.unwrap_err(), SimError::InvalidTimeStep(-1.0));
    }

    #[test]
    fn non_unit_initial_quaternion_rejected() {
        let bad = nalgebra::Quaternion::new(1.1, 0.0, 0.0, 0.0);
        let initial = AttitudeState::new(0.0, UnitQuaternion::new_unchecked(bad), Vector3::zeros());
        let r = simulate(&scenario(initial, SimConfig::default()));
        assert!(matches!(r, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn pd_converges_from_near_half_turn() {
        let gains = ControlGains::pd(2.0, 8.0);
        let initial = yawed(179f64.to_radians());
        let out = run(&initial, &inertia(), &ControlReference::identity().into(), &gains, 0.1, 3000).unwrap();
        assert!(out.is_completed());
        let last = out.trajectory.final_state().unwrap();
        assert!(last.angle_to(&UnitQuaternion::identity()) < 1e-3);
        assert!(last.omega.norm() < 1e-3);
        assert_relative_eq!(last.time, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn times_follow_step_index() {
        let out = run(&yawed(0.1), &inertia(), &ControlReference::identity().into(), &ControlGains::default(), 0.1, 50)
            .unwrap();
        for (k, s) in out.trajectory.iter().enumerate() {
            assert_eq!(s.time, k as f64 * 0.1);
        }
        assert_eq!(out.trajectory.records()[3].time, out.trajectory.states()[3].time);
    }

    #[test]
    fn saturation_flags_and_continues() {
        let config = SimConfig::builder()
            .gains(ControlGains::pd(2.0, 8.0))
            .actuator_limits([0.05; 3])
            .dt(0.1)
            .step_count(200)
            .build()
            .unwrap();
        let out = simulate(&scenario(yawed(2.0), config)).unwrap();
        assert!(out.is_completed());
        assert_eq!(out.trajectory.steps(), 200);
        assert!(out.saturation.steps > 0);
        assert_eq!(out.saturation.first_time, Some(0.0));
        assert_eq!(out.events[0].kind, EventKind::SaturationOnset);
        for r in out.trajectory.records() {
            assert!(r.applied.iter().all(|t| t.abs() <= 0.05));
            assert_eq!(r.saturated, r.commanded != r.applied);
        }
    }

    #[test]
    fn nan_disturbance_fails_with_partial_trajectory() {
        let sc = scenario(yawed(0.5), SimConfig::builder().dt(0.1).step_count(100).build().unwrap());
        let mut calls = 0;
        let poisoned = move |_t: f64, _s: &AttitudeState| {
            calls += 1;
            if calls > 10 { Vector3::new(f64::NAN, 0.0, 0.0) } else { Vector3::zeros() }
        };
        let out = Simulation::new(&sc).unwrap().with_disturbance(Box::new(poisoned)).run().unwrap();
        assert!(matches!(out.error(), Some(SimError::NumericDivergence { .. })));
        assert_eq!(out.trajectory.len(), 11);
        assert!(out.trajectory.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn cancellation_keeps_partial_trajectory() {
        let flag = AtomicBool::new(false);
        let sc = scenario(yawed(0.5), SimConfig::default());
        let mut calls = 0;
        let trip = |_t: f64, _s: &AttitudeState| {
            calls += 1;
            if calls == 5 {
                flag.store(true, Ordering::Relaxed);
            }
            Vector3::zeros()
        };
        let out = Simulation::new(&sc)
            .unwrap()
            .with_disturbance(Box::new(trip))
            .with_cancel(&flag)
            .run()
            .unwrap();
        assert_eq!(out.status, RunStatus::Cancelled);
        assert_eq!(out.trajectory.steps(), 5);
    }

    #[test]
    fn end_time_stops_early() {
        let config = SimConfig::builder().dt(0.1).step_count(10_000).end_time(2.0).build().unwrap();
        let out = simulate(&scenario(yawed(0.2), config)).unwrap();
        assert_eq!(out.trajectory.steps(), 20);
        assert_relative_eq!(out.trajectory.final_state().unwrap().time, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn null_source_leaves_free_tumble_untouched() {
        let initial = AttitudeState::new(0.0, UnitQuaternion::identity(), Vector3::new(0.3, 0.05, 0.2));
        let config = SimConfig::builder()
            .control_law(ControlLawKind::Passive)
            .dt(0.05)
            .step_count(400)
            .build()
            .unwrap();
        let sc = scenario(initial, config);
        let out = Simulation::new(&sc)
            .unwrap()
            .with_disturbance(Box::new(NoDisturbance))
            .run()
            .unwrap();
        assert!(out.trajectory.records().iter().all(|r| r.disturbance == Vector3::zeros() && r.net == Vector3::zeros()));
        let e0 = kinetic_energy(&out.trajectory.states()[0], &sc.inertia);
        let e1 = kinetic_energy(out.trajectory.final_state().unwrap(), &sc.inertia);
        assert_relative_eq!(e1, e0, max_relative = 1e-8);
    }

    #[test]
    fn constant_disturbance_recorded() {
        let config = SimConfig::builder()
            .control_law(ControlLawKind::Passive)
            .disturbance(DisturbanceConfig::Constant { torque: [0.0, 0.0, 0.08] })
            .dt(0.1)
            .step_count(10)
            .build()
            .unwrap();
        let out = simulate(&scenario(AttitudeState::at_rest(), config)).unwrap();
        let r = out.trajectory.records()[0];
        assert_eq!(r.disturbance, Vector3::new(0.0, 0.0, 0.08));
        assert_eq!(r.net, r.disturbance);
        // ω_z = τ_z t / I_zz
        assert_relative_eq!(out.trajectory.final_state().unwrap().omega.z, 0.08 * 1.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn custom_law_and_extra_source() {
        struct Brake;
        impl ControlLaw for Brake {
            fn commanded_torque(&mut self, s: &AttitudeState, _r: &ControlReference, _g: &ControlGains, _dt: f64) -> Vector3<f64> {
                -s.omega
            }
        }
        let initial = AttitudeState::new(0.0, UnitQuaternion::identity(), Vector3::new(0.2, 0.0, 0.0));
        let sc = scenario(initial, SimConfig::builder().dt(0.1).step_count(500).build().unwrap());
        let out = Simulation::new(&sc)
            .unwrap()
            .with_law(Box::new(Brake))
            .with_disturbance(Box::new(ConstantDisturbance::new(Vector3::zeros())))
            .run()
            .unwrap();
        let e0 = kinetic_energy(&out.trajectory.states()[0], &sc.inertia);
        let e1 = kinetic_energy(out.trajectory.final_state().unwrap(), &sc.inertia);
        assert!(e1 < 1e-3 * e0);
    }

    #[test]
    fn settle_event_reported() {
        let config = SimConfig::builder()
            .gains(ControlGains::pd(2.0, 8.0))
            .integrator(Integrator::Rk4)
            .dt(0.1)
            .step_count(2000)
            .build()
            .unwrap();
        let sc = scenario(yawed(0.5), config);
        let out = Simulation::new(&sc)
            .unwrap()
            .with_detector(Box::new(SettleDetector::new(0.01)))
            .run()
            .unwrap();
        let settled = out.events.iter().find(|e| matches!(e.kind, EventKind::Settled { .. }));
        let t = settled.map(|e| e.time).unwrap();
        assert!(t > 1.0 && t < 200.0);
        assert_eq!(out.trajectory.settling_time(&sc.reference, 0.01), Some(t));
    }
}
