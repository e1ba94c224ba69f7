use nalgebra::Vector3;

use crate::attitude::AttitudeState;
use crate::control::ReferenceTrajectory;

/// Torques and flags for one executed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub time: f64,                  // start of the step, s
    pub commanded: Vector3<f64>,    // control law output
    pub applied: Vector3<f64>,      // after actuator limits
    pub disturbance: Vector3<f64>,  // sum of all disturbance sources
    pub net: Vector3<f64>,          // applied + disturbance
    pub saturated: bool,
}

/// Chronological record of a run.
///
/// `states()[0]` is the initial state; executed step `k` produced
/// `states()[k + 1]` from `records()[k]`. Only the driver appends.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    states: Vec<AttitudeState>,
    records: Vec<StepRecord>,
}

impl Trajectory {
    pub(crate) fn new(initial: AttitudeState, capacity: usize) -> Self {
        let mut states = Vec::with_capacity(capacity + 1);
        states.push(initial);
        Self { states, records: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, record: StepRecord, state: AttitudeState) {
        self.records.push(record);
        self.states.push(state);
    }

    pub fn states(&self) -> &[AttitudeState] {
        &self.states
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttitudeState> {
        self.states.iter()
    }

    /// Number of recorded states (executed steps + 1).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true for a trajectory produced by a run.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn steps(&self) -> usize {
        self.records.len()
    }

    pub fn initial_state(&self) -> Option<&AttitudeState> {
        self.states.first()
    }

    pub fn final_state(&self) -> Option<&AttitudeState> {
        self.states.last()
    }

    // -----------------------------------------------------------------------
    // Analysis helpers
    // -----------------------------------------------------------------------

    /// `(time, angle to the active reference)` for every state, rad.
    pub fn pointing_error(&self, reference: &ReferenceTrajectory) -> Vec<(f64, f64)> {
        self.states
            .iter()
            .map(|s| (s.time, s.angle_to(&reference.at(s.time).quat)))
            .collect()
    }

    /// Largest body rate magnitude seen, rad/s.
    pub fn max_rate(&self) -> f64 {
        self.states.iter().map(|s| s.omega.norm()).fold(0.0_f64, f64::max)
    }

    /// Largest applied control torque magnitude, N·m.
    pub fn max_applied_torque(&self) -> f64 {
        self.records.iter().map(|r| r.applied.norm()).fold(0.0_f64, f64::max)
    }

    /// First time after which the pointing error stays below `threshold` rad.
    pub fn settling_time(&self, reference: &ReferenceTrajectory, threshold: f64) -> Option<f64> {
        let errors = self.pointing_error(reference);
        let last_outside = errors.iter().rposition(|(_, e)| *e >= threshold);
        match last_outside {
            None => errors.first().map(|(t, _)| *t),
            Some(i) => errors.get(i + 1).map(|(t, _)| *t),
        }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a AttitudeState;
    type IntoIter = std::slice::Iter<'a, AttitudeState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlReference;
    use nalgebra::UnitQuaternion;

    fn record(t: f64) -> StepRecord {
        StepRecord {
            time: t,
            commanded: Vector3::zeros(),
            applied: Vector3::new(0.0, 0.0, t),
            disturbance: Vector3::zeros(),
            net: Vector3::zeros(),
            saturated: false,
        }
    }

    fn yawing(angles: &[f64]) -> Trajectory {
        let at = |i: usize| {
            AttitudeState::new(
                i as f64,
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles[i]),
                Vector3::new(0.0, 0.0, angles[i]),
            )
        };
        let mut traj = Trajectory::new(at(0), angles.len());
        for i in 1..angles.len() {
            traj.push(record(i as f64 - 1.0), at(i));
        }
        traj
    }

    #[test]
    fn layout() {
        let traj = yawing(&[0.3, 0.2, 0.1]);
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.steps(), 2);
        assert_eq!(traj.initial_state().unwrap().time, 0.0);
        assert_eq!(traj.final_state().unwrap().time, 2.0);
        assert_eq!((&traj).into_iter().count(), 3);
    }

    #[test]
    fn error_series_and_extremes() {
        let traj = yawing(&[0.5, 0.2, 0.05, 0.01]);
        let reference = ReferenceTrajectory::from(ControlReference::identity());
        let err = traj.pointing_error(&reference);
        assert!((err[1].1 - 0.2).abs() < 1e-12);
        assert!((traj.max_rate() - 0.5).abs() < 1e-12);
        assert_eq!(traj.max_applied_torque(), 2.0);
        assert_eq!(traj.settling_time(&reference, 0.1), Some(2.0));
        assert_eq!(traj.settling_time(&reference, 1.0), Some(0.0));
        assert_eq!(traj.settling_time(&reference, 0.001), None);
    }
}
