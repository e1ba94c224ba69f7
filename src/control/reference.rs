use nalgebra::{UnitQuaternion, Vector3};

use crate::error::SimError;

// ---------------------------------------------------------------------------
// Control reference (target attitude)
// ---------------------------------------------------------------------------

/// Target attitude for the control law.
///
/// `omega` is the target body rate expressed in the reference frame; `None`
/// means "hold still" and is treated as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlReference {
    pub quat: UnitQuaternion<f64>,
    pub omega: Option<Vector3<f64>>,
}

impl ControlReference {
    /// Hold the given orientation at zero rate.
    pub fn hold(quat: UnitQuaternion<f64>) -> Self {
        Self { quat, omega: None }
    }

    pub fn identity() -> Self {
        Self::hold(UnitQuaternion::identity())
    }

    pub fn with_rate(mut self, omega: Vector3<f64>) -> Self {
        self.omega = Some(omega);
        self
    }

    /// Target rate, zero when none was given.
    pub fn rate(&self) -> Vector3<f64> {
        self.omega.unwrap_or_else(Vector3::zeros)
    }
}

// ---------------------------------------------------------------------------
// Reference profile over a run
// ---------------------------------------------------------------------------

/// Piecewise-constant schedule of references.
///
/// Each waypoint becomes active at its start time and stays active until the
/// next one. Before the first waypoint the first reference applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTrajectory {
    waypoints: Vec<(f64, ControlReference)>,
}

impl ReferenceTrajectory {
    /// A single reference for the whole run.
    pub fn fixed(reference: ControlReference) -> Self {
        Self { waypoints: vec![(0.0, reference)] }
    }

    /// Schedule from `(start_time, reference)` pairs; start times must be
    /// finite and strictly increasing.
    pub fn schedule(waypoints: Vec<(f64, ControlReference)>) -> Result<Self, SimError> {
        if waypoints.is_empty() {
            return Err(SimError::InvalidConfiguration(
                "reference schedule has no waypoints".into(),
            ));
        }
        if waypoints.iter().any(|(t, _)| !t.is_finite()) {
            return Err(SimError::InvalidConfiguration(
                "reference waypoint times must be finite".into(),
            ));
        }
        if waypoints.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(SimError::InvalidConfiguration(
                "reference waypoint times must be strictly increasing".into(),
            ));
        }
        Ok(Self { waypoints })
    }

    /// Reference active at `time`.
    pub fn at(&self, time: f64) -> &ControlReference {
        // Index of the first waypoint starting after `time`
        let idx = self.waypoints.partition_point(|(t, _)| *t <= time);
        &self.waypoints[idx.saturating_sub(1)].1
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

impl From<ControlReference> for ReferenceTrajectory {
    fn from(reference: ControlReference) -> Self {
        Self::fixed(reference)
    }
}
