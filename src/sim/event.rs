use crate::attitude::AttitudeState;
use crate::control::ControlReference;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Actuators started clipping the commanded torque.
    SaturationOnset,
    /// Commanded torque back inside the limits.
    SaturationCleared,
    /// Pointing error dropped below the detector threshold (rad).
    Settled { threshold: f64 },
    /// Pointing error rose back above the threshold after settling.
    Unsettled { threshold: f64 },
    Custom(String),
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(
        &mut self,
        prev: &AttitudeState,
        current: &AttitudeState,
        reference: &ControlReference,
    ) -> Option<EventKind>;
}

/// Fires when the pointing error crosses `threshold` in either direction.
#[derive(Debug, Clone)]
pub struct SettleDetector {
    pub threshold: f64,  // rad
    settled: bool,
}

impl SettleDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, settled: false }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

impl EventDetector for SettleDetector {
    fn check(
        &mut self,
        _prev: &AttitudeState,
        current: &AttitudeState,
        reference: &ControlReference,
    ) -> Option<EventKind> {
        let inside = current.angle_to(&reference.quat) < self.threshold;
        match (self.settled, inside) {
            (false, true) => {
                self.settled = true;
                Some(EventKind::Settled { threshold: self.threshold })
            }
            (true, false) => {
                self.settled = false;
                Some(EventKind::Unsettled { threshold: self.threshold })
            }
            _ => None,
        }
    }
}

/// Fires once when the body rate magnitude first drops below `rate` (rad/s).
#[derive(Debug, Clone)]
pub struct RateDetector {
    pub rate: f64,
    fired: bool,
}

impl RateDetector {
    pub fn new(rate: f64) -> Self {
        Self { rate, fired: false }
    }
}

impl EventDetector for RateDetector {
    fn check(
        &mut self,
        prev: &AttitudeState,
        current: &AttitudeState,
        _reference: &ControlReference,
    ) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.omega.norm() >= self.rate && current.omega.norm() < self.rate {
            self.fired = true;
            Some(EventKind::Custom(format!("Rate below {:.4} rad/s", self.rate)))
        } else {
            None
        }
    }
}

/// Tracks the saturation flag step to step and reports edges.
#[derive(Debug, Clone, Default)]
pub(crate) struct SaturationEdges {
    active: bool,
}

impl SaturationEdges {
    pub(crate) fn update(&mut self, saturated: bool) -> Option<EventKind> {
        let edge = match (self.active, saturated) {
            (false, true) => Some(EventKind::SaturationOnset),
            (true, false) => Some(EventKind::SaturationCleared),
            _ => None,
        };
        self.active = saturated;
        edge
    }
}
