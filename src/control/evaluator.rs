use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::law::{ControlGains, ControlLaw, PassiveLaw};
use super::lqr::{self, LqrLaw, LqrWeights};
use super::pd::PdLaw;
use super::pid::PidLaw;
use super::reference::ControlReference;
use super::saturation::ActuatorLimits;
use super::sliding_mode::SlidingModeLaw;
use crate::attitude::{AttitudeState, InertiaProperties};
use crate::error::SimError;

// ---------------------------------------------------------------------------
// Control law selection
// ---------------------------------------------------------------------------

/// Control law variant, chosen at configuration time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ControlLawKind {
    /// No control torque.
    Passive,
    #[default]
    Pd,
    Pid { integral_limit: f64 },
    /// Gains are designed from these weights; configured Kp/Kd are replaced.
    Lqr { q_attitude: [f64; 3], q_rate: [f64; 3], r: [f64; 3] },
    SlidingMode { switching_gain: [f64; 3], boundary_layer: f64 },
}

/// Torque produced by one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub commanded: Vector3<f64>,  // law output
    pub applied: Vector3<f64>,    // after actuator limits
    pub saturated: bool,
}

impl Default for ControlOutput {
    fn default() -> Self {
        Self {
            commanded: Vector3::zeros(),
            applied: Vector3::zeros(),
            saturated: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator: law + gains + actuator limits
// ---------------------------------------------------------------------------

pub struct ControlLawEvaluator {
    law: Box<dyn ControlLaw>,
    gains: ControlGains,
    limits: Option<ActuatorLimits>,
}

impl ControlLawEvaluator {
    pub fn new(law: Box<dyn ControlLaw>, gains: ControlGains, limits: Option<ActuatorLimits>) -> Self {
        Self { law, gains, limits }
    }

    /// Build the configured law. LQR designs its gains from the weights and
    /// the principal inertia; sliding mode gets the inertia for gyroscopic
    /// compensation.
    pub fn from_kind(
        kind: &ControlLawKind,
        gains: ControlGains,
        limits: Option<ActuatorLimits>,
        inertia: &InertiaProperties,
    ) -> Result<Self, SimError> {
        gains.validate()?;
        let (law, gains): (Box<dyn ControlLaw>, ControlGains) = match kind {
            ControlLawKind::Passive => (Box::new(PassiveLaw), gains),
            ControlLawKind::Pd => (Box::new(PdLaw), gains),
            ControlLawKind::Pid { integral_limit } => {
                if !(integral_limit.is_finite() && *integral_limit > 0.0) {
                    return Err(SimError::InvalidConfiguration(
                        "PID integral limit must be finite and > 0".into(),
                    ));
                }
                (Box::new(PidLaw::new(*integral_limit)), gains)
            }
            ControlLawKind::Lqr { q_attitude, q_rate, r } => {
                let weights = LqrWeights {
                    q_attitude: Vector3::from(*q_attitude),
                    q_rate: Vector3::from(*q_rate),
                    r: Vector3::from(*r),
                };
                (Box::new(LqrLaw), lqr::design(&weights, inertia)?)
            }
            ControlLawKind::SlidingMode { switching_gain, boundary_layer } => {
                let eta = Vector3::from(*switching_gain);
                if eta.iter().any(|g| !(g.is_finite() && *g >= 0.0))
                    || !(boundary_layer.is_finite() && *boundary_layer > 0.0)
                {
                    return Err(SimError::InvalidConfiguration(
                        "sliding-mode gains must be >= 0 and boundary layer > 0".into(),
                    ));
                }
                let law = SlidingModeLaw::new(eta, *boundary_layer).with_inertia(inertia.clone());
                (Box::new(law), gains)
            }
        };
        Ok(Self::new(law, gains, limits))
    }

    /// One control cycle: evaluate the law, then apply actuator limits.
    pub fn evaluate(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        dt: f64,
    ) -> ControlOutput {
        let commanded = self.law.commanded_torque(state, reference, &self.gains, dt);
        let (applied, saturated) = match &self.limits {
            Some(limits) => limits.saturate(&commanded),
            None => (commanded, false),
        };
        if saturated {
            trace!(t = state.time, ?commanded, ?applied, "actuator saturation");
        }
        ControlOutput { commanded, applied, saturated }
    }

    pub fn reset(&mut self) {
        self.law.reset();
    }

    pub fn name(&self) -> &str {
        self.law.name()
    }

    pub fn gains(&self) -> &ControlGains {
        &self.gains
    }

    pub fn limits(&self) -> Option<&ActuatorLimits> {
        self.limits.as_ref()
    }
}

impl std::fmt::Debug for ControlLawEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLawEvaluator")
            .field("law", &self.law.name())
            .field("gains", &self.gains)
            .field("limits", &self.limits)
            .finish()
    }
}
