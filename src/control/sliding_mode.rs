use nalgebra::Vector3;

use super::attitude_error::{attitude_error, AttitudeError};
use super::law::{ControlGains, ControlLaw};
use super::reference::ControlReference;
use crate::attitude::{AttitudeState, InertiaProperties};

// ---------------------------------------------------------------------------
// Sliding-mode law
// ---------------------------------------------------------------------------

/// Boundary-layer sliding-mode controller.
///
/// Sliding surface  s = ω_err + Λ ∘ vec(q_err),  Λ = Kp / Kd per axis.
/// Torque           τ = ω × Iω − ω_r × Iω_r − Kd ∘ s − η ∘ sat(s / φ),
///                  ω_r the reference rate in the body frame.
///
/// The linear part −Kd ∘ s reproduces the PD law; the switching term adds
/// robustness to bounded disturbances. With inertia known, the gyroscopic
/// term cancels the ω × Iω coupling in excess of what the reference motion
/// itself carries, so it vanishes when the body tracks the reference.
#[derive(Debug, Clone)]
pub struct SlidingModeLaw {
    pub switching_gain: Vector3<f64>,   // η, N·m
    pub boundary_layer: f64,            // φ, width of the linear zone around s = 0
    inertia: Option<InertiaProperties>,
}

impl SlidingModeLaw {
    pub fn new(switching_gain: Vector3<f64>, boundary_layer: f64) -> Self {
        Self {
            switching_gain,
            boundary_layer: boundary_layer.abs().max(f64::EPSILON),
            inertia: None,
        }
    }

    /// Enable gyroscopic compensation with the body inertia.
    pub fn with_inertia(mut self, inertia: InertiaProperties) -> Self {
        self.inertia = Some(inertia);
        self
    }

    /// Sliding variable for the given state.
    pub fn surface(
        &self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        sliding_variable(&err, gains)
    }
}

fn sliding_variable(err: &AttitudeError, gains: &ControlGains) -> Vector3<f64> {
    let slope = gains.kp.zip_map(&gains.kd, |kp, kd| if kd > 0.0 { kp / kd } else { kp });
    err.rate + slope.component_mul(&err.vector())
}

impl ControlLaw for SlidingModeLaw {
    fn commanded_torque(
        &mut self,
        state: &AttitudeState,
        reference: &ControlReference,
        gains: &ControlGains,
        _dt: f64,
    ) -> Vector3<f64> {
        let err = attitude_error(state, reference);
        let s = sliding_variable(&err, gains);
        let phi = self.boundary_layer;
        let switching = s.map(|si| (si / phi).clamp(-1.0, 1.0));

        // Coupling relative to the reference rate; zero when tracking exactly
        let gyroscopic = match &self.inertia {
            Some(i) => {
                let w = state.omega;
                let w_ref = w - err.rate;
                w.cross(&i.apply(&w)) - w_ref.cross(&i.apply(&w_ref))
            }
            None => Vector3::zeros(),
        };

        gyroscopic - gains.kd.component_mul(&s) - self.switching_gain.component_mul(&switching)
    }

    fn name(&self) -> &str {
        "SlidingMode"
    }
}
