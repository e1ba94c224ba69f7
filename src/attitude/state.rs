use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Allowed deviation of a user-supplied quaternion from unit norm before it is
/// rejected rather than normalized.
pub const UNIT_NORM_TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Rotational state
// ---------------------------------------------------------------------------

/// Attitude state at a single instant.
/// Frame: `quat` rotates body-frame vectors into the inertial frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeState {
    pub time: f64,                  // s
    pub quat: UnitQuaternion<f64>,  // body→inertial rotation
    pub omega: Vector3<f64>,        // rad/s, body frame angular velocity
}

impl AttitudeState {
    pub fn new(time: f64, quat: UnitQuaternion<f64>, omega: Vector3<f64>) -> Self {
        Self { time, quat, omega }
    }

    /// Identity attitude, at rest, t = 0.
    pub fn at_rest() -> Self {
        Self::new(0.0, UnitQuaternion::identity(), Vector3::zeros())
    }

    /// Build from raw `[w, x, y, z]` components.
    ///
    /// The quaternion must already be unit within [`UNIT_NORM_TOL`]; it is then
    /// normalized exactly. Anything further off is a configuration error.
    pub fn from_components(
        time: f64,
        wxyz: [f64; 4],
        omega: [f64; 3],
    ) -> Result<Self, SimError> {
        let raw = Quaternion::new(wxyz[0], wxyz[1], wxyz[2], wxyz[3]);
        let norm = raw.norm();
        if !norm.is_finite() || (norm - 1.0).abs() > UNIT_NORM_TOL {
            return Err(SimError::InvalidConfiguration(format!(
                "initial quaternion norm {norm} is not 1"
            )));
        }
        let omega = Vector3::from(omega);
        if !time.is_finite() || omega.iter().any(|w| !w.is_finite()) {
            return Err(SimError::InvalidConfiguration(
                "initial time and angular velocity must be finite".into(),
            ));
        }
        Ok(Self::new(time, UnitQuaternion::new_normalize(raw), omega))
    }

    /// Advance by a derivative scaled by dt (RK4 stages).
    pub fn apply(&self, d: &Deriv, dt: f64) -> AttitudeState {
        // Intermediate stages only need a usable rotation; the real
        // post-condition is enforced once per step in `kinematics::renormalize`.
        let q_raw = self.quat.quaternion() + d.dquat * dt;
        AttitudeState {
            time: self.time + dt,
            quat: UnitQuaternion::new_normalize(q_raw),
            omega: self.omega + d.domega * dt,
        }
    }

    /// True when every component of the state is finite.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.quat.coords.iter().all(|c| c.is_finite())
            && self.omega.iter().all(|w| w.is_finite())
    }

    /// Norm of the stored quaternion (1 up to round-off).
    pub fn quat_norm(&self) -> f64 {
        self.quat.quaternion().norm()
    }

    /// Angle of the rotation separating this attitude from `target`, rad in [0, π].
    pub fn angle_to(&self, target: &UnitQuaternion<f64>) -> f64 {
        rotation_angle(&(self.quat.inverse() * target))
    }
}

/// Rotation angle of `q`, rad in [0, π].
///
/// Uses atan2 of the vector and scalar parts, which stays accurate near zero
/// where `2·acos(w)` loses about half the significant digits.
pub fn rotation_angle(q: &UnitQuaternion<f64>) -> f64 {
    2.0 * q.imag().norm().atan2(q.scalar().abs())
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Deriv {
    pub dquat: Quaternion<f64>,   // NOT unit, raw quaternion derivative
    pub domega: Vector3<f64>,     // angular acceleration, body frame
}
