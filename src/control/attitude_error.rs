use nalgebra::{UnitQuaternion, Vector3};

use super::reference::ControlReference;
use crate::attitude::AttitudeState;

/// Tracking error between the current attitude and a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeError {
    /// q_err = q_ref⁻¹ ⊗ q, with non-negative scalar part.
    pub quat: UnitQuaternion<f64>,
    /// Body-frame angular velocity error ω − ω_ref.
    pub rate: Vector3<f64>,
    /// True when q_err was negated to take the short way round.
    pub flipped: bool,
}

impl AttitudeError {
    /// Vector (imaginary) part of the sign-corrected error quaternion.
    pub fn vector(&self) -> Vector3<f64> {
        self.quat.imag()
    }

    /// Small-angle rotation vector, 2·vec(q_err). Exact direction, magnitude
    /// 2·sin(θ/2).
    pub fn small_angle(&self) -> Vector3<f64> {
        self.vector() * 2.0
    }
}

/// Compute the attitude and rate error of `state` relative to `reference`.
///
/// q and −q describe the same rotation. Feeding a negative-scalar error into a
/// linear law drives the body the long way round (unwinding), so the error is
/// negated whenever its scalar part is negative.
pub fn attitude_error(state: &AttitudeState, reference: &ControlReference) -> AttitudeError {
    let raw = reference.quat.inverse() * state.quat;
    let flipped = raw.scalar() < 0.0;
    let quat = if flipped {
        UnitQuaternion::new_unchecked(-raw.into_inner())
    } else {
        raw
    };
    // Reference rate is given in the reference frame; express it in the body frame.
    let omega_ref_body = quat.inverse_transform_vector(&reference.rate());
    AttitudeError {
        quat,
        rate: state.omega - omega_ref_body,
        flipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(quat: UnitQuaternion<f64>, omega: Vector3<f64>) -> AttitudeState {
        AttitudeState::new(0.0, quat, omega)
    }

    #[test]
    fn zero_error_on_reference() {
        let q = UnitQuaternion::from_euler_angles(0.4, -1.1, 2.0);
        let w = Vector3::new(0.01, 0.02, -0.03);
        let e = attitude_error(&state(q, w), &ControlReference::hold(q).with_rate(w));
        assert_relative_eq!(e.vector(), Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(e.rate, Vector3::zeros(), epsilon = 1e-12);
        assert!(!e.flipped);
    }

    #[test]
    fn small_rotation_maps_to_angle() {
        let q = UnitQuaternion::from_scaled_axis(Vector3::new(0.0, 0.01, 0.0));
        let e = attitude_error(&state(q, Vector3::zeros()), &ControlReference::identity());
        assert_relative_eq!(e.small_angle().y, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn negative_scalar_is_flipped() {
        // 200 deg about +x from the reference, i.e. 160 deg the other way
        let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 200_f64.to_radians());
        assert!(q.scalar() < 0.0);
        let e = attitude_error(&state(UnitQuaternion::identity(), Vector3::zeros()), &ControlReference::hold(q));
        assert!(e.flipped);
        assert!(e.quat.scalar() >= 0.0);
        // Body sits +160 deg about x from the reference → error vector along +x
        assert!(e.vector().x > 0.0);
    }

    #[test]
    fn double_cover_reference_gives_same_error() {
        let q = UnitQuaternion::from_euler_angles(0.3, 0.2, 0.1);
        let neg = UnitQuaternion::new_unchecked(-q.into_inner());
        let s = state(UnitQuaternion::identity(), Vector3::zeros());
        let a = attitude_error(&s, &ControlReference::hold(q));
        let b = attitude_error(&s, &ControlReference::hold(neg));
        assert_relative_eq!(a.vector(), b.vector(), epsilon = 1e-12);
        assert_ne!(a.flipped, b.flipped);
    }

    #[test]
    fn reference_rate_is_rotated_into_body() {
        // Body yawed 90 deg from reference; reference spins about its x axis
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let r = ControlReference::identity().with_rate(Vector3::new(1.0, 0.0, 0.0));
        let e = attitude_error(&state(q, Vector3::zeros()), &r);
        // Reference x axis is body -y
        assert_relative_eq!(e.rate, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
