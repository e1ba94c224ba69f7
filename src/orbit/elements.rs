use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use super::gravity::{MU_EARTH, R_EARTH};
use crate::error::SimError;

/// Classical Keplerian orbital elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, m
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // right ascension of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

impl KeplerianElements {
    /// Circular orbit at `altitude` (m above the equatorial radius) and `inc` (rad).
    pub fn circular(altitude: f64, inc: f64) -> Self {
        KeplerianElements {
            sma: R_EARTH + altitude,
            ecc: 0.0,
            inc,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        }
    }

    /// Bound orbit whose periapsis clears the Earth's surface.
    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [self.sma, self.ecc, self.inc, self.raan, self.argp, self.true_anom]
            .iter()
            .all(|v| v.is_finite());
        if !finite || !(0.0..1.0).contains(&self.ecc) || self.sma * (1.0 - self.ecc) <= R_EARTH {
            return Err(SimError::InvalidConfiguration(format!(
                "orbit sma={} m ecc={} is not a bound orbit above the surface",
                self.sma, self.ecc
            )));
        }
        Ok(())
    }

    /// ECI position and velocity.
    pub fn to_state_vector(&self) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let (sin_nu, cos_nu) = self.true_anom.sin_cos();
        let r = p / (1.0 + self.ecc * cos_nu);

        // Perifocal (PQW) frame
        let r_pqw = Vector3::new(r * cos_nu, r * sin_nu, 0.0);
        let sqrt_mu_p = (MU_EARTH / p).sqrt();
        let v_pqw = Vector3::new(-sqrt_mu_p * sin_nu, sqrt_mu_p * (self.ecc + cos_nu), 0.0);

        // PQW → ECI: Rz(raan) · Rx(inc) · Rz(argp)
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), self.raan)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.inc)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.argp);

        (rot * r_pqw, rot * v_pqw)
    }

    /// Orbital period, s.
    pub fn period(&self) -> f64 {
        2.0 * std::f64::consts::PI * (self.sma.powi(3) / MU_EARTH).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_orbit_speed() {
        let alt = 400_000.0;
        let orbit = KeplerianElements::circular(alt, 0.0);
        let (pos, vel) = orbit.to_state_vector();
        let expected = (MU_EARTH / (R_EARTH + alt)).sqrt();
        assert!((vel.norm() - expected).abs() < 1e-6, "Circular orbit speed mismatch");
        assert!(pos.dot(&vel).abs() < 1e-3, "velocity must be perpendicular to radius");
    }

    #[test]
    fn inclination_tilts_velocity() {
        let inc = 51.6_f64.to_radians();
        let (_, vel) = KeplerianElements::circular(400_000.0, inc).to_state_vector();
        let tilt = (vel.z / vel.norm()).asin();
        assert!((tilt - inc).abs() < 1e-9);
    }

    #[test]
    fn periapsis_radius() {
        let orbit = KeplerianElements { ecc: 0.1, ..KeplerianElements::circular(1_000_000.0, 0.3) };
        let (pos, _) = orbit.to_state_vector();
        assert!((pos.norm() - orbit.sma * 0.9).abs() < 1e-6);
    }

    #[test]
    fn leo_period() {
        let orbit = KeplerianElements::circular(400_000.0, 0.0);
        let period = orbit.period();
        // ISS period ~92 min = ~5540 s
        assert!(period > 5400.0 && period < 5700.0, "LEO period should be ~92 min, got {:.0} s", period);
    }

    #[test]
    fn rejects_suborbital() {
        assert!(KeplerianElements::circular(-100.0, 0.0).validate().is_err());
        let hyperbolic = KeplerianElements { ecc: 1.2, ..KeplerianElements::circular(500_000.0, 0.0) };
        assert!(hyperbolic.validate().is_err());
        assert!(KeplerianElements::circular(500_000.0, 0.0).validate().is_ok());
    }
}
