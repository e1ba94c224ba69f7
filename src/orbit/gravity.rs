use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Earth gravity model (ECI frame)
// ---------------------------------------------------------------------------

pub const MU_EARTH: f64 = 3.986_004_418e14;  // m^3/s^2
pub const R_EARTH: f64 = 6_378_137.0;        // equatorial radius, m
pub const J2_EARTH: f64 = 1.082_63e-3;

/// Point-mass gravitational acceleration. `pos` in ECI, m.
pub fn gravity_pointmass_eci(pos: &Vector3<f64>) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    -MU_EARTH / (r * r * r) * pos
}

/// Point-mass plus J2 oblateness acceleration. `pos` in ECI, m.
pub fn gravity_j2_eci(pos: &Vector3<f64>) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    let r2 = r * r;
    let z2 = pos.z * pos.z;

    let mu_over_r3 = MU_EARTH / (r2 * r);
    let j2_coeff = 1.5 * J2_EARTH * R_EARTH * R_EARTH / r2;

    let xy_factor = mu_over_r3 * (1.0 + j2_coeff * (1.0 - 5.0 * z2 / r2));
    let z_factor = mu_over_r3 * (1.0 + j2_coeff * (3.0 - 5.0 * z2 / r2));

    Vector3::new(-xy_factor * pos.x, -xy_factor * pos.y, -z_factor * pos.z)
}

/// Square of the circular orbital rate at radius `r`, n² = μ / r³ (rad²/s²).
pub fn mean_motion_squared(r: f64) -> f64 {
    MU_EARTH / (r * r * r)
}
