use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative tolerance for the symmetry check on off-diagonal products.
const SYMMETRY_TOL: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InertiaError {
    #[error("inertia matrix contains non-finite entries")]
    NonFinite,
    #[error("inertia matrix is not symmetric")]
    NotSymmetric,
    #[error("inertia matrix is not positive-definite")]
    NotPositiveDefinite,
    #[error("inertia matrix is singular")]
    Singular,
}

// ---------------------------------------------------------------------------
// Rigid-body inertia tensor (body frame)
// ---------------------------------------------------------------------------

/// Body-frame moment of inertia, kg·m².
///
/// Construction validates symmetry and positive-definiteness and caches the
/// inverse, so the kinematics never has to invert per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Matrix3<f64>", into = "Matrix3<f64>")]
pub struct InertiaProperties {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl InertiaProperties {
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, InertiaError> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(InertiaError::NonFinite);
        }
        let scale = matrix.abs().max().max(f64::MIN_POSITIVE);
        if (matrix - matrix.transpose()).abs().max() > SYMMETRY_TOL * scale {
            return Err(InertiaError::NotSymmetric);
        }
        // Cholesky only succeeds for symmetric positive-definite matrices.
        if matrix.cholesky().is_none() {
            return Err(InertiaError::NotPositiveDefinite);
        }
        let inverse = matrix.try_inverse().ok_or(InertiaError::Singular)?;
        Ok(Self { matrix, inverse })
    }

    /// Principal-axis inertia `diag(ixx, iyy, izz)`.
    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, InertiaError> {
        Self::new(Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)))
    }

    /// Full tensor from moments and products of inertia.
    pub fn from_moments(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, InertiaError> {
        Self::new(Matrix3::new(
            ixx, ixy, ixz, //
            ixy, iyy, iyz, //
            ixz, iyz, izz,
        ))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }

    /// Diagonal moments `[Ixx, Iyy, Izz]`.
    pub fn principal_moments(&self) -> Vector3<f64> {
        self.matrix.diagonal()
    }

    /// I·v
    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.matrix * v
    }

    /// I⁻¹·v
    pub fn solve(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.inverse * v
    }
}

impl TryFrom<Matrix3<f64>> for InertiaProperties {
    type Error = InertiaError;

    fn try_from(matrix: Matrix3<f64>) -> Result<Self, Self::Error> {
        Self::new(matrix)
    }
}

impl From<InertiaProperties> for Matrix3<f64> {
    fn from(inertia: InertiaProperties) -> Self {
        inertia.matrix
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
