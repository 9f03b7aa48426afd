use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::LATTICE_TOLERANCE;
use crate::error::PercolationError;

/// Supercell lattice vectors, stored as the columns of a 3×3 matrix.
///
/// Serialises as three row triples `[[ax, ay, az], [bx, by, bz], [cx, cy, cz]]`,
/// the layout site-table headers use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct LatticeVectors {
    direct: Matrix3<f64>,
}

impl LatticeVectors {
    /// Construct from basis vectors given as matrix columns.
    pub fn from_columns(direct: Matrix3<f64>) -> Self {
        LatticeVectors { direct }
    }

    /// Construct from three basis vectors.
    pub fn from_vectors(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Self {
        LatticeVectors {
            direct: Matrix3::from_columns(&[a, b, c]),
        }
    }

    /// Orthorhombic box with edge lengths `a`, `b`, `c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self {
        LatticeVectors {
            direct: Matrix3::from_diagonal(&Vector3::new(a, b, c)),
        }
    }

    pub fn direct(&self) -> &Matrix3<f64> {
        &self.direct
    }

    /// Basis vector `n` (0, 1 or 2).
    pub fn vector(&self, n: usize) -> Vector3<f64> {
        self.direct.column(n).into_owned()
    }

    pub fn volume(&self) -> f64 {
        self.direct.determinant().abs()
    }

    /// Fail when the vectors are linearly dependent.
    pub fn validate(&self) -> Result<(), PercolationError> {
        let determinant = self.direct.determinant();
        if !determinant.is_finite() || determinant.abs() < LATTICE_TOLERANCE {
            return Err(PercolationError::SingularLattice { determinant });
        }
        Ok(())
    }
}

impl From<[[f64; 3]; 3]> for LatticeVectors {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        LatticeVectors::from_vectors(
            Vector3::from(rows[0]),
            Vector3::from(rows[1]),
            Vector3::from(rows[2]),
        )
    }
}

impl From<LatticeVectors> for [[f64; 3]; 3] {
    fn from(lattice: LatticeVectors) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (n, row) in rows.iter_mut().enumerate() {
            let v = lattice.vector(n);
            *row = [v.x, v.y, v.z];
        }
        rows
    }
}

/// Minimum-image distance between doubled-fractional coordinates.
///
/// The metric tensor is built from half-scaled lattice vectors because doubled
/// coordinates span a length of 2 per lattice vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeMetric {
    metric: Matrix3<f64>,
}

impl LatticeMetric {
    pub fn new(lattice: &LatticeVectors) -> Self {
        let half = lattice.direct() / 2.0;
        LatticeMetric {
            metric: half.transpose() * half,
        }
    }

    pub fn metric_tensor(&self) -> &Matrix3<f64> {
        &self.metric
    }

    /// Wrapped displacement from `to` towards `from`, each component in `[-1, 1)`.
    ///
    /// Argument order matters on the half-box boundary; callers always pass the
    /// site being scanned first.
    pub fn minimum_image(&self, from: &Vector3<f64>, to: &Vector3<f64>) -> Vector3<f64> {
        (from - to).map(wrap_component)
    }

    /// Periodic distance between two sites.
    pub fn distance(&self, from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
        let d = self.minimum_image(from, to);
        let m = &self.metric;
        let (x, y, z) = (d.x, d.y, d.z);
        let squared = m[(0, 0)] * x * x
            + m[(1, 1)] * y * y
            + m[(2, 2)] * z * z
            + 2.0 * m[(0, 1)] * x * y
            + 2.0 * m[(0, 2)] * x * z
            + 2.0 * m[(1, 2)] * y * z;
        squared.max(0.0).sqrt()
    }
}

// Shift by 3 keeps the argument positive for coordinates in [-1, 1).
fn wrap_component(delta: f64) -> f64 {
    let d = delta + 3.0;
    d - 2.0 * (d / 2.0).floor() - 1.0
}
