use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CellError {
    #[error("Cell matrix contains non-finite entries")]
    NonFinite,
    #[error("Cell matrix is singular (determinant {0:e})")]
    Singular(f64),
}

/// A periodic simulation cell described by three lattice vectors.
///
/// The nine-element box follows the row convention of the many-body framework:
/// elements `0..3` are lattice vector **a**, `3..6` are **b** and `6..9` are **c**.
/// Internally the vectors are stored as the columns of the lattice matrix `H`, so a
/// fractional coordinate `f` maps to the Cartesian vector `H·f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicCell {
    lattice: Matrix3<f64>,
    inverse: Matrix3<f64>,
    orthorhombic: bool,
}

impl PeriodicCell {
    /// Builds a cell from its box and computes the inverse.
    ///
    /// This is the validating constructor; it is meant to be called once per cell
    /// change, never from inside a pair loop.
    pub fn new(box_vectors: [f64; 9]) -> Result<Self, CellError> {
        if box_vectors.iter().any(|v| !v.is_finite()) {
            return Err(CellError::NonFinite);
        }

        let lattice = Matrix3::from_column_slice(&box_vectors);
        let det = lattice.determinant();
        // |det| is bounded by the product of the vector lengths, so the ratio is unit-free.
        let scale = lattice.column_iter().map(|v| v.norm()).product::<f64>();
        if det.abs() <= f64::EPSILON * scale {
            return Err(CellError::Singular(det));
        }
        let inverse = lattice.try_inverse().ok_or(CellError::Singular(det))?;

        Ok(Self::from_matrices(lattice, inverse))
    }

    /// Builds a cell from a box and a caller-supplied inverse.
    ///
    /// `box_inverse` is the row-convention inverse of `box_vectors` (the matrix whose
    /// rows are **a**, **b**, **c**). It is trusted as is; a wrong inverse yields wrong
    /// displacements.
    pub fn from_parts(box_vectors: [f64; 9], box_inverse: [f64; 9]) -> Self {
        // The transpose of a row-major matrix is its column-major reading.
        let lattice = Matrix3::from_column_slice(&box_vectors);
        let inverse = Matrix3::from_column_slice(&box_inverse);
        Self::from_matrices(lattice, inverse)
    }

    pub fn orthorhombic(lx: f64, ly: f64, lz: f64) -> Result<Self, CellError> {
        Self::new([lx, 0.0, 0.0, 0.0, ly, 0.0, 0.0, 0.0, lz])
    }

    fn from_matrices(lattice: Matrix3<f64>, inverse: Matrix3<f64>) -> Self {
        let orthorhombic = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .filter(|(i, j)| i != j)
            .all(|(i, j)| lattice[(i, j)] == 0.0);
        Self {
            lattice,
            inverse,
            orthorhombic,
        }
    }

    pub fn lattice(&self) -> &Matrix3<f64> {
        &self.lattice
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }

    pub fn is_orthorhombic(&self) -> bool {
        self.orthorhombic
    }

    pub fn volume(&self) -> f64 {
        self.lattice.determinant().abs()
    }

    /// Returns the cell with every lattice vector multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            lattice: self.lattice * factor,
            inverse: self.inverse / factor,
            orthorhombic: self.orthorhombic,
        }
    }

    /// Returns the shortest periodic replica of the displacement `d`.
    ///
    /// Fractional coordinates are wrapped into `[-0.5, 0.5]` first. That is exact for an
    /// orthorhombic cell; for a triclinic cell the 26 neighbouring images of the wrapped
    /// vector are searched as well, which finds the true minimum for any cell that is
    /// not pathologically skewed (reduced cells always qualify).
    ///
    /// The chosen image is a fixed lattice translation of `d`, so its derivative with
    /// respect to either endpoint is the identity.
    #[inline]
    pub fn minimum_image(&self, d: &Vector3<f64>) -> Vector3<f64> {
        let fractional = (self.inverse * d).map(|f| f - f.round());
        let wrapped = self.lattice * fractional;
        if self.orthorhombic {
            return wrapped;
        }

        let mut best = wrapped;
        let mut best_sq = wrapped.norm_squared();
        for i in -1i32..=1 {
            for j in -1i32..=1 {
                for k in -1i32..=1 {
                    if i == 0 && j == 0 && k == 0 {
                        continue;
                    }
                    let shift = Vector3::new(f64::from(i), f64::from(j), f64::from(k));
                    let candidate = wrapped + self.lattice * shift;
                    let candidate_sq = candidate.norm_squared();
                    if candidate_sq < best_sq {
                        best = candidate;
                        best_sq = candidate_sq;
                    }
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-10;

    const TRICLINIC_BOX: [f64; 9] = [10.0, 0.0, 0.0, 4.0, 9.0, 0.0, 3.0, 2.0, 8.5];

    fn brute_force_minimum(cell: &PeriodicCell, d: &Vector3<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for i in -4i32..=4 {
            for j in -4i32..=4 {
                for k in -4i32..=4 {
                    let shift = Vector3::new(f64::from(i), f64::from(j), f64::from(k));
                    best = best.min((d + cell.lattice() * shift).norm());
                }
            }
        }
        best
    }

    #[test]
    fn new_computes_true_inverse() {
        let cell = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        let product = cell.lattice() * cell.inverse();
        assert!((product - Matrix3::identity()).norm() < TOLERANCE);
    }

    #[test]
    fn new_rejects_singular_box() {
        let result = PeriodicCell::new([1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(result, Err(CellError::Singular(_))));
    }

    #[test]
    fn singularity_check_is_independent_of_length_unit() {
        let tiny = PeriodicCell::orthorhombic(1e-6, 1e-6, 1e-6).unwrap();
        assert!((tiny.volume() - 1e-18).abs() < 1e-30);

        // c lies in the a-b plane to within rounding of the vector lengths.
        let flat = PeriodicCell::new([1e5, 0.0, 0.0, 0.0, 1e5, 0.0, 1e5, 1e5, 1e-12]);
        assert!(matches!(flat, Err(CellError::Singular(_))));
    }

    #[test]
    fn new_rejects_non_finite_box() {
        let result = PeriodicCell::new([f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(result, Err(CellError::NonFinite));
    }

    #[test]
    fn from_parts_matches_validating_constructor() {
        // Row-convention inverse of the triclinic box above.
        let rows = Matrix3::from_row_slice(&TRICLINIC_BOX);
        let row_inverse = rows.try_inverse().unwrap();
        let mut box_inverse = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                box_inverse[3 * i + j] = row_inverse[(i, j)];
            }
        }

        let trusted = PeriodicCell::from_parts(TRICLINIC_BOX, box_inverse);
        let computed = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        assert!((trusted.inverse() - computed.inverse()).norm() < TOLERANCE);
        assert!(!trusted.is_orthorhombic());
    }

    #[test]
    fn orthorhombic_cell_is_detected() {
        let cell = PeriodicCell::orthorhombic(10.0, 12.0, 14.0).unwrap();
        assert!(cell.is_orthorhombic());
        assert!((cell.volume() - 1680.0).abs() < TOLERANCE);
    }

    #[test]
    fn orthorhombic_minimum_image_wraps_each_axis() {
        let cell = PeriodicCell::orthorhombic(10.0, 10.0, 10.0).unwrap();
        let image = cell.minimum_image(&Vector3::new(6.0, -13.0, 4.0));
        assert!((image - Vector3::new(-4.0, -3.0, 4.0)).norm() < TOLERANCE);
    }

    #[test]
    fn minimum_image_leaves_short_vectors_untouched() {
        let cell = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        let d = Vector3::new(1.0, -0.5, 0.25);
        assert!((cell.minimum_image(&d) - d).norm() < TOLERANCE);
    }

    #[test]
    fn triclinic_minimum_image_beats_naive_fractional_rounding() {
        let cell = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        let d = Vector3::new(6.5, -4.4, -3.9);

        let naive = cell.lattice() * (cell.inverse() * d).map(|f| f - f.round());
        let image = cell.minimum_image(&d);

        assert!(image.norm() < naive.norm() - 1.0);
        assert!((image - Vector3::new(-0.5, -2.4, 4.6)).norm() < 1e-9);
    }

    #[test]
    fn triclinic_minimum_image_matches_brute_force_search() {
        let cell = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        let displacements = [
            Vector3::new(7.0, 6.0, 4.0),
            Vector3::new(-13.0, 5.0, 9.0),
            Vector3::new(2.0, 8.0, 1.0),
            Vector3::new(5.5, 7.0, -4.0),
            Vector3::new(-21.0, 17.5, -12.25),
        ];
        for d in displacements {
            let image = cell.minimum_image(&d);
            assert!((image.norm() - brute_force_minimum(&cell, &d)).abs() < 1e-9);

            // The image differs from d by a whole lattice translation.
            let shift = cell.inverse() * (d - image);
            assert!(shift.iter().all(|n| (n - n.round()).abs() < 1e-9));
        }
    }

    #[test]
    fn scaled_cell_scales_images() {
        let cell = PeriodicCell::new(TRICLINIC_BOX).unwrap();
        let scaled = cell.scaled(1.1);
        let d = Vector3::new(6.5, -4.4, -3.9);
        let image = scaled.minimum_image(&(d * 1.1));
        assert!((image - cell.minimum_image(&d) * 1.1).norm() < 1e-9);
    }
}
