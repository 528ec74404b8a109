use nalgebra::{Matrix3, Vector3};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Symmetric virial tensor `W = Σ d ⊗ F` accumulated over interacting pairs.
///
/// `d` is the minimum-image displacement from the second atom to the first and `F` the
/// force on the first atom. Under an isotropic scaling `x → (1 + δ)x` the energy changes
/// by `−trace(W)·δ` to first order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Virial {
    tensor: Matrix3<f64>,
}

impl Default for Virial {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Virial {
    pub fn zeros() -> Self {
        Self {
            tensor: Matrix3::zeros(),
        }
    }

    /// Adds the symmetrized outer product of `d` and `f`.
    #[inline]
    pub fn add_pair(&mut self, d: &Vector3<f64>, f: &Vector3<f64>) {
        for i in 0..3 {
            for j in i..3 {
                let w = 0.5 * (d[i] * f[j] + d[j] * f[i]);
                self.tensor[(i, j)] += w;
                if i != j {
                    self.tensor[(j, i)] += w;
                }
            }
        }
    }

    pub fn as_matrix(&self) -> &Matrix3<f64> {
        &self.tensor
    }

    pub fn trace(&self) -> f64 {
        self.tensor.trace()
    }

    /// The six independent components `[xx, xy, xz, yy, yz, zz]`.
    pub fn components(&self) -> [f64; 6] {
        let t = &self.tensor;
        [
            t[(0, 0)],
            t[(0, 1)],
            t[(0, 2)],
            t[(1, 1)],
            t[(1, 2)],
            t[(2, 2)],
        ]
    }

    /// All nine components in row-major order.
    pub fn to_array(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                out[3 * i + j] = self.tensor[(i, j)];
            }
        }
        out
    }
}

impl Add for Virial {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            tensor: self.tensor + rhs.tensor,
        }
    }
}

impl AddAssign for Virial {
    fn add_assign(&mut self, rhs: Self) {
        self.tensor += rhs.tensor;
    }
}

impl Sum for Virial {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zeros(), |acc, v| acc + v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_initializes_all_components_to_zero() {
        assert_eq!(Virial::default().to_array(), [0.0; 9]);
    }

    #[test]
    fn add_pair_of_parallel_vectors_is_plain_outer_product() {
        let mut virial = Virial::zeros();
        let d = Vector3::new(1.0, 2.0, 3.0);
        let f = d * -0.5;
        virial.add_pair(&d, &f);
        assert_eq!(*virial.as_matrix(), d * f.transpose());
        assert_eq!(virial.trace(), -7.0);
    }

    #[test]
    fn add_pair_is_exactly_symmetric() {
        let mut virial = Virial::zeros();
        virial.add_pair(&Vector3::new(1.0, 0.0, 2.0), &Vector3::new(0.0, 3.0, 1.0));
        let m = virial.as_matrix();
        assert_eq!(*m, m.transpose());
        assert_eq!(virial.components(), [0.0, 1.5, 0.5, 0.0, 3.0, 2.0]);
    }

    #[test]
    fn to_array_is_row_major() {
        let mut virial = Virial::zeros();
        virial.add_pair(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(
            virial.to_array(),
            [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn add_and_sum_combine_partial_accumulators() {
        let mut a = Virial::zeros();
        a.add_pair(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(2.0, 0.0, 0.0));
        let mut b = Virial::zeros();
        b.add_pair(&Vector3::new(0.0, 1.0, 0.0), &Vector3::new(0.0, 3.0, 0.0));

        let total: Virial = [a, b].into_iter().sum();
        assert_eq!(total, a + b);
        assert_eq!(total.trace(), 5.0);

        let mut running = a;
        running += b;
        assert_eq!(running, total);
    }
}
