use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SwitchingError {
    #[error("Invalid switching window [{inner}, {outer}]: need 0 <= inner <= outer, outer > 0")]
    InvalidWindow { inner: f64, outer: f64 },
}

/// Smooth cutoff that blends a pair potential to zero between `inner` and `outer`.
///
/// Inside the window `S(t) = 1 − 10t³ + 15t⁴ − 6t⁵` with
/// `t = (r − inner)/(outer − inner)`, which has vanishing first and second derivatives
/// at both ends. A window with
/// `inner == outer` is a plain truncation at `outer`: fine for energies, but its
/// derivative is discontinuous at the cutoff and it must not drive dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchingWindow {
    inner: f64,
    outer: f64,
}

impl SwitchingWindow {
    pub fn new(inner: f64, outer: f64) -> Result<Self, SwitchingError> {
        let finite = inner.is_finite() && outer.is_finite();
        if !finite || inner < 0.0 || inner > outer || outer <= 0.0 {
            return Err(SwitchingError::InvalidWindow { inner, outer });
        }
        Ok(Self { inner, outer })
    }

    pub fn hard(cutoff: f64) -> Result<Self, SwitchingError> {
        Self::new(cutoff, cutoff)
    }

    pub fn inner(&self) -> f64 {
        self.inner
    }

    pub fn outer(&self) -> f64 {
        self.outer
    }

    pub fn is_smooth(&self) -> bool {
        self.outer > self.inner
    }

    /// Returns `(S(r), dS/dr)`.
    #[inline]
    pub fn evaluate(&self, r: f64) -> (f64, f64) {
        if r >= self.outer {
            return (0.0, 0.0);
        }
        if r <= self.inner {
            return (1.0, 0.0);
        }

        let width = self.outer - self.inner;
        let t = (r - self.inner) / width;
        let t2 = t * t;
        let one_minus_t = 1.0 - t;
        let s = 1.0 - t2 * t * (10.0 - 15.0 * t + 6.0 * t2);
        let ds = -30.0 * t2 * one_minus_t * one_minus_t / width;
        (s, ds)
    }
}
