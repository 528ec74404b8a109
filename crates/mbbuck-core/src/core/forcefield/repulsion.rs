use super::params::BuckinghamCoefficients;
use super::potentials;
use super::switching::SwitchingWindow;
use super::term::Virial;
use crate::core::models::block::{SiteBlock, SiteBlockMut};
use crate::core::models::cell::PeriodicCell;
use nalgebra::Vector3;
use std::ops::Range;

/// What [`Repulsion::evaluate`] computes besides the energy.
///
/// Gradients are `∂E/∂x` (the negative force) and are added to the buffers, never
/// overwritten, so repeated calls build up a running total.
#[derive(Debug)]
pub enum Derivatives<'a> {
    EnergyOnly,
    Gradients {
        /// Gradient on the reference atom.
        grad1: &'a mut Vector3<f64>,
        /// Gradients on the monomer-2 atoms, laid out like the positions.
        grad2: SiteBlockMut<'a>,
        /// Virial accumulator, if the caller needs pressure or stress.
        virial: Option<&'a mut Virial>,
    },
}

/// Buckingham repulsion between one reference atom and one site of a range of
/// monomer instances.
///
/// The kernel is a pure function of its inputs. It does not allocate, log or fail:
/// coefficients must already be resolved, `monomers` must lie within the block and,
/// for periodic runs, the cell inverse must be exact. Gradients require a switching
/// window of non-zero width. Coincident atoms (`r == 0`) produce non-finite gradients
/// and are the caller's to avoid.
#[derive(Debug, Clone, Copy)]
pub struct Repulsion<'c> {
    pub coefficients: BuckinghamCoefficients,
    pub switching: SwitchingWindow,
    pub cell: Option<&'c PeriodicCell>,
}

impl<'c> Repulsion<'c> {
    pub fn new(
        coefficients: BuckinghamCoefficients,
        switching: SwitchingWindow,
        cell: Option<&'c PeriodicCell>,
    ) -> Self {
        Self {
            coefficients,
            switching,
            cell,
        }
    }

    #[inline]
    fn displacement(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> Vector3<f64> {
        let d = p1 - p2;
        match self.cell {
            Some(cell) => cell.minimum_image(&d),
            None => d,
        }
    }

    /// Returns the total repulsion between `p1` and `site2` of every instance in
    /// `monomers`, accumulating derivatives as requested.
    ///
    /// For each pair the displacement `d = p1 − x_j` is taken as its minimum image and
    /// held fixed, so the gradient is that of the open-boundary expression evaluated at
    /// the wrapped `d`; the image choice itself is not differentiated.
    pub fn evaluate(
        &self,
        p1: &Vector3<f64>,
        block2: &SiteBlock<'_>,
        site2: usize,
        monomers: Range<usize>,
        derivatives: Derivatives<'_>,
    ) -> f64 {
        debug_assert!(monomers.start <= monomers.end && monomers.end <= block2.nmon());

        let outer = self.switching.outer();
        let cutoff_sq = outer * outer;
        let BuckinghamCoefficients { a, b } = self.coefficients;
        let mut energy = 0.0;

        match derivatives {
            Derivatives::EnergyOnly => {
                for mon in monomers {
                    let d = self.displacement(p1, &block2.position(site2, mon));
                    let rsq = d.norm_squared();
                    if rsq >= cutoff_sq {
                        continue;
                    }
                    let r = rsq.sqrt();
                    let (s, _) = self.switching.evaluate(r);
                    energy += s * potentials::buckingham_repulsion(r, a, b);
                }
            }
            Derivatives::Gradients {
                grad1,
                mut grad2,
                mut virial,
            } => {
                debug_assert!(
                    self.switching.is_smooth(),
                    "gradients of a hard cutoff are not defined"
                );
                for mon in monomers {
                    let d = self.displacement(p1, &block2.position(site2, mon));
                    let rsq = d.norm_squared();
                    if rsq >= cutoff_sq {
                        continue;
                    }
                    let r = rsq.sqrt();
                    let (e, de) = potentials::buckingham_repulsion_with_derivative(r, a, b);
                    let (s, ds) = self.switching.evaluate(r);
                    energy += s * e;

                    let de_dr = s * de + ds * e;
                    let g = d * (de_dr / r);
                    *grad1 += g;
                    grad2.sub(site2, mon, &g);

                    if let Some(virial) = virial.as_deref_mut() {
                        virial.add_pair(&d, &(-g));
                    }
                }
            }
        }
        energy
    }
}
