use crate::core::forcefield::params::{BuckinghamCoefficients, CoefficientTable, RepulsionParams};
use crate::core::forcefield::repulsion::{Derivatives, Repulsion};
use crate::core::forcefield::switching::SwitchingWindow;
use crate::core::forcefield::term::Virial;
use crate::core::models::block::{SiteBlock, SiteBlockMut, block_len};
use crate::core::models::cell::PeriodicCell;
use nalgebra::Vector3;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, PartialEq)]
pub enum DimerError {
    #[error("{buffer} buffer for monomer '{monomer}' has length {actual}, expected {expected}")]
    BufferSize {
        monomer: String,
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Monomer group {actual} does not match the resolved site pairs, expected {expected}")]
    GroupMismatch { expected: String, actual: String },
    #[error("Gradients requested with a hard cutoff at {cutoff}; use a switching window")]
    HardCutoff { cutoff: f64 },
}

/// All instances of one monomer type, with coordinates in the site-blocked layout.
#[derive(Debug, Clone, Copy)]
pub struct MonomerGroup<'a> {
    pub id: &'a str,
    pub nsites: usize,
    pub nmon: usize,
    pub xyz: &'a [f64],
}

impl<'a> MonomerGroup<'a> {
    pub fn new(id: &'a str, nsites: usize, nmon: usize, xyz: &'a [f64]) -> Self {
        Self {
            id,
            nsites,
            nmon,
            xyz,
        }
    }

    fn check_len(&self, buffer: &'static str, actual: usize) -> Result<(), DimerError> {
        let expected = block_len(self.nsites, self.nmon);
        if actual != expected {
            return Err(DimerError::BufferSize {
                monomer: self.id.to_string(),
                buffer,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn block(&self) -> SiteBlock<'a> {
        SiteBlock::new(self.xyz, self.nmon)
    }
}

/// Coefficients for every site pair of two monomer types, resolved once.
///
/// Entry `(site1, site2)` is `None` when the table has no coefficients for that pair
/// or the monomer pair is not enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SitePairCoefficients {
    mon_id1: String,
    nsites1: usize,
    mon_id2: String,
    nsites2: usize,
    coefficients: Vec<Option<BuckinghamCoefficients>>,
}

impl SitePairCoefficients {
    pub fn resolve(
        table: &CoefficientTable,
        mon_id1: &str,
        nsites1: usize,
        mon_id2: &str,
        nsites2: usize,
    ) -> Self {
        let mut coefficients = Vec::with_capacity(nsites1 * nsites2);
        for site1 in 0..nsites1 {
            for site2 in 0..nsites2 {
                coefficients.push(table.resolve(mon_id1, mon_id2, site1, site2));
            }
        }

        let pairs = Self {
            mon_id1: mon_id1.to_string(),
            nsites1,
            mon_id2: mon_id2.to_string(),
            nsites2,
            coefficients,
        };
        debug!(
            mon1 = mon_id1,
            mon2 = mon_id2,
            unresolved = pairs.unresolved(),
            total = nsites1 * nsites2,
            "Resolved Buckingham site pairs"
        );
        pairs
    }

    #[inline]
    pub fn get(&self, site1: usize, site2: usize) -> Option<BuckinghamCoefficients> {
        debug_assert!(site1 < self.nsites1 && site2 < self.nsites2);
        self.coefficients[site1 * self.nsites2 + site2]
    }

    /// Number of site pairs without coefficients.
    pub fn unresolved(&self) -> usize {
        self.coefficients.iter().filter(|c| c.is_none()).count()
    }

    fn check_group(
        id: &str,
        nsites: usize,
        group: &MonomerGroup<'_>,
    ) -> Result<(), DimerError> {
        if group.id != id || group.nsites != nsites {
            return Err(DimerError::GroupMismatch {
                expected: format!("'{id}' with {nsites} sites"),
                actual: format!("'{}' with {} sites", group.id, group.nsites),
            });
        }
        Ok(())
    }

    fn check_groups(
        &self,
        monomer1: &MonomerGroup<'_>,
        monomer2: &MonomerGroup<'_>,
    ) -> Result<(), DimerError> {
        Self::check_group(&self.mon_id1, self.nsites1, monomer1)?;
        Self::check_group(&self.mon_id2, self.nsites2, monomer2)
    }
}

enum Targets<'g> {
    EnergyOnly,
    Distinct {
        grad1: SiteBlockMut<'g>,
        grad2: SiteBlockMut<'g>,
    },
    Shared(SiteBlockMut<'g>),
}

/// Buckingham repulsion between every instance pair of two monomer types.
///
/// Groups and buffers are validated once per call against the pre-resolved
/// [`SitePairCoefficients`]; site pairs without coefficients are skipped. Everything
/// below that runs through the unchecked [`Repulsion`] kernel.
#[derive(Debug, Clone, Copy)]
pub struct DimerRepulsion<'a> {
    pairs: &'a SitePairCoefficients,
    switching: SwitchingWindow,
    cell: Option<&'a PeriodicCell>,
}

impl<'a> DimerRepulsion<'a> {
    pub fn new(
        pairs: &'a SitePairCoefficients,
        switching: SwitchingWindow,
        cell: Option<&'a PeriodicCell>,
    ) -> Self {
        Self {
            pairs,
            switching,
            cell,
        }
    }

    pub fn from_params(
        pairs: &'a SitePairCoefficients,
        params: &RepulsionParams,
        cell: Option<&'a PeriodicCell>,
    ) -> Self {
        Self::new(pairs, params.switching, cell)
    }

    fn check_smooth(&self) -> Result<(), DimerError> {
        if !self.switching.is_smooth() {
            return Err(DimerError::HardCutoff {
                cutoff: self.switching.outer(),
            });
        }
        Ok(())
    }

    /// Repulsion between all instances of `monomer1` and all instances of `monomer2`.
    ///
    /// The groups must match the two sides the site pairs were resolved for, in order,
    /// and must be different buffers; use [`Self::self_energy`] for the interactions
    /// within one group.
    pub fn energy(
        &self,
        monomer1: &MonomerGroup<'_>,
        monomer2: &MonomerGroup<'_>,
    ) -> Result<f64, DimerError> {
        self.pairs.check_groups(monomer1, monomer2)?;
        monomer1.check_len("coordinate", monomer1.xyz.len())?;
        monomer2.check_len("coordinate", monomer2.xyz.len())?;
        Ok(self.run(monomer1, monomer2, false, Targets::EnergyOnly, None))
    }

    /// Like [`Self::energy`], adding gradients to `grad1`/`grad2` (same layout as the
    /// coordinates) and, if given, the virial.
    ///
    /// Fails with [`DimerError::HardCutoff`] when the switching window has zero width.
    pub fn energy_and_gradients(
        &self,
        monomer1: &MonomerGroup<'_>,
        monomer2: &MonomerGroup<'_>,
        grad1: &mut [f64],
        grad2: &mut [f64],
        virial: Option<&mut Virial>,
    ) -> Result<f64, DimerError> {
        self.check_smooth()?;
        self.pairs.check_groups(monomer1, monomer2)?;
        monomer1.check_len("coordinate", monomer1.xyz.len())?;
        monomer2.check_len("coordinate", monomer2.xyz.len())?;
        monomer1.check_len("gradient", grad1.len())?;
        monomer2.check_len("gradient", grad2.len())?;

        let targets = Targets::Distinct {
            grad1: SiteBlockMut::new(grad1, monomer1.nmon),
            grad2: SiteBlockMut::new(grad2, monomer2.nmon),
        };
        Ok(self.run(monomer1, monomer2, false, targets, virial))
    }

    /// Repulsion between distinct instances of one monomer type, each pair counted once.
    pub fn self_energy(&self, monomer: &MonomerGroup<'_>) -> Result<f64, DimerError> {
        self.pairs.check_groups(monomer, monomer)?;
        monomer.check_len("coordinate", monomer.xyz.len())?;
        Ok(self.run(monomer, monomer, true, Targets::EnergyOnly, None))
    }

    pub fn self_energy_and_gradients(
        &self,
        monomer: &MonomerGroup<'_>,
        grad: &mut [f64],
        virial: Option<&mut Virial>,
    ) -> Result<f64, DimerError> {
        self.check_smooth()?;
        self.pairs.check_groups(monomer, monomer)?;
        monomer.check_len("coordinate", monomer.xyz.len())?;
        monomer.check_len("gradient", grad.len())?;

        let targets = Targets::Shared(SiteBlockMut::new(grad, monomer.nmon));
        Ok(self.run(monomer, monomer, true, targets, virial))
    }

    #[instrument(skip_all, fields(mon1 = monomer1.id, mon2 = monomer2.id, same_type = same_type))]
    fn run(
        &self,
        monomer1: &MonomerGroup<'_>,
        monomer2: &MonomerGroup<'_>,
        same_type: bool,
        mut targets: Targets<'_>,
        mut virial: Option<&mut Virial>,
    ) -> f64 {
        let block1 = monomer1.block();
        let block2 = monomer2.block();
        let mut energy = 0.0;

        for site1 in 0..monomer1.nsites {
            for site2 in 0..monomer2.nsites {
                let Some(coefficients) = self.pairs.get(site1, site2) else {
                    continue;
                };
                let kernel = Repulsion::new(coefficients, self.switching, self.cell);

                for m1 in 0..monomer1.nmon {
                    // Within one group, instance m1 only sees the instances after it.
                    let start2 = if same_type { m1 + 1 } else { 0 };
                    let monomers = start2..monomer2.nmon;
                    let p1 = block1.position(site1, m1);

                    match &mut targets {
                        Targets::EnergyOnly => {
                            let request = Derivatives::EnergyOnly;
                            energy += kernel.evaluate(&p1, &block2, site2, monomers, request);
                        }
                        Targets::Distinct { grad1, grad2 } => {
                            let mut g1 = Vector3::zeros();
                            energy += kernel.evaluate(
                                &p1,
                                &block2,
                                site2,
                                monomers,
                                Derivatives::Gradients {
                                    grad1: &mut g1,
                                    grad2: grad2.reborrow(),
                                    virial: virial.as_deref_mut(),
                                },
                            );
                            grad1.add(site1, m1, &g1);
                        }
                        Targets::Shared(grad) => {
                            let mut g1 = Vector3::zeros();
                            energy += kernel.evaluate(
                                &p1,
                                &block2,
                                site2,
                                monomers,
                                Derivatives::Gradients {
                                    grad1: &mut g1,
                                    grad2: grad.reborrow(),
                                    virial: virial.as_deref_mut(),
                                },
                            );
                            grad.add(site1, m1, &g1);
                        }
                    }
                }
            }
        }
        energy
    }
}
