//! # Force Field Module
//!
//! The Buckingham repulsion term `E(r) = S(r)·A·exp(−B·r)` between the sites of two
//! monomers.
//!
//! ## Key Components
//!
//! - [`params`] - Coefficient pairs, the registered coefficient table and its loaders
//! - [`resolver`] - Order-independent lookup of the coefficients for a site pair
//! - [`switching`] - Smooth cutoff window `S(r)`
//! - [`term`] - Virial accumulator
//! - [`repulsion`] - The energy/gradient/virial kernel
//!
//! ## Usage
//!
//! ```ignore
//! use mbbuck::core::forcefield::repulsion::{Derivatives, Repulsion};
//!
//! let coefficients = params.table.resolve("h2o", "cl", 0, 0).unwrap();
//! let kernel = Repulsion::new(coefficients, params.switching, Some(&cell));
//! let energy = kernel.evaluate(&p1, &block2, 0, 0..nmon2, Derivatives::EnergyOnly);
//! ```

pub mod params;
pub(crate) mod potentials;
pub mod repulsion;
pub mod resolver;
pub mod switching;
pub mod term;
