//! # mbbuck Core Library
//!
//! The Buckingham short-range repulsion term of a many-body potential-energy
//! framework: the pair energy `A·exp(−B·r)` between the atoms of two monomers,
//! its analytic gradient and its virial, under open or periodic boundaries.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data models (periodic cells, site-blocked
//!   coordinate views), the coefficient table and its resolver, and the numerical
//!   repulsion kernel itself.
//!
//! - **[`workflows`]: The Public API.** Assembles the kernel over every site pair and
//!   every instance pair of two monomer types, resolving coefficients once per site pair.
//!
//! The kernel in [`core::forcefield::repulsion`] never allocates, never logs and never
//! fails; validation lives in the configuration loader and in [`workflows::dimer`].

pub mod core;
pub mod workflows;
