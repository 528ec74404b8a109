//! # Workflows Module
//!
//! High-level entry points that tie the coefficient table and the repulsion kernel
//! together for whole groups of monomers.
//!
//! - [`dimer`] - Repulsion between all instance pairs of two monomer types, or within
//!   one type

pub mod dimer;
