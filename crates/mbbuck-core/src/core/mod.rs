//! # Core Module
//!
//! Fundamental building blocks of the repulsion term.
//!
//! - **Geometry** ([`models`]) - Periodic cells, minimum-image displacements and
//!   views over the site-blocked coordinate layout
//! - **Energy Calculations** ([`forcefield`]) - Buckingham coefficients, their resolution
//!   for a pair of sites, switching and the repulsion kernel

pub mod forcefield;
pub mod models;
