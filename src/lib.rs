//! TEA: techno-economic stack metrics for lithium-ion cells
//!
//! Resolves a partial table of electrode, separator and current-collector
//! parameters into a complete one, solves the stoichiometry window and
//! reports capacities, energy densities, electrolyte excess and the
//! mass/volume breakdown of one repeat unit of the stack.

pub mod cli;
pub mod core;
pub mod entities;
pub mod logging;
pub mod yaml;
