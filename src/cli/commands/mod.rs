//! CLI command implementations

pub mod breakdown;
pub mod capacities;
pub mod completions;
pub mod electrolyte;
pub mod energy;
pub mod params;
pub mod plot;
pub mod ragone;
pub mod sets;
