//! Core module - quantity store, resolver and stack calculations

pub mod breakdown;
pub mod config;
pub mod constants;
pub mod electrolyte;
pub mod energy;
pub mod error;
pub mod names;
pub mod ocp;
pub mod ragone;
pub mod resolver;
pub mod stoichiometry;
pub mod store;

pub use breakdown::{BreakdownEntry, Part, StackBreakdown};
pub use config::Config;
pub use electrolyte::{ElectrolyteExcess, ExcessInput};
pub use energy::{EnergyRecord, MissingContribution};
pub use error::{TeaError, TeaResult};
pub use names::{Compartment, Electrode};
pub use ocp::{BuiltinOcp, OcpCurve, OcpTable};
pub use ragone::{DischargeMode, DischargeSimulator, QuasiStaticDischarge, RagonePoint, RagoneSeries};
pub use resolver::Resolver;
pub use stoichiometry::{Bisection, EquilibriumSolver, StoichiometryResult, StoichiometryWindow};
pub use store::{NoteKind, ParameterStore, ParameterTable, ParameterValue, Provenance};
