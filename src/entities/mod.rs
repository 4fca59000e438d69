//! Parameter set documents and the analysis instance

pub mod parameter_set;
pub mod tea;

pub use parameter_set::{builtin_names, parse_override, ParameterSet, RawValue};
pub use tea::Tea;
