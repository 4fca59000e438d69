//! Error types for parameter resolution and stack calculations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::names::Electrode;
use crate::yaml::YamlError;

pub type TeaResult<T> = std::result::Result<T, TeaError>;

#[derive(Debug, Error, Diagnostic)]
pub enum TeaError {
    #[error("The parameter '{0}' must be provided")]
    #[diagnostic(
        code(tea::missing_required),
        help("add it to the parameter file or pass it with --set \"Name=value\"")
    )]
    MissingRequired(String),

    #[error("Missing '{name}', required to calculate the {consumer}")]
    #[diagnostic(code(tea::missing_parameter))]
    MissingParameter { name: String, consumer: String },

    #[error("Parameter '{0}' is an OCP curve, expected a number")]
    #[diagnostic(code(tea::not_a_number))]
    NotANumber(String),

    #[error("Parameter '{0}' is a number, expected an OCP curve")]
    #[diagnostic(code(tea::not_a_curve))]
    NotACurve(String),

    #[error(
        "Stoichiometry calculation failed: lithium in the {electrode} at 0% SoC \
         ({lithium:.6} mA.h.cm-2) exceeds the lithium inventory ({inventory:.6} mA.h.cm-2)"
    )]
    #[diagnostic(
        code(tea::inventory_exceeded),
        help("lower the input stoichiometry window or increase the initial lithium content")
    )]
    InventoryExceeded {
        electrode: Electrode,
        lithium: f64,
        inventory: f64,
    },

    #[error("Stoichiometry calculation for the {electrode} failed: {symbol} = {value:.6} is outside [0, 1]")]
    #[diagnostic(code(tea::stoichiometry_out_of_range))]
    StoichiometryOutOfRange {
        electrode: Electrode,
        symbol: &'static str,
        value: f64,
    },

    #[error(
        "Equilibrium solve failed: a {voltage} V cut-off is not reachable for negative \
         electrode stoichiometries in [{lower:.6}, {upper:.6}]"
    )]
    #[diagnostic(
        code(tea::equilibrium_failed),
        help("check the voltage cut-offs against the OCP curves and the lithium inventory")
    )]
    EquilibriumFailed { voltage: f64, lower: f64, upper: f64 },

    #[error("No stoichiometry window can be determined: {0}")]
    #[diagnostic(
        code(tea::no_window),
        help("supply a stoichiometry window for one electrode, or both OCP curves and the voltage cut-offs")
    )]
    NoStoichiometryWindow(String),

    #[error("Breakdown of '{component}' does not close: {detail}")]
    #[diagnostic(code(tea::breakdown_closure))]
    BreakdownClosure { component: String, detail: String },

    #[error("Stack thickness is zero, stack-level densities are undefined")]
    #[diagnostic(code(tea::zero_stack_thickness))]
    ZeroStackThickness,

    #[error("Unknown parameter set '{0}'")]
    #[diagnostic(code(tea::unknown_parameter_set), help("run `tea sets` to list built-in sets"))]
    UnknownParameterSet(String),

    #[error("Unknown OCP function '{0}'")]
    #[diagnostic(code(tea::unknown_ocp))]
    UnknownOcp(String),

    #[error("Invalid OCP table for '{name}': {reason}")]
    #[diagnostic(code(tea::invalid_ocp_table))]
    InvalidOcpTable { name: String, reason: String },

    #[error("Invalid override '{0}', expected \"Name=value\"")]
    #[diagnostic(code(tea::invalid_override))]
    InvalidOverride(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TeaError {
    pub fn missing(name: impl Into<String>, consumer: impl Into<String>) -> Self {
        TeaError::MissingParameter {
            name: name.into(),
            consumer: consumer.into(),
        }
    }
}
