//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::{GlobalOpts, InputArgs, OutputFormat};
use crate::cli::output::effective_format;
use crate::core::store::ParameterTable;
use crate::core::Config;
use crate::entities::{parse_override, ParameterSet, Tea};

/// Configuration and output format for one invocation
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load_with(global.config.as_deref())?;
        let format = effective_format(global.format, &config);
        Ok(Self { config, format })
    }
}

/// Parse repeated `--set Name=value` arguments into an override table
pub fn parse_overrides(overrides: &[String]) -> Result<ParameterTable> {
    let mut table = ParameterTable::new();
    for text in overrides {
        let (name, value) = parse_override(text)?;
        if table.insert(name.clone(), value).is_some() {
            tracing::warn!("'{}' is set more than once, the last value wins", name);
        }
    }
    Ok(table)
}

/// Base table and label from `--base` and an optional parameter file
///
/// The file's parameters are laid over the built-in set.
pub fn base_table(input: &InputArgs) -> Result<(ParameterTable, String)> {
    let mut table = ParameterTable::new();
    let mut label = String::new();

    if let Some(name) = &input.base {
        let set = ParameterSet::builtin(name)?;
        table = set.to_table()?;
        label = set.title;
    }
    if let Some(path) = &input.file {
        let set = ParameterSet::from_file(path)?;
        table.extend(set.to_table()?);
        label = if set.title.is_empty() {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            set.title
        };
    }
    if input.base.is_none() && input.file.is_none() && input.overrides.is_empty() {
        tracing::warn!("No parameter file, --base or --set given; starting from an empty table");
    }
    if label.is_empty() {
        label = "stack".to_string();
    }
    Ok((table, label))
}

/// Build and resolve one analysis
pub fn load_tea(input: &InputArgs, config: &Config) -> Result<Tea> {
    let (base, label) = base_table(input)?;
    let overrides = parse_overrides(&input.overrides)?;
    let mut tea = Tea::with_config(base, overrides, config.clone())?;
    tea.set_label(label);
    Ok(tea)
}
