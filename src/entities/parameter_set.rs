//! Parameter set documents
//!
//! A parameter set is a YAML file with a title, an optional base (a built-in
//! set or another file) and a table of named values. Built-in sets are
//! embedded in the binary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::core::error::{TeaError, TeaResult};
use crate::core::ocp::{BuiltinOcp, OcpCurve, OcpTable};
use crate::core::store::{ParameterTable, ParameterValue};
use crate::yaml::{parse_yaml, parse_yaml_file};

#[derive(Embed)]
#[folder = "parameter_sets/"]
struct EmbeddedSets;

/// Bases may chain, but not endlessly
const MAX_BASE_DEPTH: usize = 8;

/// A value as written in a parameter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    /// Name of a built-in OCP function
    Function(String),
    /// `{ table: [[stoichiometry, potential], ...] }`
    Table { table: Vec<(f64, f64)> },
}

impl RawValue {
    pub fn to_value(&self, name: &str) -> TeaResult<ParameterValue> {
        match self {
            RawValue::Number(v) => Ok(ParameterValue::Number(*v)),
            RawValue::Function(f) => Ok(OcpCurve::Builtin(f.parse::<BuiltinOcp>()?).into()),
            RawValue::Table { table } => Ok(OcpCurve::Table(OcpTable::new(name, table.clone())?).into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Built-in set this one extends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Another parameter file this one extends, relative to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_file: Option<PathBuf>,

    #[serde(default)]
    pub parameters: BTreeMap<String, RawValue>,

    #[serde(skip)]
    origin: Option<PathBuf>,
}

impl ParameterSet {
    pub fn parse(content: &str, filename: &str) -> TeaResult<Self> {
        Ok(parse_yaml(content, filename)?)
    }

    pub fn from_file(path: &Path) -> TeaResult<Self> {
        let mut set: ParameterSet = parse_yaml_file(path)?;
        set.origin = Some(path.to_path_buf());
        Ok(set)
    }

    /// Load an embedded set by name (case-insensitive)
    pub fn builtin(name: &str) -> TeaResult<Self> {
        let file = builtin_names()
            .into_iter()
            .find(|n| n.eq_ignore_ascii_case(name))
            .and_then(|n| EmbeddedSets::get(&format!("{}.yaml", n)))
            .ok_or_else(|| TeaError::UnknownParameterSet(name.to_string()))?;
        let content = String::from_utf8_lossy(&file.data);
        Self::parse(&content, &format!("{}.yaml", name))
    }

    /// Flatten this set and its bases into one table, this set's values last
    pub fn to_table(&self) -> TeaResult<ParameterTable> {
        self.to_table_at_depth(0)
    }

    fn to_table_at_depth(&self, depth: usize) -> TeaResult<ParameterTable> {
        if depth > MAX_BASE_DEPTH {
            return Err(TeaError::UnknownParameterSet(format!(
                "{} (base chain deeper than {})",
                self.title, MAX_BASE_DEPTH
            )));
        }

        let mut table = match (&self.base, &self.base_file) {
            (Some(base), _) => Self::builtin(base)?.to_table_at_depth(depth + 1)?,
            (None, Some(file)) => {
                let path = match self.origin.as_ref().and_then(|o| o.parent()) {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                Self::from_file(&path)?.to_table_at_depth(depth + 1)?
            }
            (None, None) => ParameterTable::new(),
        };

        for (name, raw) in &self.parameters {
            table.insert(name.clone(), raw.to_value(name)?);
        }
        Ok(table)
    }
}

/// Names of the embedded sets, sorted
pub fn builtin_names() -> Vec<String> {
    let mut names: Vec<String> = EmbeddedSets::iter()
        .filter_map(|f| f.strip_suffix(".yaml").map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Parse a `Name=value` override
///
/// The value may be a number or a built-in OCP function name.
pub fn parse_override(text: &str) -> TeaResult<(String, ParameterValue)> {
    let (name, value) = text
        .rsplit_once('=')
        .ok_or_else(|| TeaError::InvalidOverride(text.to_string()))?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(TeaError::InvalidOverride(text.to_string()));
    }
    let raw = match value.parse::<f64>() {
        Ok(v) => RawValue::Number(v),
        Err(_) => RawValue::Function(value.to_string()),
    };
    Ok((name.to_string(), raw.to_value(name)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names;
    use tempfile::tempdir;

    #[test]
    fn test_builtins_are_listed() {
        assert_eq!(builtin_names(), vec!["Chen2020".to_string(), "Ecker2015".to_string()]);
    }

    #[test]
    fn test_builtin_sets_parse() {
        for name in builtin_names() {
            let table = ParameterSet::builtin(&name).unwrap().to_table().unwrap();
            assert!(table.contains_key(names::ELECTROLYTE_DENSITY), "{}", name);
            assert!(matches!(
                table.get("Negative electrode OCP [V]"),
                Some(ParameterValue::Curve(OcpCurve::Builtin(_)))
            ));
        }
        assert!(ParameterSet::builtin("ecker2015").is_ok());
        assert!(matches!(
            ParameterSet::builtin("Marquis2019"),
            Err(TeaError::UnknownParameterSet(_))
        ));
    }

    #[test]
    fn test_file_extends_builtin() {
        let set = ParameterSet::parse(
            "title: thick\nbase: Ecker2015\nparameters:\n  \"Negative electrode thickness [m]\": 1.0e-4\n",
            "thick.yaml",
        )
        .unwrap();
        let table = set.to_table().unwrap();
        assert_eq!(table["Negative electrode thickness [m]"].as_number(), Some(1.0e-4));
        assert_eq!(table["Positive electrode thickness [m]"].as_number(), Some(5.4e-5));
    }

    #[test]
    fn test_base_file_relative_to_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "title: base\nparameters:\n  \"Separator porosity\": 0.4\n",
        )
        .unwrap();
        let child = dir.path().join("child.yaml");
        std::fs::write(
            &child,
            "title: child\nbase_file: base.yaml\nparameters:\n  \"Separator thickness [m]\": 2.5e-5\n",
        )
        .unwrap();

        let table = ParameterSet::from_file(&child).unwrap().to_table().unwrap();
        assert_eq!(table["Separator porosity"].as_number(), Some(0.4));
        assert_eq!(table["Separator thickness [m]"].as_number(), Some(2.5e-5));
    }

    #[test]
    fn test_table_values() {
        let set = ParameterSet::parse(
            "parameters:\n  \"Positive electrode OCP [V]\":\n    table: [[0.0, 4.2], [1.0, 3.4]]\n",
            "table.yaml",
        )
        .unwrap();
        let table = set.to_table().unwrap();
        match &table["Positive electrode OCP [V]"] {
            ParameterValue::Curve(curve) => assert!((curve.evaluate(0.5) - 3.8).abs() < 1e-12),
            other => panic!("expected curve, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let set = ParameterSet::parse("parameters:\n  \"Negative electrode OCP [V]\": lfp_ocp\n", "bad.yaml").unwrap();
        assert!(matches!(set.to_table(), Err(TeaError::UnknownOcp(_))));
    }

    #[test]
    fn test_parse_override() {
        let (name, value) = parse_override("Separator porosity = 0.45").unwrap();
        assert_eq!(name, "Separator porosity");
        assert_eq!(value.as_number(), Some(0.45));

        let (_, curve) = parse_override("Negative electrode OCP [V]=graphite_ocp_Ecker2015").unwrap();
        assert!(matches!(curve, ParameterValue::Curve(_)));

        assert!(matches!(parse_override("no equals sign"), Err(TeaError::InvalidOverride(_))));
        assert!(matches!(parse_override("=0.5"), Err(TeaError::InvalidOverride(_))));
    }
}
