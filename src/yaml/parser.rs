//! Typed YAML parsing

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML text, `filename` is only used in diagnostics
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename)))
}

pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let filename = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: filename.clone(),
        source,
    })?;
    parse_yaml(&content, &filename)
}
