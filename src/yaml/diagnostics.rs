//! miette diagnostics for YAML errors

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(tea::yaml::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A parse or type error located in the YAML source
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid YAML in {filename}: {message}")]
#[diagnostic(code(tea::yaml::syntax))]
pub struct YamlSyntaxError {
    pub filename: String,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err.location().map(|loc| {
            let offset = loc.index().min(content.len());
            let len = content[offset..]
                .find('\n')
                .unwrap_or(content.len() - offset)
                .max(1)
                .min(content.len() - offset);
            SourceSpan::from((offset, len))
        });
        Self {
            filename: filename.to_string(),
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}
