//! Miette diagnostics for YAML parse failures
//!
//! Syntax errors carry the source text and the offending span so miette
//! can render the failing line with a pointer instead of a bare serde
//! message.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Error produced when reading or parsing an entity file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),
}

/// A YAML syntax or shape error with source context
#[derive(Debug, Error, Diagnostic)]
#[error("failed to parse {filename}")]
#[diagnostic(code(owl::yaml::syntax), help("check the YAML structure near the marked location"))]
pub struct YamlSyntaxError {
    /// File the content came from
    pub filename: String,

    /// The underlying parser message
    pub message: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("{message}")]
    span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Build a diagnostic from a serde_yml error and the original content
    pub fn from_serde_error(error: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = if content.is_empty() {
            None
        } else {
            error.location().map(|loc| {
                let offset = loc.index().min(content.len() - 1);
                SourceSpan::from((offset, 1))
            })
        };

        Self {
            filename: filename.to_string(),
            message: error.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}
