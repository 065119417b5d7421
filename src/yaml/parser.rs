//! Entity file parsing
//!
//! All catalog I/O funnels through here so every parse failure carries
//! the same diagnostic shape, whether it comes from a list scan or a
//! single-entity lookup.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content, labeling any diagnostic with `filename`
pub fn parse_yaml<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    match serde_yml::from_str(content) {
        Ok(value) => Ok(value),
        Err(e) => Err(YamlError::Syntax(YamlSyntaxError::from_serde_error(
            &e, content, filename,
        ))),
    }
}

/// Read and parse one entity file
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content, &path.display().to_string())
}
