//! Tool configuration
//!
//! Settings merge from three layers, most specific first: the project's
//! `.owl/config.yaml`, a user-level config file, then environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// Template written into `.owl/config.yaml` by `owl init`
pub const CONFIG_TEMPLATE: &str = "\
# owl project configuration
# author: Your Name
# editor: vim
# auto_edit: false
# default_margin: 20
# default_vat_rate: 20
";

/// Merged tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Author recorded on new entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Editor command for `edit` and post-create editing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Open newly created entities in the editor by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_edit: Option<bool>,

    /// Default margin percentage for works without an explicit margin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_margin: Option<f64>,

    /// Default VAT rate percentage for new materials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vat_rate: Option<f64>,
}

impl Config {
    /// Load and merge configuration for the current context
    ///
    /// Project config wins over the user-level file; unset fields fall
    /// through to environment variables at access time.
    pub fn load() -> Self {
        let mut config = Self::user_config_path()
            .and_then(|p| Self::read_file(&p))
            .unwrap_or_default();

        if let Ok(project) = Project::discover() {
            if let Some(project_config) = Self::read_file(&project.marker_dir().join("config.yaml"))
            {
                config.merge_from(project_config);
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        let content = fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "owl")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge_from(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.auto_edit.is_some() {
            self.auto_edit = other.auto_edit;
        }
        if other.default_margin.is_some() {
            self.default_margin = other.default_margin;
        }
        if other.default_vat_rate.is_some() {
            self.default_vat_rate = other.default_vat_rate;
        }
    }

    /// Author for new entities: config, then OWL_AUTHOR, then USER
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("OWL_AUTHOR").ok())
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Editor command: config, then VISUAL, then EDITOR, then vi
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Whether new entities open in the editor without an explicit flag
    pub fn auto_edit(&self) -> bool {
        self.auto_edit.unwrap_or(false)
    }

    /// Default VAT rate percentage for materials
    pub fn default_vat_rate(&self) -> f64 {
        self.default_vat_rate.unwrap_or(20.0)
    }

    /// Open the given file in the configured editor
    pub fn run_editor(&self, path: &Path) -> std::io::Result<()> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");

        let status = std::process::Command::new(program)
            .args(parts)
            .arg(path)
            .status()?;

        if !status.success() {
            return Err(std::io::Error::other(format!(
                "editor '{}' exited with {}",
                editor, status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            author: Some("user-level".to_string()),
            default_margin: Some(15.0),
            ..Default::default()
        };
        base.merge_from(Config {
            author: Some("project-level".to_string()),
            ..Default::default()
        });

        assert_eq!(base.author.as_deref(), Some("project-level"));
        assert_eq!(base.default_margin, Some(15.0));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_margin, None);
        assert_eq!(config.default_vat_rate(), 20.0);
        assert!(!config.auto_edit());
    }
}
