//! Project discovery and layout
//!
//! An owl project is any directory containing a `.owl/` marker. Entities
//! live under `library/` in one subdirectory per catalog. Commands discover
//! the project by walking up from the current directory, so they work from
//! anywhere inside the tree.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::identity::EntityPrefix;

/// Project marker directory
const MARKER_DIR: &str = ".owl";

/// Directories where materials are stored
pub const MATERIAL_DIRS: &[&str] = &["library/materials"];

/// Directories where labor categories are stored
pub const LABOR_DIRS: &[&str] = &["library/labor"];

/// Directories where works are stored
pub const WORK_DIRS: &[&str] = &["library/works"];

/// Error returned by project discovery and initialization
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("no owl project found (missing .owl/ directory in this or any parent directory)")]
    NotFound,

    #[error("directory already contains an owl project: {0}")]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A discovered owl project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Discover a project by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Discover a project by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(MARKER_DIR).is_dir() {
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
            current = dir.parent();
        }
        Err(ProjectError::NotFound)
    }

    /// Initialize a new project skeleton in the given directory
    pub fn init(dir: &Path) -> Result<Self, ProjectError> {
        let marker = dir.join(MARKER_DIR);
        if marker.exists() {
            return Err(ProjectError::AlreadyExists(dir.to_path_buf()));
        }

        fs::create_dir_all(&marker)?;
        for sub in MATERIAL_DIRS.iter().chain(LABOR_DIRS).chain(WORK_DIRS) {
            fs::create_dir_all(dir.join(sub))?;
        }

        let config_path = marker.join("config.yaml");
        if !config_path.exists() {
            fs::write(&config_path, crate::core::config::CONFIG_TEMPLATE)?;
        }

        Ok(Self {
            root: dir.to_path_buf(),
        })
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.owl/` marker directory
    pub fn marker_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Primary storage directory for the given entity type
    pub fn dir_for(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(Self::dirs_for(prefix)[0])
    }

    /// All storage directories for the given entity type
    pub fn dirs_for(prefix: EntityPrefix) -> &'static [&'static str] {
        match prefix {
            EntityPrefix::Mat => MATERIAL_DIRS,
            EntityPrefix::Lab => LABOR_DIRS,
            EntityPrefix::Wrk => WORK_DIRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_skeleton() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.marker_dir().is_dir());
        assert!(project.root().join("library/materials").is_dir());
        assert!(project.root().join("library/labor").is_dir());
        assert!(project.root().join("library/works").is_dir());
    }

    #[test]
    fn test_init_refuses_existing_project() {
        let tmp = tempfile::TempDir::new().unwrap();
        Project::init(tmp.path()).unwrap();

        assert!(matches!(
            Project::init(tmp.path()),
            Err(ProjectError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        Project::init(tmp.path()).unwrap();

        let nested = tmp.path().join("library/works");
        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_fails_outside_project() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound)
        ));
    }
}
