//! Entity trait - common interface for the three catalog types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all owl catalog entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "MAT", "WRK")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's display name
    fn name(&self) -> &str;

    /// Get the entity's status
    fn status(&self) -> Status;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

/// Status values common across entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Status {
    Draft,
    #[default]
    Active,
    Archived,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "draft"),
            Status::Active => write!(f, "active"),
            Status::Archived => write!(f, "archived"),
        }
    }
}
