//! Material entity type - purchasable supplies (fournitures)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A Material entity - a purchasable physical item with a unit price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Unique identifier
    pub id: EntityId,

    /// Optional catalog reference code (e.g., supplier SKU)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Display name
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sale unit (e.g., "m²", "kg", "u")
    pub unit: String,

    /// Price per unit, excluding VAT
    pub unit_price: f64,

    /// VAT rate percentage (0-100)
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,

    /// Preferred supplier name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Category for filtering (e.g., "plomberie", "électricité")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Current status
    #[serde(default)]
    pub status: Status,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this material)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_vat_rate() -> f64 {
    20.0
}

fn default_revision() -> u32 {
    1
}

impl Entity for Material {
    const PREFIX: &'static str = "MAT";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Material {
    /// Create a new material with the given parameters
    pub fn new(name: String, unit: String, unit_price: f64, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Mat),
            reference: None,
            name,
            description: None,
            unit,
            unit_price,
            vat_rate: default_vat_rate(),
            supplier: None,
            category: None,
            tags: Vec::new(),
            status: Status::default(),
            created: Utc::now(),
            author,
            entity_revision: 1,
        }
    }
}
