//! Labor entity type - hourly-rated work categories (main d'œuvre)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A Labor entity - an hourly-rated work category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labor {
    /// Unique identifier
    pub id: EntityId,

    /// Display name (e.g., "Maçon", "Électricien qualifié")
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Billing unit, typically hours
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Rate per unit
    pub unit_price: f64,

    /// Category for filtering (e.g., "gros œuvre", "finitions")
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

    /// Author (who created this labor category)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_unit() -> String {
    "h".to_string()
}

fn default_revision() -> u32 {
    1
}

impl Entity for Labor {
    const PREFIX: &'static str = "LAB";

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

impl Labor {
    /// Create a new labor category with the given hourly rate
    pub fn new(name: String, unit_price: f64, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Lab),
            name,
            description: None,
            unit: default_unit(),
            unit_price,
            category: None,
            tags: Vec::new(),
            status: Status::default(),
            created: Utc::now(),
            author,
            entity_revision: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labor_creation() {
        let lab = Labor::new("Plombier".to_string(), 48.0, "test".to_string());

        assert!(lab.id.to_string().starts_with("LAB-"));
        assert_eq!(lab.name, "Plombier");
        assert_eq!(lab.unit, "h");
        assert_eq!(lab.unit_price, 48.0);
    }

    #[test]
    fn test_labor_roundtrip() {
        let mut lab = Labor::new("Carreleur".to_string(), 42.5, "test".to_string());
        lab.category = Some("finitions".to_string());

        let yaml = serde_yml::to_string(&lab).unwrap();
        let parsed: Labor = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(lab.id, parsed.id);
        assert_eq!(lab.name, parsed.name);
        assert_eq!(lab.unit_price, parsed.unit_price);
        assert_eq!(lab.category, parsed.category);
    }

    #[test]
    fn test_unit_defaults_to_hours() {
        let yaml = "\
id: LAB-01HQXJ4W8ZJ1N9M2K3P4Q5R6S7
name: Manœuvre
unit_price: 32
created: 2024-03-01T10:00:00Z
author: test
";
        let lab: Labor = serde_yml::from_str(yaml).unwrap();
        assert_eq!(lab.unit, "h");
    }
}
