//! Work entity type - composite priceable tasks (ouvrages)
//!
//! A work is assembled from materials, labor, and other works through its
//! component list. Cost fields are derived from the component list and the
//! current catalog prices; the `costs` block stored on the entity is a
//! cache refreshed on every mutation, never a source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// The catalog a work component refers into
///
/// The kind is fixed when the component is attached, so a later id
/// collision across catalogs cannot reclassify an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Material,
    Labor,
    Work,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Material => write!(f, "material"),
            ComponentKind::Labor => write!(f, "labor"),
            ComponentKind::Work => write!(f, "work"),
        }
    }
}

/// One line of a work's composition: a typed catalog reference and a quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkComponent {
    /// Which catalog the id refers into
    pub kind: ComponentKind,

    /// Referenced entity id; may dangle if the entity was force-deleted
    pub id: String,

    /// Quantity of the referenced entity per unit of this work
    pub quantity: f64,

    /// Notes about this line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Cached derived costs, refreshed whenever the work is repriced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCosts {
    /// Sum of material contributions
    pub material_cost: f64,

    /// Sum of labor contributions
    pub labor_cost: f64,

    /// Sum of sub-work contributions at their sale price
    pub sub_works_cost: f64,

    /// Déboursé sec: material + labor + sub-works
    pub total_cost: f64,

    /// Total cost marked up by the margin
    pub recommended_price: f64,
}

/// A Work entity - a composite priceable construction task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    /// Unique identifier
    pub id: EntityId,

    /// Optional catalog reference code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Display name
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category for filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Sale unit of the assembled work (e.g., "m²", "ml", "u")
    pub unit: String,

    /// Ordered bill of components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<WorkComponent>,

    /// Margin percentage; the effective margin defaults to 20 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,

    /// Cached derived costs from the last repricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<WorkCosts>,

    /// Whether this work was created ad hoc rather than from the library
    #[serde(default)]
    pub is_custom: bool,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Current status
    #[serde(default)]
    pub status: Status,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated: DateTime<Utc>,

    /// Author (who created this work)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Work {
    const PREFIX: &'static str = "WRK";

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

impl Work {
    /// Create a new empty work
    pub fn new(name: String, unit: String, author: String) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Wrk),
            reference: None,
            name,
            description: None,
            category: None,
            unit,
            components: Vec::new(),
            margin: None,
            costs: None,
            is_custom: false,
            tags: Vec::new(),
            status: Status::default(),
            created: now,
            updated: now,
            author,
            entity_revision: 1,
        }
    }

    /// Margin percentage applied when pricing this work
    pub fn effective_margin(&self) -> f64 {
        self.margin.unwrap_or(crate::core::costing::DEFAULT_MARGIN)
    }

    /// The cached sale price from the last repricing, if any
    pub fn cached_price(&self) -> Option<f64> {
        self.costs.as_ref().map(|c| c.recommended_price)
    }

    /// Find a component line by referenced id
    pub fn find_component(&self, id: &str) -> Option<&WorkComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Add a component, merging quantities when the same entity is
    /// already referenced. Returns true if a new line was created.
    pub fn add_component(&mut self, kind: ComponentKind, id: String, quantity: f64) -> bool {
        if let Some(existing) = self
            .components
            .iter_mut()
            .find(|c| c.kind == kind && c.id == id)
        {
            existing.quantity += quantity;
            return false;
        }
        self.components.push(WorkComponent {
            kind,
            id,
            quantity,
            notes: None,
        });
        true
    }

    /// Remove all component lines referencing the given id
    ///
    /// Returns the number of lines removed.
    pub fn remove_component(&mut self, id: &str) -> usize {
        let before = self.components.len();
        self.components.retain(|c| c.id != id);
        before - self.components.len()
    }

    /// Ids of sub-works referenced by this work
    pub fn sub_work_ids(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Work)
            .map(|c| c.id.as_str())
    }

    /// Record a mutation: bump the revision and the updated timestamp
    pub fn touch(&mut self) {
        self.updated = Utc::now();
        self.entity_revision += 1;
    }
}
