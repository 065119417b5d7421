//! Core module - fundamental types and the costing engine

pub mod catalog;
pub mod composition;
pub mod config;
pub mod costing;
pub mod entity;
pub mod identity;
pub mod project;
pub mod shortid;

pub use catalog::{CatalogIndex, Resolved, ResolvedKind};
pub use composition::{expand_components, reprice_order, would_create_cycle, CompositionRow};
pub use config::Config;
pub use costing::{cost_summary, CostSummary, DEFAULT_MARGIN};
pub use entity::{Entity, Status};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use shortid::ShortIdIndex;
