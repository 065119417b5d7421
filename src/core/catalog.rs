//! Catalog index and component resolution
//!
//! All pricing operates on an in-memory snapshot of the three catalogs,
//! loaded once per invocation. Resolution never fails: a dangling
//! reference resolves to [`Resolved::Unknown`], which prices at zero and
//! displays as "Inconnu" so one bad line cannot block pricing the rest of
//! a work.

use std::collections::HashMap;
use std::path::Path;

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::entities::{ComponentKind, Labor, Material, Work, WorkComponent};

/// Display name for a dangling reference
pub const UNKNOWN_NAME: &str = "Inconnu";

/// What a component reference resolved to, including the dangling case
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedKind {
    Material,
    Labor,
    Work,
    Unknown,
}

impl std::fmt::Display for ResolvedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedKind::Material => write!(f, "material"),
            ResolvedKind::Labor => write!(f, "labor"),
            ResolvedKind::Work => write!(f, "work"),
            ResolvedKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A resolved component reference borrowed from the catalog snapshot
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Material(&'a Material),
    Labor(&'a Labor),
    Work(&'a Work),
    Unknown,
}

impl<'a> Resolved<'a> {
    pub fn kind(&self) -> ResolvedKind {
        match self {
            Resolved::Material(_) => ResolvedKind::Material,
            Resolved::Labor(_) => ResolvedKind::Labor,
            Resolved::Work(_) => ResolvedKind::Work,
            Resolved::Unknown => ResolvedKind::Unknown,
        }
    }

    /// Display name, "Inconnu" for a dangling reference
    pub fn name(&self) -> &'a str {
        match self {
            Resolved::Material(m) => &m.name,
            Resolved::Labor(l) => &l.name,
            Resolved::Work(w) => &w.name,
            Resolved::Unknown => UNKNOWN_NAME,
        }
    }

    /// Sale unit of the referenced entity, empty for a dangling reference
    pub fn unit(&self) -> &'a str {
        match self {
            Resolved::Material(m) => &m.unit,
            Resolved::Labor(l) => &l.unit,
            Resolved::Work(w) => &w.unit,
            Resolved::Unknown => "",
        }
    }

    /// Price one unit of this entity contributes to a parent work
    ///
    /// Materials and labor contribute their unit price. A sub-work
    /// contributes its cached sale price, not its raw cost; with no cache
    /// it contributes zero until repriced. Unknown contributes zero.
    pub fn unit_price(&self) -> f64 {
        match self {
            Resolved::Material(m) => m.unit_price,
            Resolved::Labor(l) => l.unit_price,
            Resolved::Work(w) => w.cached_price().unwrap_or(0.0),
            Resolved::Unknown => 0.0,
        }
    }
}

/// Id-keyed snapshot of the three catalogs
#[derive(Debug, Default)]
pub struct CatalogIndex {
    materials: HashMap<String, Material>,
    labor: HashMap<String, Labor>,
    works: HashMap<String, Work>,
}

impl CatalogIndex {
    /// Build an index from already-loaded entity lists
    pub fn from_entities(
        materials: impl IntoIterator<Item = Material>,
        labor: impl IntoIterator<Item = Labor>,
        works: impl IntoIterator<Item = Work>,
    ) -> Self {
        Self {
            materials: materials
                .into_iter()
                .map(|m| (m.id.to_string(), m))
                .collect(),
            labor: labor.into_iter().map(|l| (l.id.to_string(), l)).collect(),
            works: works.into_iter().map(|w| (w.id.to_string(), w)).collect(),
        }
    }

    /// Load the full catalog snapshot from a project's entity files
    ///
    /// Files that fail to parse are skipped; `owl validate` is the place
    /// where parse failures get reported with full diagnostics.
    pub fn load(project: &Project) -> Self {
        Self::from_entities(
            load_entities::<Material>(project, EntityPrefix::Mat),
            load_entities::<Labor>(project, EntityPrefix::Lab),
            load_entities::<Work>(project, EntityPrefix::Wrk),
        )
    }

    /// Resolve a component against the catalog its kind tag names
    pub fn resolve(&self, component: &WorkComponent) -> Resolved<'_> {
        match component.kind {
            ComponentKind::Material => self
                .materials
                .get(&component.id)
                .map(Resolved::Material)
                .unwrap_or(Resolved::Unknown),
            ComponentKind::Labor => self
                .labor
                .get(&component.id)
                .map(Resolved::Labor)
                .unwrap_or(Resolved::Unknown),
            ComponentKind::Work => self
                .works
                .get(&component.id)
                .map(Resolved::Work)
                .unwrap_or(Resolved::Unknown),
        }
    }

    /// Infer the kind of a bare id by probing the catalogs
    ///
    /// Probe order is material, then labor, then work; first match wins.
    /// Used only when a component is first attached, so the inferred kind
    /// is fixed on the line from then on.
    pub fn probe(&self, id: &str) -> Option<ComponentKind> {
        if self.materials.contains_key(id) {
            Some(ComponentKind::Material)
        } else if self.labor.contains_key(id) {
            Some(ComponentKind::Labor)
        } else if self.works.contains_key(id) {
            Some(ComponentKind::Work)
        } else {
            None
        }
    }

    pub fn work(&self, id: &str) -> Option<&Work> {
        self.works.get(id)
    }

    pub fn works(&self) -> impl Iterator<Item = &Work> {
        self.works.values()
    }

    /// Replace or add a work in the snapshot
    ///
    /// Used by batch repricing so parents see sub-works repriced earlier
    /// in the same run.
    pub fn insert_work(&mut self, work: Work) {
        self.works.insert(work.id.to_string(), work);
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn labor_entries(&self) -> impl Iterator<Item = &Labor> {
        self.labor.values()
    }

    /// Names of works whose component list references the given id
    pub fn works_referencing(&self, id: &str) -> Vec<&Work> {
        let mut referencing: Vec<&Work> = self
            .works
            .values()
            .filter(|w| w.find_component(id).is_some())
            .collect();
        referencing.sort_by(|a, b| a.name.cmp(&b.name));
        referencing
    }
}

/// Load every parseable entity of one type from its project directories
pub fn load_entities<T: serde::de::DeserializeOwned + 'static>(
    project: &Project,
    prefix: EntityPrefix,
) -> Vec<T> {
    let mut entities = Vec::new();

    for dir in Project::dirs_for(prefix) {
        let dir_path = project.root().join(dir);
        if !dir_path.exists() {
            continue;
        }

        for entry in walkdir::WalkDir::new(&dir_path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_entity_file(e.path()))
        {
            if let Ok(entity) = crate::yaml::parse_yaml_file::<T>(entry.path()) {
                entities.push(entity);
            }
        }
    }

    entities
}

/// Whether a path looks like an owl entity file
pub fn is_entity_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".owl.yaml")
}
