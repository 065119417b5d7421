//! Short ID system for easier entity selection
//!
//! Full ids are 30-character prefixed ULIDs, unpleasant to type. The index
//! assigns each id a stable `PREFIX@N` alias (`MAT@1`, `WRK@3`) the first
//! time it is listed, persisted in `.owl/shortids.json` so aliases keep
//! resolving across invocations.

use std::collections::HashMap;
use std::fs;

use crate::core::project::Project;

/// Index file location within a project
const INDEX_FILE: &str = ".owl/shortids.json";

/// A persistent mapping of `PREFIX@N` aliases to full entity ids
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps "PREFIX@N" to full entity id (e.g., "MAT@1" -> "MAT-01ABC...")
    entries: HashMap<String, String>,

    /// Next available number per prefix
    next_ids: HashMap<String, u32>,

    /// Maps full entity id back to its alias
    #[serde(skip)]
    reverse: HashMap<String, String>,
}

impl ShortIdIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(INDEX_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(mut index) = serde_json::from_str::<ShortIdIndex>(&content) {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                return index;
            }
        }
        Self::new()
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Add an entity id, returning its alias (existing or newly assigned)
    pub fn add(&mut self, entity_id: String) -> Option<String> {
        if let Some(existing) = self.reverse.get(&entity_id) {
            return Some(existing.clone());
        }

        let prefix = entity_id.split('-').next()?.to_string();
        let next = self.next_ids.entry(prefix.clone()).or_insert(1);
        let alias = format!("{}@{}", prefix, next);
        *next += 1;

        self.entries.insert(alias.clone(), entity_id.clone());
        self.reverse.insert(entity_id, alias.clone());
        Some(alias)
    }

    /// Ensure every id in the iterator has an alias
    pub fn ensure_all(&mut self, entity_ids: impl IntoIterator<Item = String>) {
        for id in entity_ids {
            self.add(id);
        }
    }

    /// Resolve a `PREFIX@N` alias to a full entity id
    ///
    /// Returns None for anything that is not a known alias; callers fall
    /// back to treating the input as a full or partial id.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let (prefix, num) = reference.split_once('@')?;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.entries.get(reference).cloned()
    }

    /// Get the alias for a full entity id
    pub fn get_short_id(&self, entity_id: &str) -> Option<String> {
        self.reverse.get(entity_id).cloned()
    }

    /// Number of aliases in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_aliases() {
        let mut index = ShortIdIndex::new();

        assert_eq!(index.add("MAT-01ABC".to_string()).as_deref(), Some("MAT@1"));
        assert_eq!(index.add("MAT-02DEF".to_string()).as_deref(), Some("MAT@2"));
        assert_eq!(index.add("WRK-01GHI".to_string()).as_deref(), Some("WRK@1"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut index = ShortIdIndex::new();

        let first = index.add("LAB-01ABC".to_string());
        let second = index.add("LAB-01ABC".to_string());

        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_resolve_known_alias() {
        let mut index = ShortIdIndex::new();
        index.add("MAT-01ABC".to_string());

        assert_eq!(index.resolve("MAT@1"), Some("MAT-01ABC".to_string()));
        assert_eq!(index.resolve("MAT@2"), None);
    }

    #[test]
    fn test_resolve_rejects_non_aliases() {
        let mut index = ShortIdIndex::new();
        index.add("MAT-01ABC".to_string());

        assert_eq!(index.resolve("MAT-01ABC"), None);
        assert_eq!(index.resolve("plinthe"), None);
        assert_eq!(index.resolve("@1"), None);
        assert_eq!(index.resolve("mat@1"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        let mut index = ShortIdIndex::new();
        index.add("WRK-01ABC".to_string());

        assert_eq!(index.get_short_id("WRK-01ABC").as_deref(), Some("WRK@1"));
        assert_eq!(index.get_short_id("WRK-02DEF"), None);
    }
}
