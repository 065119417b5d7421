//! Entity identity - prefixed ULID identifiers
//!
//! Every library entity carries a `PREFIX-ULID` identifier (e.g.
//! `MAT-01HQXJ...`). The prefix encodes the catalog the entity belongs to,
//! the ULID part makes ids sortable by creation time and safe to generate
//! offline.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Entity type prefixes for the three catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    /// Material (fourniture)
    Mat,
    /// Labor (main d'oeuvre)
    Lab,
    /// Work (ouvrage)
    Wrk,
}

impl EntityPrefix {
    /// The string form used in ids and filenames
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Mat => "MAT",
            EntityPrefix::Lab => "LAB",
            EntityPrefix::Wrk => "WRK",
        }
    }

    /// Parse a prefix from its string form
    pub fn from_str_opt(s: &str) -> Option<EntityPrefix> {
        match s {
            "MAT" => Some(EntityPrefix::Mat),
            "LAB" => Some(EntityPrefix::Lab),
            "WRK" => Some(EntityPrefix::Wrk),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an entity id from a string
#[derive(Debug, thiserror::Error)]
pub enum IdParseError {
    #[error("id '{0}' has no prefix separator")]
    MissingSeparator(String),

    #[error("id '{id}' has unknown prefix '{prefix}'")]
    UnknownPrefix { id: String, prefix: String },

    #[error("id '{0}' has an invalid ULID part")]
    InvalidUlid(String),
}

/// A prefixed entity identifier, stored and serialized as a plain string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh id for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self(format!("{}-{}", prefix.as_str(), Ulid::new()))
    }

    /// Parse and validate an id string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let (prefix, ulid_part) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingSeparator(s.to_string()))?;

        if EntityPrefix::from_str_opt(prefix).is_none() {
            return Err(IdParseError::UnknownPrefix {
                id: s.to_string(),
                prefix: prefix.to_string(),
            });
        }

        if Ulid::from_string(ulid_part).is_err() {
            return Err(IdParseError::InvalidUlid(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    /// The prefix portion of the id, if it is a known one
    pub fn prefix(&self) -> Option<EntityPrefix> {
        self.0
            .split_once('-')
            .and_then(|(p, _)| EntityPrefix::from_str_opt(p))
    }

    /// Whether this id belongs to the given catalog
    pub fn has_prefix(&self, prefix: EntityPrefix) -> bool {
        self.0.starts_with(prefix.as_str())
            && self.0.as_bytes().get(prefix.as_str().len()) == Some(&b'-')
    }

    /// Borrow the raw string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_carries_prefix() {
        let id = EntityId::new(EntityPrefix::Mat);
        assert!(id.to_string().starts_with("MAT-"));
        assert!(id.has_prefix(EntityPrefix::Mat));
        assert!(!id.has_prefix(EntityPrefix::Wrk));
    }

    #[test]
    fn test_parse_valid_id() {
        let id = EntityId::new(EntityPrefix::Wrk);
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.prefix(), Some(EntityPrefix::Wrk));
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        let err = EntityId::parse("XYZ-01HQXJ0000000000000000ZZ");
        assert!(matches!(err, Err(IdParseError::UnknownPrefix { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            EntityId::parse("MAT"),
            Err(IdParseError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_ulid() {
        assert!(matches!(
            EntityId::parse("MAT-not-a-ulid"),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = EntityId::new(EntityPrefix::Lab);
        let yaml = serde_yml::to_string(&id).unwrap();
        assert_eq!(yaml.trim(), id.to_string());

        let back: EntityId = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back, id);
    }
}
