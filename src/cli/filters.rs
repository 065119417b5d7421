//! Unified filter enums for CLI commands

use clap::ValueEnum;

use crate::core::entity::Status;

/// Status filter for list commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Draft status only
    Draft,
    /// Active status only
    Active,
    /// Archived status only
    Archived,
    /// Everything except archived - default
    #[default]
    Current,
    /// All statuses including archived
    All,
}

impl StatusFilter {
    /// Check if a Status matches this filter
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::Draft => status == Status::Draft,
            StatusFilter::Active => status == Status::Active,
            StatusFilter::Archived => status == Status::Archived,
            StatusFilter::Current => status != Status::Archived,
            StatusFilter::All => true,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Draft => write!(f, "draft"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Archived => write!(f, "archived"),
            StatusFilter::Current => write!(f, "current"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}
