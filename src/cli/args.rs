//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, init::InitArgs, lab::LabCommands, mat::MatCommands,
    validate::ValidateArgs, work::WorkCommands,
};

/// owl - Ouvrage Work Library
///
/// Manage a construction work library (materials, labor, composite works)
/// as plain-text YAML files with cost rollup.
#[derive(Parser, Debug)]
#[command(name = "owl", version, about, max_term_width = 100)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new work library project
    Init(InitArgs),

    /// Manage the material catalog (fournitures)
    #[command(subcommand)]
    Mat(MatCommands),

    /// Manage the labor catalog (main d'œuvre)
    #[command(subcommand)]
    Lab(LabCommands),

    /// Manage the work catalog (ouvrages) and pricing
    #[command(subcommand)]
    Work(WorkCommands),

    /// Check the library for data-quality issues
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pick a sensible format per command (tables for lists)
    Auto,
    /// Tab-aligned plain text
    Tsv,
    /// Comma-separated values
    Csv,
    /// Raw entity YAML
    Yaml,
    /// Pretty-printed JSON
    Json,
    /// Full entity ids only, one per line
    Id,
    /// Short ids only (MAT@1), one per line
    ShortId,
    /// File paths only
    Path,
}
