//! Shared entity command infrastructure
//!
//! Common patterns for entity CRUD operations, reducing boilerplate
//! across the per-catalog command files.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::CatalogIndex;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;

/// Static configuration for an entity type
pub struct EntityConfig {
    /// Entity prefix (e.g., EntityPrefix::Mat)
    pub prefix: EntityPrefix,
    /// Directories where entities are stored (e.g., &["library/materials"])
    pub dirs: &'static [&'static str],
    /// Singular name for messages (e.g., "material")
    pub name: &'static str,
    /// Plural name for messages (e.g., "materials")
    pub name_plural: &'static str,
}

/// Resolve a user-supplied reference: short id alias, else passthrough
pub fn resolve_reference(project: &Project, input: &str) -> String {
    let short_ids = ShortIdIndex::load(project);
    short_ids
        .resolve(input)
        .unwrap_or_else(|| input.to_string())
}

/// Find an entity file in the given directories
///
/// Entity files are named `<id>.owl.yaml`, so both full ids and
/// unambiguous id prefixes match.
pub fn find_entity_file(
    project: &Project,
    entity_id: &str,
    entity_dirs: &[&str],
) -> Result<PathBuf> {
    for dir in entity_dirs {
        let dir_path = project.root().join(dir);
        if !dir_path.exists() {
            continue;
        }

        for entry in fs::read_dir(&dir_path).into_diagnostic()? {
            let path = entry.into_diagnostic()?.path();
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if filename.ends_with(".owl.yaml") && filename.starts_with(entity_id) {
                return Ok(path);
            }
        }
    }

    Err(miette::miette!("No entity found matching '{}'", entity_id))
}

/// Path where a new entity of this type gets written
pub fn entity_file_path(project: &Project, config: &EntityConfig, id: &EntityId) -> PathBuf {
    project
        .dir_for(config.prefix)
        .join(format!("{}.owl.yaml", id))
}

/// Serialize an entity and write it to its project file
pub fn write_entity<T: serde::Serialize>(entity: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }
    }
    let yaml = serde_yml::to_string(entity).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()?;
    Ok(())
}

/// Generic edit command: open the entity file in the configured editor
pub fn run_edit_generic(id: &str, config: &EntityConfig) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let cli_config = Config::load();

    let resolved_id = resolve_reference(&project, id);
    let path = find_entity_file(&project, &resolved_id, config.dirs)?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(cli_config.editor()).yellow()
    );

    cli_config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

/// Generic delete command
///
/// Refuses to delete an entity still referenced by a work's component
/// list unless forced; a forced delete leaves dangling references that
/// resolve to "Inconnu" and get reported by `owl validate`.
pub fn run_delete_generic(id: &str, config: &EntityConfig, force: bool, quiet: bool) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let resolved_id = resolve_reference(&project, id);
    let path = find_entity_file(&project, &resolved_id, config.dirs)?;
    let full_id = id_from_path(&path);

    let catalogs = CatalogIndex::load(&project);
    let referencing = catalogs.works_referencing(&full_id);
    if !referencing.is_empty() && !force {
        let names: Vec<&str> = referencing.iter().map(|w| w.name.as_str()).collect();
        return Err(miette::miette!(
            "{} '{}' is referenced by {} work(s): {}.\n\
             Delete anyway with --force (references will dangle and price at 0).",
            config.name,
            resolved_id,
            referencing.len(),
            names.join(", ")
        ));
    }

    fs::remove_file(&path).into_diagnostic()?;

    if !quiet {
        println!(
            "{} Deleted {} {}",
            style("✓").green(),
            config.name,
            style(&full_id).cyan()
        );
        if !referencing.is_empty() {
            println!(
                "   {} {} work(s) now hold dangling references; run {} to list them",
                style("⚠").yellow(),
                referencing.len(),
                style("owl validate").cyan()
            );
        }
    }

    Ok(())
}

/// Generic archive command (soft delete): rewrite the status field
pub fn run_archive_generic(id: &str, config: &EntityConfig, quiet: bool) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let resolved_id = resolve_reference(&project, id);
    let path = find_entity_file(&project, &resolved_id, config.dirs)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let mut value: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;
    if let Some(mapping) = value.as_mapping_mut() {
        mapping.insert(
            "status".to_string(),
            serde_yml::Value::String("archived".to_string()),
        );
    }
    let yaml = serde_yml::to_string(&value).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !quiet {
        println!(
            "{} Archived {} {}",
            style("✓").green(),
            config.name,
            style(id_from_path(&path)).cyan()
        );
    }

    Ok(())
}

/// Extract the full entity id from an entity file path
pub fn id_from_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim_end_matches(".owl.yaml").to_string())
        .unwrap_or_default()
}

/// Output for a newly created entity, honoring the format flag
pub fn output_new_entity(
    id: &EntityId,
    file_path: &Path,
    short_id: Option<String>,
    entity_name: &str,
    extra_info: &str,
    global: &GlobalOpts,
) {
    match global.output {
        OutputFormat::Id => {
            println!("{}", id);
        }
        OutputFormat::ShortId => {
            println!("{}", short_id.unwrap_or_else(|| id.to_string()));
        }
        OutputFormat::Path => {
            println!("{}", file_path.display());
        }
        _ => {
            let display_id = short_id.unwrap_or_else(|| id.to_string());
            println!(
                "{} Created {} {}",
                style("✓").green(),
                entity_name,
                style(&display_id).cyan()
            );
            println!("   {}", style(file_path.display()).dim());
            println!("   {}", extra_info);
        }
    }
}

/// Print "No X found" message
pub fn print_no_results(name_plural: &str) {
    println!("No {} found.", name_plural);
}
