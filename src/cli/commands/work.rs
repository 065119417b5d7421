//! `owl work` command - Work catalog management and pricing
//!
//! Besides the usual CRUD, this is where the costing engine surfaces:
//! `cost` computes the breakdown against current catalog prices, `tree`
//! renders the composition with optional sub-work expansion, `reprice`
//! refreshes cached prices leaves-first.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::StatusFilter;
use crate::cli::helpers::{format_money, format_pct, format_qty, truncate_str};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::{load_entities, CatalogIndex, ResolvedKind};
use crate::core::composition::{expand_components, reprice_order, would_create_cycle};
use crate::core::costing::cost_summary;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, WORK_DIRS};
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::work::{ComponentKind, Work};

#[derive(Subcommand, Debug)]
pub enum WorkCommands {
    /// List works with filtering
    List(ListArgs),

    /// Create a new work
    New(NewArgs),

    /// Show a work's details
    Show(ShowArgs),

    /// Edit a work in your editor
    Edit(EditArgs),

    /// Delete a work
    Delete(DeleteArgs),

    /// Archive a work (soft delete)
    Archive(ArchiveArgs),

    /// Add components to a work
    #[command(name = "add")]
    AddComponent(AddComponentArgs),

    /// Remove a component from a work
    #[command(name = "rm")]
    RemoveComponent(RemoveComponentArgs),

    /// Compute a work's cost breakdown against current catalog prices
    Cost(CostArgs),

    /// Render a work's composition tree
    Tree(TreeArgs),

    /// Refresh cached costs, leaves first
    Reprice(RepriceArgs),
}

/// Column definitions for work list output
const WRK_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("short", "SHORT", 8),
    ColumnDef::new("id", "ID", 30),
    ColumnDef::new("reference", "REF", 12),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("unit", "UNIT", 6),
    ColumnDef::new("lines", "LINES", 6),
    ColumnDef::new("price", "PRICE", 10),
    ColumnDef::new("status", "STATUS", 9),
];

const WRK_VISIBLE: &[&str] = &["short", "name", "unit", "lines", "price", "status"];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "current")]
    pub status: StatusFilter,

    /// Filter by category (substring match)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Search in name, reference, and description
    #[arg(long)]
    pub search: Option<String>,

    /// Only works missing a cost cache
    #[arg(long)]
    pub unpriced: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Wrap output for narrow terminals
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Work name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Sale unit of the assembled work (e.g., "m²", "ml", "u")
    #[arg(long, short = 'u', default_value = "u")]
    pub unit: String,

    /// Catalog reference code
    #[arg(long)]
    pub reference: Option<String>,

    /// Category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Margin percentage (default 20 when unset)
    #[arg(long, short = 'm')]
    pub margin: Option<f64>,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Components as REF:QTY pairs (e.g., --component "MAT@1:3,LAB@1:0.5")
    #[arg(long, short = 'C', value_delimiter = ',')]
    pub component: Vec<String>,

    /// Mark as a one-off work rather than a library entry
    #[arg(long)]
    pub custom: bool,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,

    /// Skip opening in editor
    #[arg(long)]
    pub no_edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Work ID or short ID (WRK@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Work ID or short ID (WRK@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Work ID or short ID (WRK@N)
    pub id: String,

    /// Force deletion even if other works reference this one
    #[arg(long)]
    pub force: bool,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct ArchiveArgs {
    /// Work ID or short ID (WRK@N)
    pub id: String,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddComponentArgs {
    /// Work ID or short ID (WRK@N)
    pub work: String,

    /// Components as REF:QTY pairs (e.g., MAT@1:3 LAB@1:0.5) or a single REF
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,

    /// Quantity for a single component (ignored with REF:QTY format)
    #[arg(long, short = 'Q', default_value = "1")]
    pub qty: f64,

    /// Notes about this component line - only for a single component
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveComponentArgs {
    /// Work ID or short ID (WRK@N)
    pub work: String,

    /// Component ID or short ID (MAT@N, LAB@N, WRK@N) to remove
    pub component: String,
}

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Work ID or short ID (WRK@N)
    pub work: String,

    /// Show the per-component breakdown
    #[arg(long)]
    pub breakdown: bool,
}

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Work ID or short ID (WRK@N)
    pub work: String,

    /// Sub-work ids to expand (comma-separated, short ids accepted)
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,

    /// Expand every sub-work
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct RepriceArgs {
    /// Work ID or short ID (WRK@N); omit with --all
    pub work: Option<String>,

    /// Reprice the whole catalog, leaves first
    #[arg(long)]
    pub all: bool,
}

/// Entity configuration for works
const ENTITY_CONFIG: crate::cli::EntityConfig = crate::cli::EntityConfig {
    prefix: EntityPrefix::Wrk,
    dirs: WORK_DIRS,
    name: "work",
    name_plural: "works",
};

/// Parse a REF:QTY pair (e.g., "MAT@1:3" or "MAT-xxx:0.5")
///
/// Returns (reference, quantity). If no quantity is given, defaults to 1.
fn parse_component_item(input: &str) -> (String, f64) {
    if let Some((reference, qty_str)) = input.rsplit_once(':') {
        // Only split when the tail is a number; ids themselves contain no colon
        if let Ok(qty) = qty_str.parse::<f64>() {
            return (reference.to_string(), qty);
        }
    }
    (input.to_string(), 1.0)
}

/// Run a work subcommand
pub fn run(cmd: WorkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WorkCommands::List(args) => run_list(args, global),
        WorkCommands::New(args) => run_new(args, global),
        WorkCommands::Show(args) => run_show(args, global),
        WorkCommands::Edit(args) => crate::cli::entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        WorkCommands::Delete(args) => crate::cli::entity_cmd::run_delete_generic(
            &args.id,
            &ENTITY_CONFIG,
            args.force,
            args.quiet,
        ),
        WorkCommands::Archive(args) => {
            crate::cli::entity_cmd::run_archive_generic(&args.id, &ENTITY_CONFIG, args.quiet)
        }
        WorkCommands::AddComponent(args) => run_add_component(args),
        WorkCommands::RemoveComponent(args) => run_remove_component(args),
        WorkCommands::Cost(args) => run_cost(args, global),
        WorkCommands::Tree(args) => run_tree(args, global),
        WorkCommands::Reprice(args) => run_reprice(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut works: Vec<Work> = load_entities(&project, EntityPrefix::Wrk)
        .into_iter()
        .filter(|w: &Work| args.status.matches(w.status))
        .filter(|w| {
            args.category.as_ref().is_none_or(|c| {
                w.category
                    .as_ref()
                    .is_some_and(|wc| wc.to_lowercase().contains(&c.to_lowercase()))
            })
        })
        .filter(|w| {
            args.search.as_ref().is_none_or(|search| {
                let needle = search.to_lowercase();
                w.name.to_lowercase().contains(&needle)
                    || w.reference
                        .as_ref()
                        .is_some_and(|r| r.to_lowercase().contains(&needle))
                    || w.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
        })
        .filter(|w| !args.unpriced || w.costs.is_none())
        .collect();

    works.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(limit) = args.limit {
        works.truncate(limit);
    }

    if args.count {
        println!("{}", works.len());
        return Ok(());
    }

    if works.is_empty() {
        crate::cli::entity_cmd::print_no_results(ENTITY_CONFIG.name_plural);
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(works.iter().map(|w| w.id.to_string()));
    let _ = short_ids.save(&project);

    let format = crate::cli::output::effective_format(global.output, true);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&works).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&works).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows: Vec<TableRow> = works
                .iter()
                .map(|w| {
                    let price_cell = match w.cached_price() {
                        Some(price) => CellValue::Money(price),
                        None => CellValue::Text("-".to_string()),
                    };
                    TableRow::new(w.id.to_string())
                        .cell("short", CellValue::ShortId(w.id.to_string()))
                        .cell("id", CellValue::Id(w.id.to_string()))
                        .cell(
                            "reference",
                            CellValue::Text(
                                w.reference.clone().unwrap_or_else(|| "-".to_string()),
                            ),
                        )
                        .cell("name", CellValue::Text(w.name.clone()))
                        .cell("unit", CellValue::Text(w.unit.clone()))
                        .cell("lines", CellValue::Text(w.components.len().to_string()))
                        .cell("price", price_cell)
                        .cell("status", CellValue::Status(w.status))
                })
                .collect();

            let config = match args.wrap {
                Some(width) => TableConfig::with_wrap(width),
                None => TableConfig::default(),
            };
            let formatter =
                TableFormatter::new(WRK_COLUMNS, ENTITY_CONFIG.name, "WRK").with_config(config);
            formatter.output(rows, format, WRK_VISIBLE, &short_ids);
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();

    let name = args
        .name
        .clone()
        .ok_or_else(|| miette::miette!("Work name is required (use --name or -n)"))?;

    if let Some(margin) = args.margin {
        if margin < 0.0 {
            return Err(miette::miette!("Margin must not be negative"));
        }
    }

    let mut work = Work::new(name.clone(), args.unit.clone(), config.author());
    work.reference = args.reference.clone();
    work.category = args.category.clone();
    work.margin = args.margin.or(config.default_margin);
    work.description = args.description.clone();
    work.is_custom = args.custom;

    let catalogs = CatalogIndex::load(&project);
    let short_ids = ShortIdIndex::load(&project);

    let mut attached = 0;
    for item in &args.component {
        let (reference, qty) = parse_component_item(item);
        let (kind, id) = attach_component(&mut work, &reference, qty, &catalogs, &short_ids)?;
        if global.output == OutputFormat::Auto {
            println!(
                "   {} {} {} x{}",
                style("→").dim(),
                kind,
                style(&id).cyan(),
                format_qty(qty)
            );
        }
        attached += 1;
    }

    if attached > 0 {
        work.costs = Some(cost_summary(&work, &catalogs).to_costs());
    }

    let file_path = crate::cli::entity_cmd::entity_file_path(&project, &ENTITY_CONFIG, &work.id);
    crate::cli::entity_cmd::write_entity(&work, &file_path)?;

    let mut short_ids = short_ids;
    let short_id = short_ids.add(work.id.to_string());
    let _ = short_ids.save(&project);

    let extra_info = match work.cached_price() {
        Some(price) => format!(
            "{} | {} component(s) | €{} / {}",
            style(&name).yellow(),
            attached,
            format_money(price),
            work.unit
        ),
        None => format!("{}", style(&name).yellow()),
    };
    crate::cli::entity_cmd::output_new_entity(
        &work.id,
        &file_path,
        short_id,
        ENTITY_CONFIG.name,
        &extra_info,
        global,
    );

    if args.edit || (!args.no_edit && config.auto_edit()) {
        println!();
        println!("Opening in {}...", style(config.editor()).yellow());
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

/// Resolve a reference, infer its catalog, and attach it to the work
///
/// The kind tag is fixed here, at attach time, by probing the catalogs
/// material → labor → work (first match wins). Cycle-closing work edges
/// are rejected so the catalog on disk stays acyclic.
fn attach_component(
    work: &mut Work,
    reference: &str,
    qty: f64,
    catalogs: &CatalogIndex,
    short_ids: &ShortIdIndex,
) -> Result<(ComponentKind, String)> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(miette::miette!(
            "Quantity for '{}' must be a positive number, got {}",
            reference,
            qty
        ));
    }

    let id = short_ids
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string());

    let kind = catalogs.probe(&id).ok_or_else(|| {
        miette::miette!(
            "'{}' not found in any catalog.\n\
             Create it first with owl mat new, owl lab new, or owl work new.",
            reference
        )
    })?;

    if kind == ComponentKind::Work {
        let parent_id = work.id.to_string();
        if would_create_cycle(&parent_id, &id, catalogs) {
            return Err(miette::miette!(
                "Adding '{}' would create a cycle through sub-work references",
                reference
            ));
        }
    }

    work.add_component(kind, id.clone(), qty);
    Ok((kind, id))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let resolved_id = crate::cli::entity_cmd::resolve_reference(&project, &args.id);
    let path = crate::cli::entity_cmd::find_entity_file(&project, &resolved_id, WORK_DIRS)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let work: Work = serde_yml::from_str(&content).into_diagnostic()?;

    match global.output {
        OutputFormat::Yaml => print!("{}", content),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&work).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", work.id),
        OutputFormat::ShortId => {
            let short_ids = ShortIdIndex::load(&project);
            println!(
                "{}",
                short_ids
                    .get_short_id(&work.id.to_string())
                    .unwrap_or_else(|| work.id.to_string())
            );
        }
        OutputFormat::Path => println!("{}", path.display()),
        _ => {
            let catalogs = CatalogIndex::load(&project);
            print_work(&work, &catalogs);
        }
    }

    Ok(())
}

fn print_work(work: &Work, catalogs: &CatalogIndex) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&work.id.to_string()).cyan());
    println!("{}: {}", style("Name").bold(), style(&work.name).yellow());
    if let Some(ref reference) = work.reference {
        println!("{}: {}", style("Reference").bold(), reference);
    }
    println!("{}: {}", style("Unit").bold(), work.unit);
    println!("{}: {}", style("Status").bold(), work.status);
    if work.is_custom {
        println!("{}: yes", style("Custom").bold());
    }
    println!("{}", style("─".repeat(60)).dim());

    if !work.components.is_empty() {
        println!();
        println!("{}", style("Components:").bold());
        for row in expand_components(work, catalogs, &HashSet::new()) {
            let marker = match row.kind {
                ResolvedKind::Unknown => style("?").red(),
                _ => style("•").dim(),
            };
            println!(
                "  {} {} x{} {} · €{}",
                marker,
                style(truncate_str(&row.name, 32)).cyan(),
                format_qty(row.quantity),
                row.unit,
                format_money(row.line_total)
            );
        }
    }

    println!();
    println!(
        "{}: {}%",
        style("Margin").bold(),
        format_qty(work.effective_margin())
    );
    match &work.costs {
        Some(costs) => {
            println!(
                "{}: €{} (déboursé sec €{})",
                style("Cached Price").bold(),
                style(format_money(costs.recommended_price)).green(),
                format_money(costs.total_cost)
            );
        }
        None => {
            println!(
                "{}: not yet priced, run {}",
                style("Cached Price").bold(),
                style("owl work reprice").cyan()
            );
        }
    }

    if let Some(ref desc) = work.description {
        if !desc.is_empty() {
            println!();
            println!("{}", style("Description:").bold());
            println!("{}", desc);
        }
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        work.author,
        style("Updated").dim(),
        work.updated.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        work.entity_revision
    );
}

fn run_add_component(args: AddComponentArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let short_ids = ShortIdIndex::load(&project);

    if args.components.is_empty() {
        return Err(miette::miette!(
            "At least one component is required.\n\
             Usage: owl work add WRK@1 MAT@1:3 LAB@1:0.5\n\
                    owl work add WRK@1 MAT@1 --qty 3"
        ));
    }

    let (mut work, path) = find_work_file(&project, &args.work)?;

    // Single-component mode allows --qty and --notes
    let single_mode = args.components.len() == 1 && !args.components[0].contains(':');

    let catalogs = CatalogIndex::load(&project);
    for component_arg in &args.components {
        let (reference, qty) = if single_mode {
            (component_arg.clone(), args.qty)
        } else {
            parse_component_item(component_arg)
        };

        let (kind, id) = attach_component(&mut work, &reference, qty, &catalogs, &short_ids)?;

        if single_mode {
            if let Some(ref notes) = args.notes {
                if let Some(line) = work.components.iter_mut().find(|c| c.id == id) {
                    line.notes = Some(notes.clone());
                }
            }
        }

        println!(
            "{} Added {} {} x{} to {}",
            style("✓").green(),
            kind,
            style(&reference).cyan(),
            format_qty(qty),
            style(&work.name).yellow()
        );
    }

    work.costs = Some(cost_summary(&work, &catalogs).to_costs());
    work.touch();
    crate::cli::entity_cmd::write_entity(&work, &path)?;

    println!(
        "   {} line(s), recommended price €{}",
        work.components.len(),
        format_money(work.cached_price().unwrap_or(0.0))
    );

    Ok(())
}

fn run_remove_component(args: RemoveComponentArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let short_ids = ShortIdIndex::load(&project);

    let (mut work, path) = find_work_file(&project, &args.work)?;

    let component_id = short_ids
        .resolve(&args.component)
        .unwrap_or_else(|| args.component.clone());

    let removed = work.remove_component(&component_id);
    if removed == 0 {
        return Err(miette::miette!(
            "Component '{}' not found in work '{}'",
            args.component,
            args.work
        ));
    }

    let catalogs = CatalogIndex::load(&project);
    work.costs = Some(cost_summary(&work, &catalogs).to_costs());
    work.touch();
    crate::cli::entity_cmd::write_entity(&work, &path)?;

    println!(
        "{} Removed {} from {}",
        style("✓").green(),
        style(&args.component).cyan(),
        style(&work.name).yellow()
    );
    println!("   {} line(s) remaining", work.components.len());

    Ok(())
}

fn run_cost(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let short_ids = ShortIdIndex::load(&project);

    let (work, _path) = find_work_file(&project, &args.work)?;
    let catalogs = CatalogIndex::load(&project);

    let summary = cost_summary(&work, &catalogs);

    if global.output == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
        println!("{}", json);
        return Ok(());
    }
    if global.output == OutputFormat::Yaml {
        let yaml = serde_yml::to_string(&summary).into_diagnostic()?;
        print!("{}", yaml);
        return Ok(());
    }

    // Data-quality warnings: dangling refs and unpriced sub-works
    let mut dangling: Vec<&str> = Vec::new();
    let mut unpriced: Vec<&str> = Vec::new();
    for component in &work.components {
        match catalogs.resolve(component) {
            crate::core::catalog::Resolved::Unknown => dangling.push(component.id.as_str()),
            crate::core::catalog::Resolved::Work(sub) if sub.costs.is_none() => {
                unpriced.push(component.id.as_str())
            }
            _ => {}
        }
    }

    println!("{} {}", style("Work:").bold(), style(&work.name).cyan());
    println!("{} {}", style("Unit:").bold(), work.unit);
    println!();

    if args.breakdown && !work.components.is_empty() {
        println!(
            "{:<10} {:<28} {:<9} {:<8} {:<10} {:<10}",
            style("SHORT").bold(),
            style("NAME").bold(),
            style("KIND").bold(),
            style("QTY").bold(),
            style("UNIT €").bold(),
            style("LINE €").bold()
        );
        println!("{}", "-".repeat(80));

        for row in expand_components(&work, &catalogs, &HashSet::new()) {
            let id_short = short_ids
                .get_short_id(&row.id)
                .unwrap_or_else(|| truncate_str(&row.id, 8));
            println!(
                "{:<10} {:<28} {:<9} {:<8} {:<10} {:<10}",
                id_short,
                truncate_str(&row.name, 26),
                row.kind.to_string(),
                format_qty(row.quantity),
                format_money(row.unit_price),
                format_money(row.line_total)
            );
        }
        println!("{}", "-".repeat(80));
    }

    println!(
        "{} €{}",
        style("Déboursé sec:").bold(),
        format_money(summary.total_cost)
    );
    println!(
        "   Materials: €{} ({}%)",
        format_money(summary.material_cost),
        format_pct(summary.material_share)
    );
    println!(
        "   Labor:     €{} ({}%)",
        format_money(summary.labor_cost),
        format_pct(summary.labor_share)
    );
    println!(
        "   Sub-works: €{} ({}%)",
        format_money(summary.sub_works_cost),
        format_pct(summary.sub_works_share)
    );
    println!(
        "{} €{} ({}%)",
        style("Margin:").bold(),
        format_money(summary.margin_amount),
        format_qty(summary.margin)
    );
    println!(
        "{} €{}",
        style("Recommended Price:").green().bold(),
        format_money(summary.recommended_price)
    );

    if !dangling.is_empty() {
        println!();
        println!(
            "{} {} component(s) resolve to Inconnu and price at 0:",
            style("⚠ Warning:").yellow().bold(),
            dangling.len()
        );
        for id in &dangling {
            println!("   {} {}", style("•").dim(), id);
        }
    }

    if !unpriced.is_empty() {
        println!();
        println!(
            "{} {} sub-work(s) not yet priced, contributing 0:",
            style("⚠ Warning:").yellow().bold(),
            unpriced.len()
        );
        for id in &unpriced {
            let display = short_ids
                .get_short_id(id)
                .unwrap_or_else(|| id.to_string());
            println!(
                "   {} {} - run: owl work reprice {}",
                style("•").dim(),
                display,
                display
            );
        }
    }

    Ok(())
}

fn run_tree(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let short_ids = ShortIdIndex::load(&project);

    let (work, _path) = find_work_file(&project, &args.work)?;
    let catalogs = CatalogIndex::load(&project);

    // The expanded set is plain state owned here, the expander just reads it
    let expanded: HashSet<String> = if args.all {
        catalogs.works().map(|w| w.id.to_string()).collect()
    } else {
        args.expand
            .iter()
            .map(|r| short_ids.resolve(r).unwrap_or_else(|| r.clone()))
            .collect()
    };

    let rows = expand_components(&work, &catalogs, &expanded);

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
            return Ok(());
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
            return Ok(());
        }
        _ => {}
    }

    println!(
        "{} {} ({})",
        style("Work").bold(),
        style(&work.name).cyan(),
        work.unit
    );
    println!();

    if rows.is_empty() {
        println!("No components.");
        return Ok(());
    }

    for row in &rows {
        let indent = "  ".repeat(row.depth);
        let marker = match row.kind {
            ResolvedKind::Work => style("▸").cyan(),
            ResolvedKind::Unknown => style("?").red(),
            _ => style("•").dim(),
        };
        println!(
            "{}{} {} x{} {} · €{} ({})",
            indent,
            marker,
            row.name,
            format_qty(row.quantity),
            row.unit,
            format_money(row.line_total),
            style(row.kind.to_string()).dim()
        );
    }

    Ok(())
}

fn run_reprice(args: RepriceArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    if args.all {
        return run_reprice_all(&project);
    }

    let reference = args.work.as_deref().ok_or_else(|| {
        miette::miette!("Give a work id to reprice, or pass --all for the whole catalog")
    })?;

    let (mut work, path) = find_work_file(&project, reference)?;
    let catalogs = CatalogIndex::load(&project);

    let old_price = work.cached_price();
    let summary = cost_summary(&work, &catalogs);
    work.costs = Some(summary.to_costs());
    work.touch();
    crate::cli::entity_cmd::write_entity(&work, &path)?;

    match old_price {
        Some(old) => println!(
            "{} Repriced {}: €{} → €{}",
            style("✓").green(),
            style(&work.name).cyan(),
            format_money(old),
            style(format_money(summary.recommended_price)).yellow()
        ),
        None => println!(
            "{} Priced {}: €{}",
            style("✓").green(),
            style(&work.name).cyan(),
            style(format_money(summary.recommended_price)).yellow()
        ),
    }

    Ok(())
}

fn run_reprice_all(project: &Project) -> Result<()> {
    let mut catalogs = CatalogIndex::load(project);
    let short_ids = ShortIdIndex::load(project);

    let (order, cyclic) = reprice_order(&catalogs);

    let mut repriced = 0;
    for id in &order {
        let Some(work) = catalogs.work(id) else {
            continue;
        };
        let mut work = work.clone();
        let summary = cost_summary(&work, &catalogs);
        work.costs = Some(summary.to_costs());
        work.touch();

        let path = find_path_for_id(project, id)?;
        crate::cli::entity_cmd::write_entity(&work, &path)?;

        // Later parents in the order see this fresh price
        catalogs.insert_work(work);
        repriced += 1;
    }

    println!(
        "{} Repriced {} work(s), leaves first",
        style("✓").green(),
        style(repriced).cyan()
    );

    if !cyclic.is_empty() {
        println!();
        println!(
            "{} {} work(s) sit on or depend on a composition cycle and were skipped:",
            style("⚠ Warning:").yellow().bold(),
            cyclic.len()
        );
        for id in &cyclic {
            let display = short_ids
                .get_short_id(id)
                .unwrap_or_else(|| id.to_string());
            let name = catalogs.work(id).map(|w| w.name.as_str()).unwrap_or("");
            println!("   {} {} {}", style("•").dim(), display, style(name).cyan());
        }
        println!("   Fix the cycle by removing one of the sub-work references.");
    }

    Ok(())
}

/// Find a work file by user reference and return the parsed work and path
fn find_work_file(project: &Project, reference: &str) -> Result<(Work, PathBuf)> {
    let resolved_id = crate::cli::entity_cmd::resolve_reference(project, reference);
    let path = crate::cli::entity_cmd::find_entity_file(project, &resolved_id, WORK_DIRS)?;
    let work: Work = crate::yaml::parse_yaml_file(&path).map_err(|e| miette::miette!("{}", e))?;
    Ok((work, path))
}

/// Locate the on-disk file for a known full work id
fn find_path_for_id(project: &Project, id: &str) -> Result<PathBuf> {
    crate::cli::entity_cmd::find_entity_file(project, id, WORK_DIRS)
}
