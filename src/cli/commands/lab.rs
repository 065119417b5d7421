//! `owl lab` command - Labor catalog management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::filters::StatusFilter;
use crate::cli::helpers::format_money;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::load_entities;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, LABOR_DIRS};
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::Labor;

#[derive(Subcommand, Debug)]
pub enum LabCommands {
    /// List labor categories with filtering
    List(ListArgs),

    /// Create a new labor category
    New(NewArgs),

    /// Show a labor category's details
    Show(ShowArgs),

    /// Edit a labor category in your editor
    Edit(EditArgs),

    /// Delete a labor category
    Delete(DeleteArgs),

    /// Archive a labor category (soft delete)
    Archive(ArchiveArgs),

    /// Update a labor category's hourly rate
    SetRate(SetRateArgs),
}

const LAB_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("short", "SHORT", 8),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("unit", "UNIT", 6),
    ColumnDef::new("rate", "RATE", 10),
    ColumnDef::new("category", "CATEGORY", 14),
    ColumnDef::new("status", "STATUS", 9),
];

const LAB_VISIBLE: &[&str] = &["short", "name", "unit", "rate", "category", "status"];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "current")]
    pub status: StatusFilter,

    /// Filter by category (substring match)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Search in name and description
    #[arg(long)]
    pub search: Option<String>,

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
    /// Labor category name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Rate per unit
    #[arg(long, short = 'p')]
    pub rate: Option<f64>,

    /// Billing unit
    #[arg(long, short = 'u', default_value = "h")]
    pub unit: String,

    /// Category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,

    /// Skip opening in editor
    #[arg(long)]
    pub no_edit: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Labor ID or short ID (LAB@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Labor ID or short ID (LAB@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Labor ID or short ID (LAB@N)
    pub id: String,

    /// Force deletion even if works reference this labor category
    #[arg(long)]
    pub force: bool,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct ArchiveArgs {
    /// Labor ID or short ID (LAB@N)
    pub id: String,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetRateArgs {
    /// Labor ID or short ID (LAB@N)
    pub id: String,

    /// New rate per unit
    pub rate: f64,
}

const ENTITY_CONFIG: crate::cli::EntityConfig = crate::cli::EntityConfig {
    prefix: EntityPrefix::Lab,
    dirs: LABOR_DIRS,
    name: "labor category",
    name_plural: "labor categories",
};

pub fn run(cmd: LabCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LabCommands::List(args) => run_list(args, global),
        LabCommands::New(args) => run_new(args, global),
        LabCommands::Show(args) => run_show(args, global),
        LabCommands::Edit(args) => crate::cli::entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        LabCommands::Delete(args) => crate::cli::entity_cmd::run_delete_generic(
            &args.id,
            &ENTITY_CONFIG,
            args.force,
            args.quiet,
        ),
        LabCommands::Archive(args) => {
            crate::cli::entity_cmd::run_archive_generic(&args.id, &ENTITY_CONFIG, args.quiet)
        }
        LabCommands::SetRate(args) => run_set_rate(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut labor: Vec<Labor> = load_entities(&project, EntityPrefix::Lab)
        .into_iter()
        .filter(|l: &Labor| args.status.matches(l.status))
        .filter(|l| {
            args.category.as_ref().is_none_or(|c| {
                l.category
                    .as_ref()
                    .is_some_and(|lc| lc.to_lowercase().contains(&c.to_lowercase()))
            })
        })
        .filter(|l| {
            args.search.as_ref().is_none_or(|search| {
                let needle = search.to_lowercase();
                l.name.to_lowercase().contains(&needle)
                    || l.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
        })
        .collect();

    labor.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(limit) = args.limit {
        labor.truncate(limit);
    }

    if args.count {
        println!("{}", labor.len());
        return Ok(());
    }

    if labor.is_empty() {
        crate::cli::entity_cmd::print_no_results(ENTITY_CONFIG.name_plural);
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(labor.iter().map(|l| l.id.to_string()));
    let _ = short_ids.save(&project);

    let format = crate::cli::output::effective_format(global.output, true);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&labor).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&labor).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows: Vec<TableRow> = labor
                .iter()
                .map(|lab| {
                    TableRow::new(lab.id.to_string())
                        .cell("short", CellValue::ShortId(lab.id.to_string()))
                        .cell("name", CellValue::Text(lab.name.clone()))
                        .cell("unit", CellValue::Text(lab.unit.clone()))
                        .cell("rate", CellValue::Money(lab.unit_price))
                        .cell(
                            "category",
                            CellValue::Text(
                                lab.category.clone().unwrap_or_else(|| "-".to_string()),
                            ),
                        )
                        .cell("status", CellValue::Status(lab.status))
                })
                .collect();

            let config = match args.wrap {
                Some(width) => TableConfig::with_wrap(width),
                None => TableConfig::default(),
            };
            let formatter =
                TableFormatter::new(LAB_COLUMNS, "labor entry", "LAB").with_config(config);
            formatter.output(rows, format, LAB_VISIBLE, &short_ids);
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
        .ok_or_else(|| miette::miette!("Labor name is required (use --name or -n)"))?;
    let rate = args
        .rate
        .ok_or_else(|| miette::miette!("Rate is required (use --rate or -p)"))?;
    if rate < 0.0 {
        return Err(miette::miette!("Rate must not be negative"));
    }

    let mut labor = Labor::new(name.clone(), rate, config.author());
    labor.unit = args.unit.clone();
    labor.category = args.category.clone();
    labor.description = args.description.clone();

    let file_path = crate::cli::entity_cmd::entity_file_path(&project, &ENTITY_CONFIG, &labor.id);
    crate::cli::entity_cmd::write_entity(&labor, &file_path)?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(labor.id.to_string());
    let _ = short_ids.save(&project);

    let extra_info = format!(
        "{} | €{} / {}",
        style(&name).yellow(),
        format_money(rate),
        labor.unit
    );
    crate::cli::entity_cmd::output_new_entity(
        &labor.id,
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

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let resolved_id = crate::cli::entity_cmd::resolve_reference(&project, &args.id);
    let path = crate::cli::entity_cmd::find_entity_file(&project, &resolved_id, LABOR_DIRS)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let lab: Labor = serde_yml::from_str(&content).into_diagnostic()?;

    match global.output {
        OutputFormat::Yaml => print!("{}", content),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&lab).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", lab.id),
        OutputFormat::ShortId => {
            let short_ids = ShortIdIndex::load(&project);
            println!(
                "{}",
                short_ids
                    .get_short_id(&lab.id.to_string())
                    .unwrap_or_else(|| lab.id.to_string())
            );
        }
        OutputFormat::Path => println!("{}", path.display()),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&lab.id.to_string()).cyan());
            println!("{}: {}", style("Name").bold(), style(&lab.name).yellow());
            println!("{}: {}", style("Status").bold(), lab.status);
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: €{} / {}",
                style("Rate").bold(),
                format_money(lab.unit_price),
                lab.unit
            );
            if let Some(ref category) = lab.category {
                println!("{}: {}", style("Category").bold(), category);
            }
            if let Some(ref desc) = lab.description {
                if !desc.is_empty() {
                    println!();
                    println!("{}", style("Description:").bold());
                    println!("{}", desc);
                }
            }
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} | {}: {}",
                style("Author").dim(),
                lab.author,
                style("Created").dim(),
                lab.created.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

fn run_set_rate(args: SetRateArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    if args.rate < 0.0 {
        return Err(miette::miette!("Rate must not be negative"));
    }

    let resolved_id = crate::cli::entity_cmd::resolve_reference(&project, &args.id);
    let path = crate::cli::entity_cmd::find_entity_file(&project, &resolved_id, LABOR_DIRS)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let mut lab: Labor = serde_yml::from_str(&content).into_diagnostic()?;

    let old_rate = lab.unit_price;
    lab.unit_price = args.rate;
    lab.entity_revision += 1;
    crate::cli::entity_cmd::write_entity(&lab, &path)?;

    println!(
        "{} {} rate: €{} → €{}",
        style("✓").green(),
        style(&lab.name).cyan(),
        format_money(old_rate),
        style(format_money(args.rate)).yellow()
    );

    Ok(())
}
