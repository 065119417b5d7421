//! `owl mat` command - Material catalog management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::filters::StatusFilter;
use crate::cli::helpers::format_money;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::load_entities;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, MATERIAL_DIRS};
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::entities::Material;

#[derive(Subcommand, Debug)]
pub enum MatCommands {
    /// List materials with filtering
    List(ListArgs),

    /// Create a new material
    New(NewArgs),

    /// Show a material's details
    Show(ShowArgs),

    /// Edit a material in your editor
    Edit(EditArgs),

    /// Delete a material
    Delete(DeleteArgs),

    /// Archive a material (soft delete)
    Archive(ArchiveArgs),

    /// Update a material's unit price
    SetPrice(SetPriceArgs),
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Short,
    Id,
    Reference,
    Name,
    Unit,
    Price,
    Vat,
    Supplier,
    Category,
    Status,
    Created,
}

impl ListColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListColumn::Short => "short",
            ListColumn::Id => "id",
            ListColumn::Reference => "reference",
            ListColumn::Name => "name",
            ListColumn::Unit => "unit",
            ListColumn::Price => "price",
            ListColumn::Vat => "vat",
            ListColumn::Supplier => "supplier",
            ListColumn::Category => "category",
            ListColumn::Status => "status",
            ListColumn::Created => "created",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column definitions for material list output
const MAT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("short", "SHORT", 8),
    ColumnDef::new("id", "ID", 30),
    ColumnDef::new("reference", "REF", 12),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("unit", "UNIT", 6),
    ColumnDef::new("price", "PRICE", 10),
    ColumnDef::new("vat", "VAT %", 6),
    ColumnDef::new("supplier", "SUPPLIER", 16),
    ColumnDef::new("category", "CATEGORY", 14),
    ColumnDef::new("status", "STATUS", 9),
    ColumnDef::new("created", "CREATED", 12),
];

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

    /// Filter by supplier (substring match)
    #[arg(long)]
    pub supplier: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Short,
        ListColumn::Name,
        ListColumn::Unit,
        ListColumn::Price,
        ListColumn::Status,
    ])]
    pub columns: Vec<ListColumn>,

    /// Sort by field
    #[arg(long, default_value = "name")]
    pub sort: ListColumn,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Wrap output for narrow terminals (specify width, e.g., -w 60)
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Material name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Sale unit (e.g., "m²", "kg", "u")
    #[arg(long, short = 'u', default_value = "u")]
    pub unit: String,

    /// Unit price excluding VAT
    #[arg(long, short = 'p', allow_hyphen_values = true)]
    pub price: Option<f64>,

    /// VAT rate percentage (default from config, 20 otherwise)
    #[arg(long)]
    pub vat: Option<f64>,

    /// Catalog reference code
    #[arg(long)]
    pub reference: Option<String>,

    /// Preferred supplier
    #[arg(long)]
    pub supplier: Option<String>,

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

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Material ID or short ID (MAT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Material ID or short ID (MAT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Material ID or short ID (MAT@N)
    pub id: String,

    /// Force deletion even if works reference this material
    #[arg(long)]
    pub force: bool,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct ArchiveArgs {
    /// Material ID or short ID (MAT@N)
    pub id: String,

    /// Suppress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetPriceArgs {
    /// Material ID or short ID (MAT@N)
    pub id: String,

    /// New unit price excluding VAT
    pub price: f64,
}

/// Entity configuration for materials
const ENTITY_CONFIG: crate::cli::EntityConfig = crate::cli::EntityConfig {
    prefix: EntityPrefix::Mat,
    dirs: MATERIAL_DIRS,
    name: "material",
    name_plural: "materials",
};

/// Run a material subcommand
pub fn run(cmd: MatCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MatCommands::List(args) => run_list(args, global),
        MatCommands::New(args) => run_new(args, global),
        MatCommands::Show(args) => run_show(args, global),
        MatCommands::Edit(args) => crate::cli::entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        MatCommands::Delete(args) => crate::cli::entity_cmd::run_delete_generic(
            &args.id,
            &ENTITY_CONFIG,
            args.force,
            args.quiet,
        ),
        MatCommands::Archive(args) => {
            crate::cli::entity_cmd::run_archive_generic(&args.id, &ENTITY_CONFIG, args.quiet)
        }
        MatCommands::SetPrice(args) => run_set_price(args),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut materials: Vec<Material> = load_entities(&project, EntityPrefix::Mat)
        .into_iter()
        .filter(|m: &Material| args.status.matches(m.status))
        .filter(|m| {
            args.category.as_ref().is_none_or(|c| {
                m.category
                    .as_ref()
                    .is_some_and(|mc| mc.to_lowercase().contains(&c.to_lowercase()))
            })
        })
        .filter(|m| {
            args.supplier.as_ref().is_none_or(|s| {
                m.supplier
                    .as_ref()
                    .is_some_and(|ms| ms.to_lowercase().contains(&s.to_lowercase()))
            })
        })
        .filter(|m| {
            args.search.as_ref().is_none_or(|search| {
                let needle = search.to_lowercase();
                m.name.to_lowercase().contains(&needle)
                    || m.reference
                        .as_ref()
                        .is_some_and(|r| r.to_lowercase().contains(&needle))
                    || m.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
        })
        .collect();

    match args.sort {
        ListColumn::Short | ListColumn::Id => {
            materials.sort_by(|a, b| a.id.to_string().cmp(&b.id.to_string()))
        }
        ListColumn::Reference => materials.sort_by(|a, b| a.reference.cmp(&b.reference)),
        ListColumn::Unit => materials.sort_by(|a, b| a.unit.cmp(&b.unit)),
        ListColumn::Price => {
            materials.sort_by(|a, b| a.unit_price.total_cmp(&b.unit_price))
        }
        ListColumn::Vat => materials.sort_by(|a, b| a.vat_rate.total_cmp(&b.vat_rate)),
        ListColumn::Supplier => materials.sort_by(|a, b| a.supplier.cmp(&b.supplier)),
        ListColumn::Category => materials.sort_by(|a, b| a.category.cmp(&b.category)),
        ListColumn::Status => {
            materials.sort_by(|a, b| a.status.to_string().cmp(&b.status.to_string()))
        }
        ListColumn::Created => materials.sort_by(|a, b| a.created.cmp(&b.created)),
        ListColumn::Name => materials.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    if args.reverse {
        materials.reverse();
    }

    if let Some(limit) = args.limit {
        materials.truncate(limit);
    }

    if args.count {
        println!("{}", materials.len());
        return Ok(());
    }

    if materials.is_empty() {
        crate::cli::entity_cmd::print_no_results(ENTITY_CONFIG.name_plural);
        return Ok(());
    }

    // Update short ID index
    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(materials.iter().map(|m| m.id.to_string()));
    let _ = short_ids.save(&project);

    let format = crate::cli::output::effective_format(global.output, true);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&materials).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&materials).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows: Vec<TableRow> = materials.iter().map(mat_to_row).collect();
            let columns: Vec<&str> = args.columns.iter().map(|c| c.as_str()).collect();

            let config = match args.wrap {
                Some(width) => TableConfig::with_wrap(width),
                None => TableConfig::default(),
            };
            let formatter =
                TableFormatter::new(MAT_COLUMNS, ENTITY_CONFIG.name, "MAT").with_config(config);
            formatter.output(rows, format, &columns, &short_ids);
        }
    }

    Ok(())
}

/// Convert a material to a TableRow
fn mat_to_row(mat: &Material) -> TableRow {
    TableRow::new(mat.id.to_string())
        .cell("short", CellValue::ShortId(mat.id.to_string()))
        .cell("id", CellValue::Id(mat.id.to_string()))
        .cell(
            "reference",
            CellValue::Text(mat.reference.clone().unwrap_or_else(|| "-".to_string())),
        )
        .cell("name", CellValue::Text(mat.name.clone()))
        .cell("unit", CellValue::Text(mat.unit.clone()))
        .cell("price", CellValue::Money(mat.unit_price))
        .cell("vat", CellValue::Qty(mat.vat_rate))
        .cell(
            "supplier",
            CellValue::Text(mat.supplier.clone().unwrap_or_else(|| "-".to_string())),
        )
        .cell(
            "category",
            CellValue::Text(mat.category.clone().unwrap_or_else(|| "-".to_string())),
        )
        .cell("status", CellValue::Status(mat.status))
        .cell("created", CellValue::Date(mat.created))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load();

    let name: String;
    let unit: String;
    let price: f64;

    if args.interactive {
        name = dialoguer::Input::new()
            .with_prompt("Material name")
            .interact_text()
            .into_diagnostic()?;
        unit = dialoguer::Input::new()
            .with_prompt("Unit")
            .default("u".to_string())
            .interact_text()
            .into_diagnostic()?;
        price = dialoguer::Input::new()
            .with_prompt("Unit price (excl. VAT)")
            .interact_text()
            .into_diagnostic()?;
    } else {
        name = args
            .name
            .clone()
            .ok_or_else(|| miette::miette!("Material name is required (use --name or -n)"))?;
        unit = args.unit.clone();
        price = args
            .price
            .ok_or_else(|| miette::miette!("Unit price is required (use --price or -p)"))?;
    }

    if price < 0.0 {
        return Err(miette::miette!("Unit price must not be negative"));
    }

    let vat = args.vat.unwrap_or_else(|| config.default_vat_rate());
    if !(0.0..=100.0).contains(&vat) {
        return Err(miette::miette!("VAT rate must be between 0 and 100"));
    }

    let mut material = Material::new(name.clone(), unit, price, config.author());
    material.vat_rate = vat;
    material.reference = args.reference.clone();
    material.supplier = args.supplier.clone();
    material.category = args.category.clone();
    material.description = args.description.clone();

    let file_path = crate::cli::entity_cmd::entity_file_path(&project, &ENTITY_CONFIG, &material.id);
    crate::cli::entity_cmd::write_entity(&material, &file_path)?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(material.id.to_string());
    let _ = short_ids.save(&project);

    let extra_info = format!(
        "{} | {} {} / {}",
        style(&name).yellow(),
        style(format_money(price)).white(),
        "€",
        material.unit
    );
    crate::cli::entity_cmd::output_new_entity(
        &material.id,
        &file_path,
        short_id,
        ENTITY_CONFIG.name,
        &extra_info,
        global,
    );

    if args.edit || (!args.no_edit && !args.interactive && config.auto_edit()) {
        println!();
        println!("Opening in {}...", style(config.editor()).yellow());
        config.run_editor(&file_path).into_diagnostic()?;
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let resolved_id = crate::cli::entity_cmd::resolve_reference(&project, &args.id);
    let path = crate::cli::entity_cmd::find_entity_file(&project, &resolved_id, MATERIAL_DIRS)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let mat: Material = serde_yml::from_str(&content).into_diagnostic()?;

    match global.output {
        OutputFormat::Yaml | OutputFormat::Auto => {
            if global.output == OutputFormat::Yaml {
                print!("{}", content);
            } else {
                print_material(&mat);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&mat).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => println!("{}", mat.id),
        OutputFormat::ShortId => {
            let short_ids = ShortIdIndex::load(&project);
            println!(
                "{}",
                short_ids
                    .get_short_id(&mat.id.to_string())
                    .unwrap_or_else(|| mat.id.to_string())
            );
        }
        OutputFormat::Path => println!("{}", path.display()),
        _ => print_material(&mat),
    }

    Ok(())
}

fn print_material(mat: &Material) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&mat.id.to_string()).cyan());
    println!("{}: {}", style("Name").bold(), style(&mat.name).yellow());
    if let Some(ref reference) = mat.reference {
        println!("{}: {}", style("Reference").bold(), reference);
    }
    println!("{}: {}", style("Status").bold(), mat.status);
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: €{} / {}",
        style("Unit Price").bold(),
        format_money(mat.unit_price),
        mat.unit
    );
    println!("{}: {}%", style("VAT").bold(), mat.vat_rate);
    if let Some(ref supplier) = mat.supplier {
        println!("{}: {}", style("Supplier").bold(), supplier);
    }
    if let Some(ref category) = mat.category {
        println!("{}: {}", style("Category").bold(), category);
    }
    if !mat.tags.is_empty() {
        println!("{}: {}", style("Tags").bold(), mat.tags.join(", "));
    }
    if let Some(ref desc) = mat.description {
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
        mat.author,
        style("Created").dim(),
        mat.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        mat.entity_revision
    );
}

fn run_set_price(args: SetPriceArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    if args.price < 0.0 {
        return Err(miette::miette!("Unit price must not be negative"));
    }

    let resolved_id = crate::cli::entity_cmd::resolve_reference(&project, &args.id);
    let path = crate::cli::entity_cmd::find_entity_file(&project, &resolved_id, MATERIAL_DIRS)?;

    let content = fs::read_to_string(&path).into_diagnostic()?;
    let mut mat: Material = serde_yml::from_str(&content).into_diagnostic()?;

    let old_price = mat.unit_price;
    mat.unit_price = args.price;
    mat.entity_revision += 1;
    crate::cli::entity_cmd::write_entity(&mat, &path)?;

    println!(
        "{} {} price: €{} → €{}",
        style("✓").green(),
        style(&mat.name).cyan(),
        format_money(old_price),
        style(format_money(args.price)).yellow()
    );
    println!(
        "   Works using this material reprice on their next {}",
        style("owl work cost").cyan()
    );

    Ok(())
}
