//! `owl validate` command - Data-quality report for the work library
//!
//! Pricing itself never fails on bad data; this command is where the
//! degraded cases surface: unparseable files, dangling references,
//! non-positive quantities, out-of-range VAT rates, composition cycles,
//! and cost caches that drifted from current catalog prices.

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::core::catalog::{is_entity_file, CatalogIndex, Resolved};
use crate::core::composition::reprice_order;
use crate::core::costing::cost_summary;
use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::entities::{Labor, Material, Work};

/// Caches drifting from recomputed values by more than this are stale
const STALE_EPSILON: f64 = 0.005;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Exit with an error when any issue is found
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't list individual issues
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct Report {
    files_checked: usize,
    issues: Vec<String>,
}

impl Report {
    fn issue(&mut self, message: String) {
        self.issues.push(message);
    }
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let short_ids = ShortIdIndex::load(&project);

    let mut report = Report::default();

    // Pass 1: every entity file must parse as its catalog's type
    let materials = check_parse::<Material>(&project, EntityPrefix::Mat, &mut report);
    let labor = check_parse::<Labor>(&project, EntityPrefix::Lab, &mut report);
    let works = check_parse::<Work>(&project, EntityPrefix::Wrk, &mut report);

    println!(
        "{} Checked {} file(s)",
        style("→").blue(),
        report.files_checked
    );

    // Pass 2: domain invariants over the parsed snapshot
    for mat in &materials {
        if mat.unit_price < 0.0 {
            report.issue(format!(
                "material {} ({}) has a negative unit price",
                mat.id, mat.name
            ));
        }
        if !(0.0..=100.0).contains(&mat.vat_rate) {
            report.issue(format!(
                "material {} ({}) has VAT rate {} outside 0-100",
                mat.id, mat.name, mat.vat_rate
            ));
        }
    }

    for lab in &labor {
        if lab.unit_price < 0.0 {
            report.issue(format!(
                "labor {} ({}) has a negative rate",
                lab.id, lab.name
            ));
        }
    }

    let catalogs = CatalogIndex::from_entities(materials, labor, works.clone());

    for work in &works {
        let display = short_ids
            .get_short_id(&work.id.to_string())
            .unwrap_or_else(|| work.id.to_string());

        for component in &work.components {
            if !component.quantity.is_finite() || component.quantity <= 0.0 {
                report.issue(format!(
                    "work {} ({}) has component {} with non-positive quantity {}",
                    display, work.name, component.id, component.quantity
                ));
            }
            if matches!(catalogs.resolve(component), Resolved::Unknown) {
                report.issue(format!(
                    "work {} ({}) references {} {} which no catalog contains (prices at 0)",
                    display, work.name, component.kind, component.id
                ));
            }
        }
    }

    // Cycles through sub-work references
    let (_, cyclic) = reprice_order(&catalogs);
    for id in &cyclic {
        let name = catalogs.work(id).map(|w| w.name.as_str()).unwrap_or("");
        report.issue(format!(
            "work {} ({}) sits on or depends on a composition cycle",
            short_ids.get_short_id(id).unwrap_or_else(|| id.clone()),
            name
        ));
    }

    // Stale cost caches: recompute against current prices and compare.
    // Works on a cycle are excluded, their recomputation is not meaningful.
    for work in &works {
        let id = work.id.to_string();
        if cyclic.contains(&id) {
            continue;
        }
        if let Some(cached) = &work.costs {
            let fresh = cost_summary(work, &catalogs);
            if (cached.recommended_price - fresh.recommended_price).abs() > STALE_EPSILON
                || (cached.total_cost - fresh.total_cost).abs() > STALE_EPSILON
            {
                report.issue(format!(
                    "work {} ({}) has a stale cost cache: stored €{:.2}, current €{:.2} \
                     (run: owl work reprice --all)",
                    short_ids.get_short_id(&id).unwrap_or_else(|| id.clone()),
                    work.name,
                    cached.recommended_price,
                    fresh.recommended_price
                ));
            }
        }
    }

    println!();
    if report.issues.is_empty() {
        println!("{} No issues found", style("✓").green());
        return Ok(());
    }

    if !args.summary {
        for issue in &report.issues {
            println!("{} {}", style("⚠").yellow(), issue);
        }
        println!();
    }
    println!(
        "{} {} issue(s) found",
        style("⚠").yellow().bold(),
        style(report.issues.len()).yellow()
    );

    if args.strict {
        return Err(miette::miette!(
            "validation failed with {} issue(s)",
            report.issues.len()
        ));
    }

    Ok(())
}

/// Parse every file of one catalog, reporting failures, returning successes
fn check_parse<T: serde::de::DeserializeOwned + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    report: &mut Report,
) -> Vec<T> {
    let mut entities = Vec::new();

    for dir in Project::dirs_for(prefix) {
        let dir_path = project.root().join(dir);
        if !dir_path.exists() {
            continue;
        }

        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&dir_path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_entity_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        for path in paths {
            report.files_checked += 1;
            match crate::yaml::parse_yaml_file::<T>(&path) {
                Ok(entity) => entities.push(entity),
                Err(e) => report.issue(format!("{}: {}", path.display(), e)),
            }
        }
    }

    entities
}
