//! `owl init` command - Initialize a new work library project

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub fn run(args: InitArgs) -> Result<()> {
    let project = Project::init(&args.path).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized work library in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("   library/materials/   material catalog (fournitures)");
    println!("   library/labor/       labor catalog (main d'œuvre)");
    println!("   library/works/       work catalog (ouvrages)");
    println!();
    println!(
        "Create your first material with {}",
        style("owl mat new --name \"...\" --unit m² --price 10").cyan()
    );

    Ok(())
}
