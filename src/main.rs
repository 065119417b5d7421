use clap::Parser;
use miette::Result;
use owl::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => owl::cli::commands::init::run(args),
        Commands::Mat(cmd) => owl::cli::commands::mat::run(cmd, &global),
        Commands::Lab(cmd) => owl::cli::commands::lab::run(cmd, &global),
        Commands::Work(cmd) => owl::cli::commands::work::run(cmd, &global),
        Commands::Validate(args) => owl::cli::commands::validate::run(args),
        Commands::Completions(args) => owl::cli::commands::completions::run(args),
    }
}
