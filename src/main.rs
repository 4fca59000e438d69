use clap::Parser;
use miette::Result;
use tea::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Fancy miette reports with source snippets
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
    tea::logging::init(cli.global.verbose);
    let global = &cli.global;

    match cli.command {
        Commands::Breakdown(args) => tea::cli::commands::breakdown::run(args, global),
        Commands::Energy(input) => tea::cli::commands::energy::run(input, global),
        Commands::Capacities(input) => tea::cli::commands::capacities::run(input, global),
        Commands::Electrolyte(input) => tea::cli::commands::electrolyte::run(input, global),
        Commands::Params(args) => tea::cli::commands::params::run(args, global),
        Commands::Sets(args) => tea::cli::commands::sets::run(args, global),
        Commands::Plot(cmd) => tea::cli::commands::plot::run(cmd, global),
        Commands::Ragone(args) => tea::cli::commands::ragone::run(args, global),
        Commands::Completions(args) => tea::cli::commands::completions::run(args),
    }
}
