//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    breakdown::BreakdownArgs, completions::CompletionsArgs, params::ParamsArgs, plot::PlotCommands,
    ragone::RagoneArgs, sets::SetsArgs,
};

#[derive(Parser, Debug)]
#[command(name = "tea")]
#[command(author, version)]
#[command(about = "Techno-economic stack metrics for lithium-ion electrodes")]
#[command(
    long_about = "Resolves a partial set of lithium-ion electrode, separator and current-collector parameters, \
solves the stoichiometry window and reports capacities, energy densities, electrolyte excess \
and the mass/volume breakdown of one repeat unit of the stack."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Extra configuration file, applied after the user and local files
    #[arg(long, global = true, env = "TEA_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log derivations and defaults (same as RUST_LOG=tea=debug)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `default_format` from the configuration, else table
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Where the parameters of one analysis come from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Parameter file (YAML)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Built-in parameter set to start from (see `tea sets`)
    #[arg(long, short = 'b', value_name = "SET")]
    pub base: Option<String>,

    /// Override one parameter, e.g. --set "Separator porosity=0.4"
    #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mass and volume breakdown of every compartment
    Breakdown(BreakdownArgs),

    /// Capacities, n/p ratios, average potentials and energy densities
    Energy(InputArgs),

    /// Stoichiometry window, voltage cut-offs and first-cycle efficiency
    Capacities(InputArgs),

    /// Electrolyte excess metrics
    Electrolyte(InputArgs),

    /// Resolved parameters with their provenance
    Params(ParamsArgs),

    /// List the built-in parameter sets
    Sets(SetsArgs),

    /// Terminal plots
    #[command(subcommand)]
    Plot(PlotCommands),

    /// Energy against power over a range of discharge rates
    Ragone(RagoneArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_overrides() {
        let cli = Cli::parse_from([
            "tea",
            "energy",
            "--base",
            "Ecker2015",
            "--set",
            "Separator porosity=0.4",
            "-s",
            "Negative electrode porosity=0.3",
        ]);
        match cli.command {
            Commands::Energy(input) => {
                assert_eq!(input.base.as_deref(), Some("Ecker2015"));
                assert_eq!(input.overrides.len(), 2);
                assert!(input.file.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::parse_from(["tea", "sets", "--format", "json"]);
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert_eq!("YAML".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
    }
}
