//! `tea sets` command - built-in parameter sets

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::Context;
use crate::cli::output::{print_csv, print_json, print_yaml};
use crate::cli::table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{builtin_names, ParameterSet};

#[derive(clap::Args, Debug)]
pub struct SetsArgs {
    /// Print one set as a parameter file instead of listing them
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SetSummary {
    name: String,
    description: String,
    parameters: usize,
}

pub fn run(args: SetsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;

    if let Some(name) = args.name {
        let set = ParameterSet::builtin(&name)?;
        return match ctx.format {
            OutputFormat::Json => print_json(&set),
            _ => print_yaml(&set),
        };
    }

    let mut summaries = Vec::new();
    for name in builtin_names() {
        let set = ParameterSet::builtin(&name)?;
        summaries.push(SetSummary {
            name,
            description: set.description.unwrap_or_default().trim().to_string(),
            parameters: set.parameters.len(),
        });
    }

    match ctx.format {
        OutputFormat::Json => print_json(&summaries),
        OutputFormat::Yaml => print_yaml(&summaries),
        OutputFormat::Csv => print_csv(
            &["name", "parameters", "description"],
            &summaries
                .iter()
                .map(|s| vec![s.name.clone(), s.parameters.to_string(), s.description.clone()])
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Table | OutputFormat::Auto => {
            let records: Vec<Vec<String>> = summaries
                .iter()
                .map(|s| vec![s.name.clone(), s.parameters.to_string(), s.description.clone()])
                .collect();
            println!("{}", table::grid(&["Set", "Parameters", "Description"], &records));
            println!(
                "Use one with {} or as {} in a parameter file",
                style("--base <SET>").yellow(),
                style("base: <SET>").yellow()
            );
            Ok(())
        }
    }
}
