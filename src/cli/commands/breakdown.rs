//! `tea breakdown` command - mass and volume breakdown

use console::style;
use miette::Result;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::output::{print_csv, print_json, print_yaml};
use crate::cli::table::{self, format_value};
use crate::cli::{GlobalOpts, InputArgs, OutputFormat};
use crate::core::breakdown::{Kind, StackBreakdown};

#[derive(clap::Args, Debug)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// One "<component> <quantity>" row per value instead of one row per component
    #[arg(long)]
    pub flat: bool,
}

fn headers() -> Vec<&'static str> {
    let mut headers = vec!["Component"];
    headers.extend(Kind::ALL.iter().map(|k| k.label()));
    headers
}

fn records(breakdown: &StackBreakdown, raw: bool) -> Vec<Vec<String>> {
    breakdown
        .entries()
        .iter()
        .map(|entry| {
            let mut record = vec![entry.name()];
            record.extend(Kind::ALL.iter().map(|k| {
                let v = entry.value(*k);
                if raw {
                    v.to_string()
                } else {
                    format_value(v)
                }
            }));
            record
        })
        .collect()
}

pub fn run(args: BreakdownArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&args.input, &ctx.config)?;
    let breakdown = tea.stack_breakdown()?;

    if args.flat {
        let rows: Vec<(String, f64)> = breakdown.to_map().into_iter().collect();
        return match ctx.format {
            OutputFormat::Json => print_json(&breakdown.to_map()),
            OutputFormat::Yaml => print_yaml(&breakdown.to_map()),
            OutputFormat::Csv => print_csv(
                &["quantity", "value"],
                &rows
                    .iter()
                    .map(|(k, v)| vec![k.clone(), v.to_string()])
                    .collect::<Vec<_>>(),
            ),
            OutputFormat::Table | OutputFormat::Auto => {
                println!("{}", table::key_value(&rows));
                Ok(())
            }
        };
    }

    match ctx.format {
        OutputFormat::Json => print_json(breakdown.entries()),
        OutputFormat::Yaml => print_yaml(breakdown.entries()),
        OutputFormat::Csv => print_csv(&headers(), &records(breakdown, true)),
        OutputFormat::Table | OutputFormat::Auto => {
            println!("{} {}", style("Stack breakdown:").bold(), style(tea.label()).cyan());
            println!("{}", table::grid(&headers(), &records(breakdown, false)));
            println!(
                "Repeat unit mass loading (current collectors halved): {} mg.cm-2",
                style(format_value(breakdown.stack_mass_loading())).yellow()
            );
            Ok(())
        }
    }
}
