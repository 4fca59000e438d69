//! `tea energy` command - capacities and energy densities

use console::style;
use miette::Result;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::output::print_record;
use crate::cli::{GlobalOpts, InputArgs, OutputFormat};

pub fn run(input: InputArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&input, &ctx.config)?;
    let record = tea.stack_energy()?;

    let title = format!("Stack energy: {}", tea.label());
    print_record(&title, record, &record.rows(), ctx.format)?;

    if matches!(ctx.format, OutputFormat::Table | OutputFormat::Auto) && !record.missing_contributions.is_empty() {
        eprintln!(
            "{} {} compartment value(s) missing, treated as zero:",
            style("!").yellow(),
            record.missing_contributions.len()
        );
        for missing in &record.missing_contributions {
            eprintln!("   {} {}", missing.compartment, style(&missing.quantity).dim());
        }
    }
    Ok(())
}
