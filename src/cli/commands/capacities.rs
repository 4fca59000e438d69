//! `tea capacities` command - stoichiometry window and cut-offs

use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::output::print_record;
use crate::cli::{GlobalOpts, InputArgs};
use crate::core::stoichiometry::{StoichiometryWindow, WindowSource};

/// Machine-readable view of the capacities table
#[derive(Serialize)]
struct CapacityReport<'a> {
    window: StoichiometryWindow,
    window_source: WindowSource,
    lower_cutoff: Option<f64>,
    upper_cutoff: Option<f64>,
    negative_available_capacity: f64,
    positive_available_capacity: f64,
    negative_practical_capacity: f64,
    positive_practical_capacity: f64,
    capacity: f64,
    first_cycle_efficiency: Option<f64>,
    warnings: &'a [String],
}

pub fn run(input: InputArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&input, &ctx.config)?;
    let record = tea.stack_energy()?;
    let solved = tea.stoichiometry()?;

    let report = CapacityReport {
        window: record.window,
        window_source: record.window_source,
        lower_cutoff: record.lower_cutoff,
        upper_cutoff: record.upper_cutoff,
        negative_available_capacity: record.negative.available_capacity,
        positive_available_capacity: record.positive.available_capacity,
        negative_practical_capacity: record.negative.practical_capacity,
        positive_practical_capacity: record.positive.practical_capacity,
        capacity: record.capacity,
        first_cycle_efficiency: record.first_cycle_efficiency,
        warnings: &solved.warnings,
    };
    let title = format!("Capacities and potentials: {} (from {})", tea.label(), record.window_source);
    print_record(&title, &report, &record.capacity_rows(), ctx.format)
}
