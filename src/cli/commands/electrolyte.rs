//! `tea electrolyte` command - electrolyte excess metrics

use miette::Result;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::output::print_record;
use crate::cli::{GlobalOpts, InputArgs};

pub fn run(input: InputArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&input, &ctx.config)?;
    let excess = tea.electrolyte_excess()?;

    let title = format!("Electrolyte excess: {}", tea.label());
    print_record(&title, excess, &excess.rows(), ctx.format)
}
