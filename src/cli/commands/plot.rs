//! `tea plot` command - terminal plots of one analysis

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::table::format_value;
use crate::cli::viz::{self, PLOT_HEIGHT, PLOT_WIDTH};
use crate::cli::{GlobalOpts, InputArgs};
use crate::core::breakdown::Kind;
use crate::core::names::Electrode;

#[derive(Subcommand, Debug)]
pub enum PlotCommands {
    /// Stacked volume and mass of one repeat unit
    Breakdown(PlotBreakdownArgs),

    /// OCP of each electrode with its stoichiometry window
    Lithiation(PlotLithiationArgs),
}

#[derive(clap::Args, Debug)]
pub struct PlotBreakdownArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Bar width in braille pixels
    #[arg(long, default_value_t = PLOT_WIDTH)]
    pub width: u32,
}

#[derive(clap::Args, Debug)]
pub struct PlotLithiationArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Plot width in braille pixels
    #[arg(long, default_value_t = PLOT_WIDTH)]
    pub width: u32,

    /// Plot height in braille pixels
    #[arg(long, default_value_t = PLOT_HEIGHT)]
    pub height: u32,
}

pub fn run(cmd: PlotCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PlotCommands::Breakdown(args) => run_breakdown(args, global),
        PlotCommands::Lithiation(args) => run_lithiation(args, global),
    }
}

fn run_breakdown(args: PlotBreakdownArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&args.input, &ctx.config)?;
    let breakdown = tea.stack_breakdown()?;

    println!("{} {}", style("Repeat unit:").bold(), style(tea.label()).cyan());
    for (kind, unit) in [(Kind::VolumeLoading, "uL.cm-2"), (Kind::MassLoading, "mg.cm-2")] {
        let segments = viz::breakdown_segments(breakdown, kind);
        let total: f64 = segments.iter().map(|s| s.value).sum();
        println!();
        println!("{} ({} {})", style(kind.label()).bold(), format_value(total), unit);
        println!("{}", viz::render_stacked_bar(&segments, args.width, viz::BAR_HEIGHT));
        for segment in &segments {
            println!(
                "  {:<8} {:<45} {:>10}  {:>5.1}%",
                segment.fill.legend(),
                segment.label,
                format_value(segment.value),
                100.0 * segment.value / total
            );
        }
    }
    Ok(())
}

fn run_lithiation(args: PlotLithiationArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&args.input, &ctx.config)?;
    let solved = tea.stoichiometry()?;

    for electrode in Electrode::ALL {
        let name = electrode.ocp();
        let curve = tea.store().require_curve(&name, "lithiation plot")?;
        println!("{}", viz::render_lithiation(electrode, curve, &solved.window, args.width, args.height));
        println!();
    }
    if let (Some(lower), Some(upper)) = (solved.lower_cutoff, solved.upper_cutoff) {
        println!(
            "Cell voltage {} V at 0% SoC, {} V at 100% SoC (window from {})",
            format_value(lower),
            format_value(upper),
            solved.source
        );
    }
    Ok(())
}
