//! `tea ragone` command - energy against power for one or more stacks

use std::path::PathBuf;

use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::helpers::{load_tea, parse_overrides, Context};
use crate::cli::output::{print_csv, print_json, print_yaml};
use crate::cli::table::{self, format_value};
use crate::cli::viz::{self, PLOT_HEIGHT, PLOT_WIDTH};
use crate::cli::{GlobalOpts, InputArgs, OutputFormat};
use crate::core::ragone::{self, DischargeMode, QuasiStaticDischarge, RagoneSeries, SweepCase};
use crate::entities::Tea;

const CURRENT_RATES: &[f64] = &[0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0];
const POWER_RATES: &[f64] = &[50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Constant current, rates in C
    Current,
    /// Constant power, rates in W.kg-1
    Power,
}

impl From<ModeArg> for DischargeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Current => DischargeMode::Current,
            ModeArg::Power => DischargeMode::Power,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RagoneArgs {
    /// Parameter files, one stack each
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Built-in sets, one stack each
    #[arg(long, short = 'b', value_name = "SET")]
    pub base: Vec<String>,

    /// Override applied to every stack
    #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Discharge rates, comma separated
    #[arg(long, value_delimiter = ',')]
    pub rates: Vec<f64>,

    /// Discharge mode, once for all stacks or once per stack
    #[arg(long, short = 'm', value_enum)]
    pub mode: Vec<ModeArg>,

    /// Area-specific resistance [Ohm.cm2], once for all stacks or once per stack
    #[arg(long, short = 'r')]
    pub resistance: Vec<f64>,

    /// Table only, no plot
    #[arg(long)]
    pub no_plot: bool,
}

/// Value for case `index` from a list given once or once per case
fn per_case<T: Copy>(values: &[T], index: usize, fallback: T) -> T {
    match values.len() {
        0 => fallback,
        1 => values[0],
        _ => values.get(index).copied().unwrap_or(fallback),
    }
}

fn records(series: &[RagoneSeries], number: fn(f64) -> String) -> Vec<Vec<String>> {
    series
        .iter()
        .flat_map(|s| {
            s.points.iter().map(move |p| {
                vec![
                    s.label.clone(),
                    s.mode.to_string(),
                    p.rate.to_string(),
                    number(p.energy_density),
                    number(p.power_density),
                    number(p.utilisation),
                ]
            })
        })
        .collect()
}

pub fn run(args: RagoneArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;

    let mut inputs: Vec<InputArgs> = args
        .files
        .iter()
        .map(|file| InputArgs {
            file: Some(file.clone()),
            base: None,
            overrides: args.overrides.clone(),
        })
        .collect();
    inputs.extend(args.base.iter().map(|base| InputArgs {
        file: None,
        base: Some(base.clone()),
        overrides: args.overrides.clone(),
    }));
    if inputs.is_empty() {
        return Err(miette::miette!("No stacks given: pass parameter files and/or --base <SET>"));
    }
    // Reject a bad override before loading any stack
    parse_overrides(&args.overrides)?;

    for (flag, count) in [("--mode", args.mode.len()), ("--resistance", args.resistance.len())] {
        if count > 1 && count != inputs.len() {
            return Err(miette::miette!(
                "{} was given {} times for {} stacks; give it once or once per stack",
                flag,
                count,
                inputs.len()
            ));
        }
    }

    let modes: Vec<DischargeMode> = (0..inputs.len())
        .map(|i| per_case(&args.mode, i, ModeArg::Current).into())
        .collect();
    let rates: Vec<f64> = if !args.rates.is_empty() {
        args.rates.clone()
    } else if modes.iter().all(|m| *m == DischargeMode::Current) {
        CURRENT_RATES.to_vec()
    } else if modes.iter().all(|m| *m == DischargeMode::Power) {
        POWER_RATES.to_vec()
    } else {
        return Err(miette::miette!("Mixed discharge modes need explicit --rates"));
    };

    let teas: Vec<Tea> = inputs
        .iter()
        .map(|input| load_tea(input, &ctx.config))
        .collect::<Result<_>>()?;
    let simulators: Vec<QuasiStaticDischarge> = (0..teas.len())
        .map(|i| QuasiStaticDischarge {
            resistance: per_case(&args.resistance, i, ctx.config.ragone.resistance),
            soc_steps: ctx.config.ragone.soc_steps,
        })
        .collect();

    let mut cases = Vec::with_capacity(teas.len());
    for ((tea, simulator), mode) in teas.iter().zip(&simulators).zip(&modes) {
        cases.push(SweepCase {
            stack: tea.stack_profile()?,
            mode: *mode,
            simulator,
        });
    }
    let series = ragone::sweep(&cases, &rates);

    match ctx.format {
        OutputFormat::Json => print_json(&series),
        OutputFormat::Yaml => print_yaml(&series),
        OutputFormat::Csv => print_csv(
            &["stack", "mode", "rate", "energy_density", "power_density", "utilisation"],
            &records(&series, |v| v.to_string()),
        ),
        OutputFormat::Table | OutputFormat::Auto => {
            println!(
                "{}",
                table::grid(
                    &["Stack", "Mode", "Rate", "Energy [Wh.kg-1]", "Power [W.kg-1]", "Utilisation"],
                    &records(&series, format_value)
                )
            );
            if !args.no_plot {
                println!();
                println!("{}", viz::render_ragone(&series, PLOT_WIDTH, PLOT_HEIGHT));
                for s in &series {
                    println!("  {} {} ({} points)", style("•").cyan(), s.label, s.points.len());
                }
            }
            Ok(())
        }
    }
}
