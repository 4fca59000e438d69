//! `tea params` command - resolved parameters with provenance

use clap::ValueEnum;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_tea, Context};
use crate::cli::output::{print_csv, print_json, print_yaml};
use crate::cli::table::{self, format_value};
use crate::cli::{GlobalOpts, InputArgs, OutputFormat};
use crate::core::store::{NoteKind, ParameterValue, Provenance, ResolutionNote};

/// Provenance filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProvenanceFilter {
    Supplied,
    Derived,
    Defaulted,
    All,
}

impl ProvenanceFilter {
    fn matches(self, provenance: Provenance) -> bool {
        match self {
            ProvenanceFilter::Supplied => provenance == Provenance::Supplied,
            ProvenanceFilter::Derived => provenance == Provenance::Derived,
            ProvenanceFilter::Defaulted => provenance == Provenance::Defaulted,
            ProvenanceFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ParamsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show the resolution notes (derivations, defaults, conflicts) instead
    #[arg(long)]
    pub notes: bool,

    /// Only parameters with this provenance
    #[arg(long, short = 'p', default_value = "all")]
    pub provenance: ProvenanceFilter,

    /// Only parameters whose name contains this text (case-insensitive)
    #[arg(long, short = 'g')]
    pub grep: Option<String>,
}

#[derive(Debug, Serialize)]
struct ParameterRow {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<String>,
    provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

pub fn run(args: ParamsArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::load(global)?;
    let tea = load_tea(&args.input, &ctx.config)?;

    if args.notes {
        return print_notes(tea.notes(), ctx.format);
    }

    let needle = args.grep.as_deref().map(str::to_lowercase);
    let rows: Vec<ParameterRow> = tea
        .store()
        .iter()
        .filter(|(_, p)| args.provenance.matches(p.provenance))
        .filter(|(name, _)| needle.as_ref().map_or(true, |n| name.to_lowercase().contains(n.as_str())))
        .map(|(name, p)| {
            let (value, curve) = match &p.value {
                ParameterValue::Number(v) => (Some(*v), None),
                ParameterValue::Curve(c) => (None, Some(c.describe())),
            };
            ParameterRow {
                name: name.clone(),
                value,
                curve,
                provenance: p.provenance,
                source: p.source.clone(),
            }
        })
        .collect();

    match ctx.format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Yaml => print_yaml(&rows),
        OutputFormat::Csv => print_csv(
            &["name", "value", "provenance", "source"],
            &rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.value.map(|v| v.to_string()).or_else(|| r.curve.clone()).unwrap_or_default(),
                        r.provenance.to_string(),
                        r.source.clone().unwrap_or_default(),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Table | OutputFormat::Auto => {
            let records: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.value.map(format_value).or_else(|| r.curve.clone()).unwrap_or_default(),
                        r.provenance.to_string(),
                        r.source.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", table::grid(&["Parameter", "Value", "Provenance", "Source"], &records));
            println!(
                "{} parameter(s), {} supplied, {} derived, {} defaulted",
                style(rows.len()).cyan(),
                rows.iter().filter(|r| r.provenance == Provenance::Supplied).count(),
                rows.iter().filter(|r| r.provenance == Provenance::Derived).count(),
                rows.iter().filter(|r| r.provenance == Provenance::Defaulted).count(),
            );
            Ok(())
        }
    }
}

fn print_notes(notes: &[ResolutionNote], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(notes),
        OutputFormat::Yaml => print_yaml(notes),
        OutputFormat::Csv => print_csv(
            &["kind", "quantity", "message"],
            &notes
                .iter()
                .map(|n| vec![n.kind.to_string(), n.quantity.clone(), n.message.clone()])
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Table | OutputFormat::Auto => {
            for note in notes {
                let kind = match note.kind {
                    NoteKind::Derived => style(note.kind.to_string()).dim(),
                    NoteKind::Defaulted | NoteKind::Skipped => style(note.kind.to_string()).yellow(),
                    NoteKind::Conflict | NoteKind::Missing => style(note.kind.to_string()).red(),
                };
                println!("{:<10} {}", kind, note.message);
            }
            Ok(())
        }
    }
}
