//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table;
use crate::cli::OutputFormat;
use crate::core::Config;

/// Resolve `auto` against the configured default
pub fn effective_format(format: OutputFormat, config: &Config) -> OutputFormat {
    match format {
        OutputFormat::Auto => match config.default_format.as_deref().map(str::parse::<OutputFormat>) {
            Some(Ok(OutputFormat::Auto)) | None => OutputFormat::Table,
            Some(Ok(format)) => format,
            Some(Err(_)) => {
                tracing::warn!(
                    "Unknown default_format '{}' in configuration, using table",
                    config.default_format.as_deref().unwrap_or_default()
                );
                OutputFormat::Table
            }
        },
        other => other,
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

pub fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let yaml = serde_yml::to_string(value).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

pub fn print_csv(headers: &[&str], records: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(headers).into_diagnostic()?;
    for record in records {
        writer.write_record(record).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

/// Print a calculation result
///
/// Machine formats serialize the structured record; table and CSV show the
/// quantity rows.
pub fn print_record<T: Serialize>(title: &str, record: &T, rows: &[(String, f64)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Yaml => print_yaml(record),
        OutputFormat::Csv => {
            let records: Vec<Vec<String>> = rows
                .iter()
                .map(|(name, value)| vec![name.clone(), value.to_string()])
                .collect();
            print_csv(&["quantity", "value"], &records)
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if !title.is_empty() {
                println!("{}", console::style(title).bold());
            }
            println!("{}", table::key_value(rows));
            Ok(())
        }
    }
}
