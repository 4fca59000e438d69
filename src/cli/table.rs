//! Table rendering for terminal output

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

/// Six significant figures, fixed notation where it stays readable
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    if !(-3..6).contains(&magnitude) {
        return format!("{:.4e}", value);
    }
    let decimals = (5 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Build a table from a header row and string records
pub fn grid(headers: &[&str], records: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for record in records {
        builder.push_record(record.iter().cloned());
    }
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Two-column quantity / value table
pub fn key_value(rows: &[(String, f64)]) -> String {
    let records: Vec<Vec<String>> = rows
        .iter()
        .map(|(name, value)| vec![name.clone(), format_value(*value)])
        .collect();
    grid(&["Quantity", "Value"], &records)
}
