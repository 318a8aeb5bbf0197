//! Planner printing

use console::style;
use daily_planner::fields::{FieldName, PlannerFields};
use std::fmt::Write;

/// Format the planner for the terminal
///
/// Single-line fields print as `Label: value`; multi-line fields print
/// their label on its own line followed by the indented text.
#[must_use]
pub fn format_planner(fields: &PlannerFields) -> String {
    let mut out = String::new();
    for (field, value) in fields.iter() {
        let label = style(field.label()).bold();
        let value = value.trim_end();

        if value.is_empty() {
            let _ = writeln!(out, "{label}: {}", style("(empty)").dim());
        } else if field.is_multiline() {
            let _ = writeln!(out, "{label}:");
            for line in value.lines() {
                let _ = writeln!(out, "  {line}");
            }
        } else {
            let _ = writeln!(out, "{label}: {value}");
        }

        if field == FieldName::Date {
            out.push('\n');
        }
    }
    out
}
