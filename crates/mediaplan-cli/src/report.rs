//! Human-readable rendering of a cascade result.

use std::io::Write;

use anyhow::Result;
use serde_json::Value;

use mediaplan_core::ValidationCascadeResult;

/// Write a text report of `result` to `writer`.
pub fn write_report(writer: &mut dyn Write, result: &ValidationCascadeResult) -> Result<()> {
    let run: Vec<&str> = result.validators_run.iter().map(|v| v.as_str()).collect();
    if run.is_empty() {
        writeln!(writer, "Validators run: (none)")?;
    } else {
        writeln!(writer, "Validators run: {}", run.join(", "))?;
    }

    let sections: Vec<String> = result
        .updated_sections
        .sections()
        .iter()
        .map(ToString::to_string)
        .collect();
    if !sections.is_empty() {
        writeln!(writer, "Updated sections: {}", sections.join(", "))?;
    }
    writeln!(writer)?;

    if result.auto_fixes.is_empty() {
        writeln!(writer, "No fixes applied.")?;
    } else {
        writeln!(writer, "Fixes ({}):", result.auto_fixes.len())?;
        writeln!(
            writer,
            "{:<16} {:<48} {:>14} {:>14}",
            "VALIDATOR", "FIELD", "OLD", "NEW"
        )?;
        writeln!(writer, "{}", "-".repeat(95))?;
        for fix in &result.auto_fixes {
            writeln!(
                writer,
                "{:<16} {:<48} {:>14} {:>14}",
                fix.validator.as_str(),
                truncate(&fix.field, 48),
                truncate(&display_value(&fix.old_value), 14),
                truncate(&display_value(&fix.new_value), 14),
            )?;
            writeln!(writer, "  [{}] {}", fix.rule, fix.reason)?;
        }
    }

    if !result.warnings.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Warnings ({}):", result.warnings.len())?;
        for warning in &result.warnings {
            writeln!(writer, "  - {warning}")?;
        }
    }

    Ok(())
}

/// Strings print without quotes; everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
