//! `mediaplan edit` command: apply one field edit and re-validate the plan.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use mediaplan_core::config::FunnelDefaults;
use mediaplan_core::{Cascade, ValidationCascadeResult, affected_validators, apply_edit};

use crate::files::{load_onboarding, load_plan, write_json, write_plan};
use crate::report::write_report;

/// Interpret a `--value` argument.
///
/// Valid JSON is taken as-is (`20000`, `true`, `"text"`, `{"a": 1}`);
/// anything else is treated as a plain string, so `--value 'Rotate creative'`
/// needs no extra quoting.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Apply the edit and run the validators it affects, with the unedited plan
/// as the baseline for stale-reference detection.
pub fn edit_and_validate(
    plan_path: &Path,
    onboarding_path: &Path,
    section: &str,
    field: &str,
    value: &str,
    funnel: FunnelDefaults,
) -> Result<ValidationCascadeResult> {
    let plan = load_plan(plan_path)?;
    let config = load_onboarding(onboarding_path, funnel)?;

    let edit = apply_edit(&plan, section, field, parse_value(value))
        .with_context(|| format!("cannot apply edit to {section}.{field}"))?;
    info!(
        section = %edit.section,
        field,
        old_value = %edit.old_value,
        "applied edit"
    );

    let validators = affected_validators(edit.section.as_str(), field);
    Ok(Cascade::new(&config)
        .with_baseline(&plan)
        .run(&edit.plan, validators))
}

/// Run the edit command.
#[allow(clippy::too_many_arguments)]
pub fn run_edit(
    plan_path: &Path,
    onboarding_path: &Path,
    section: &str,
    field: &str,
    value: &str,
    output: Option<&Path>,
    json: bool,
    funnel: FunnelDefaults,
) -> Result<()> {
    let result = edit_and_validate(plan_path, onboarding_path, section, field, value, funnel)?;

    let mut stdout = std::io::stdout().lock();
    if json {
        write_json(&mut stdout, &result)?;
    } else {
        write_report(&mut stdout, &result)?;
    }

    if let Some(path) = output {
        write_plan(path, &result.plan)?;
        if !json {
            println!("\nEdited plan written to {}", path.display());
        }
    }

    Ok(())
}
