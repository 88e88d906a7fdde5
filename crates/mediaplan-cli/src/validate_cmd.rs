//! `mediaplan validate` command: run validators over a plan file.
//!
//! Prints the report (or the full result as JSON with `--json`) to stdout and
//! optionally writes the repaired plan to `--output`.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use mediaplan_core::config::FunnelDefaults;
use mediaplan_core::{Cascade, ValidatorCategory};

use crate::files::{load_onboarding, load_plan, write_json, write_plan};
use crate::report::write_report;

/// Parse `all` or a comma-separated list of validator names.
pub fn parse_validators(list: &str) -> Result<BTreeSet<ValidatorCategory>> {
    let list = list.trim();
    if list.eq_ignore_ascii_case("all") {
        return Ok(ValidatorCategory::ALL.into_iter().collect());
    }

    let mut out = BTreeSet::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let category: ValidatorCategory = name
            .parse()
            .with_context(|| format!("valid validators: all, {}", all_names()))?;
        out.insert(category);
    }
    if out.is_empty() {
        anyhow::bail!("no validators given; use `all` or a list such as budget,cacModel");
    }
    Ok(out)
}

fn all_names() -> String {
    ValidatorCategory::ALL
        .iter()
        .map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the validate command.
pub fn run_validate(
    plan_path: &Path,
    onboarding_path: &Path,
    validators: &str,
    baseline_path: Option<&Path>,
    output: Option<&Path>,
    json: bool,
    funnel: FunnelDefaults,
) -> Result<()> {
    let validators = parse_validators(validators)?;
    let plan = load_plan(plan_path)?;
    let config = load_onboarding(onboarding_path, funnel)?;
    let baseline = baseline_path.map(load_plan).transpose()?;

    let mut cascade = Cascade::new(&config);
    if let Some(baseline) = &baseline {
        cascade = cascade.with_baseline(baseline);
    }
    let result = cascade.run(&plan, validators);

    let mut stdout = std::io::stdout().lock();
    if json {
        write_json(&mut stdout, &result)?;
    } else {
        write_report(&mut stdout, &result)?;
    }

    if let Some(path) = output {
        write_plan(path, &result.plan)?;
        info!(path = %path.display(), "wrote validated plan");
        if !json {
            println!("\nValidated plan written to {}", path.display());
        }
    }

    Ok(())
}
