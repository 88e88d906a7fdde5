//! Reading plan and onboarding files, writing plans and reports.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use mediaplan_core::config::FunnelDefaults;
use mediaplan_core::plan::parse_media_plan;
use mediaplan_core::{MediaPlan, OnboardingConfig, OnboardingFormData};

/// Read and structurally validate a media plan JSON file.
pub fn load_plan(path: &Path) -> Result<MediaPlan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file: {}", path.display()))?;
    parse_media_plan(&content)
        .with_context(|| format!("failed to parse plan file: {}", path.display()))
}

/// Read onboarding form JSON and resolve it with the configured funnel rates.
pub fn load_onboarding(path: &Path, funnel: FunnelDefaults) -> Result<OnboardingConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read onboarding file: {}", path.display()))?;
    let form: OnboardingFormData = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse onboarding file: {}", path.display()))?;
    Ok(OnboardingConfig::from_form(&form).funnel(funnel))
}

/// Write `plan` as pretty JSON to `path`.
pub fn write_plan(path: &Path, plan: &MediaPlan) -> Result<()> {
    let mut json = serde_json::to_string_pretty(plan).context("failed to serialize plan")?;
    json.push('\n');
    std::fs::write(path, json)
        .with_context(|| format!("cannot write output file: {}", path.display()))
}

/// Print `value` as pretty JSON.
pub fn write_json<T: serde::Serialize>(writer: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).context("failed to serialize result")?;
    writeln!(writer)?;
    Ok(())
}
