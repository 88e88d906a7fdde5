//! Maps an edited section to the validators that must re-run.

use std::collections::BTreeSet;

use super::types::ValidatorCategory;

/// Validators to run after an edit to `section`.
///
/// The table is keyed on the section alone; `field_path` is accepted so
/// callers can pass the edit through unchanged. Unknown sections map to
/// `staleReferences`, so the result is never empty.
pub fn affected_validators(section: &str, _field_path: &str) -> BTreeSet<ValidatorCategory> {
    use ValidatorCategory::*;

    let validators: &[ValidatorCategory] = match section {
        "budgetAllocation" => &[
            Budget,
            CacModel,
            KpiTargets,
            CrossSection,
            PhaseBudgets,
            StaleReferences,
        ],
        "platformStrategy" => &[CrossSection, WithinPlatformBudgets],
        "campaignStructure" => &[CrossSection, PhaseBudgets, WithinPlatformBudgets],
        "kpiTargets" => &[KpiTargets, StaleReferences],
        "performanceModel" => &[CacModel, KpiTargets, StaleReferences],
        "campaignPhases" => &[PhaseBudgets, Timeline],
        "executiveSummary" => &[Timeline],
        "icpTargeting" => &[CrossSection],
        _ => &[StaleReferences],
    };
    validators.iter().copied().collect()
}
