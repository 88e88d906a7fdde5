//! Phase budget validator: campaign phases share out the monthly budget.

use std::collections::BTreeSet;

use crate::plan::{CampaignPhase, CampaignStructure};

use super::numbers::{approx_eq, distribute, format_currency};
use super::text::parse_duration;
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::PhaseBudgets;

/// Rescale phase budgets to sum to `monthly_budget` and flag phases that
/// outspend the daily ceiling or reference unknown campaigns.
///
/// `daily_ceiling` of `None` (or zero) disables the overspend check.
pub fn validate_phase_budgets(
    phases: &[CampaignPhase],
    monthly_budget: f64,
    daily_ceiling: Option<f64>,
    structure: Option<&CampaignStructure>,
) -> (Vec<CampaignPhase>, ValidatorReport) {
    let mut fixed = phases.to_vec();
    let mut report = ValidatorReport::default();

    if fixed.is_empty() {
        return (fixed, report);
    }

    let current: Vec<f64> = fixed.iter().map(|p| p.budget).collect();
    let sum: f64 = current.iter().sum();
    let has_negative = current.iter().any(|b| *b < 0.0);
    if has_negative || !approx_eq(sum, monthly_budget) {
        let shares = distribute(&current, monthly_budget.max(0.0));
        for (i, (phase, share)) in fixed.iter_mut().zip(shares).enumerate() {
            if approx_eq(phase.budget, share) {
                continue;
            }
            report.fix(
                V,
                format!("campaignPhases[{i}].budget"),
                phase.budget,
                share,
                "phase_budgets_sum_to_total",
                format!(
                    "Phase budgets summed to {}; rescaled to the {} monthly budget.",
                    format_currency(sum),
                    format_currency(monthly_budget)
                ),
            );
            phase.budget = share;
        }
    }

    if let Some(ceiling) = daily_ceiling.filter(|c| *c > 0.0) {
        for phase in &fixed {
            let Some(days) = parse_duration(&phase.duration).map(|d| d.length_days()) else {
                continue;
            };
            if days <= 0.0 {
                continue;
            }
            let daily = phase.budget / days;
            if daily > ceiling + super::numbers::EPSILON {
                report.warn(format!(
                    "Phase \"{}\" spends {} per day over {days:.0} days, above the {} daily ceiling.",
                    phase.name,
                    format_currency(daily),
                    format_currency(ceiling)
                ));
            }
        }
    }

    let known: BTreeSet<String> = structure
        .map(|s| s.campaigns().map(|(_, _, c)| campaign_key(&c.name)).collect())
        .unwrap_or_default();
    for phase in &fixed {
        for name in &phase.campaigns {
            if !known.contains(&campaign_key(name)) {
                report.warn(format!(
                    "Phase \"{}\" references campaign \"{name}\", which is not in the campaign structure.",
                    phase.name
                ));
            }
        }
    }

    (fixed, report)
}

fn campaign_key(name: &str) -> String {
    name.trim().to_lowercase()
}
