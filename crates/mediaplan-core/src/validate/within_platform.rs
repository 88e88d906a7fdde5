//! Within-platform validator: each platform's campaigns add up to its spend.

use crate::plan::{CampaignStructure, PlatformStrategy};

use super::cross_section::rescale_platform_campaigns;
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::WithinPlatformBudgets;

/// Rescale each platform's campaign budgets to the platform's monthly spend.
pub fn validate_within_platform_budgets(
    strategy: &[PlatformStrategy],
    structure: &CampaignStructure,
) -> (CampaignStructure, ValidatorReport) {
    let mut fixed = structure.clone();
    let mut report = ValidatorReport::default();

    for entry in strategy {
        let count = rescale_platform_campaigns(
            &mut fixed,
            &entry.platform,
            entry.monthly_spend,
            V,
            "campaigns_sum_to_platform_spend",
            &mut report,
        );
        if count == 0 && entry.monthly_spend > 0.0 {
            report.warn(format!(
                "{} has ${:.0} monthly spend but no campaigns.",
                entry.platform, entry.monthly_spend
            ));
        }
    }

    (fixed, report)
}
