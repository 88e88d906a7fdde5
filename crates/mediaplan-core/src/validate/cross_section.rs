//! Consistency between platform strategy, budget allocation, campaign
//! structure, ICP targeting and KPIs.

use std::collections::{BTreeMap, BTreeSet};

use crate::plan::{CampaignStructure, MediaPlan, Priority, Temperature, normalize_platform};

use super::kpi::DerivedMetric;
use super::numbers::{approx_eq, distribute};
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::CrossSection;

/// Apply the mechanical cross-section fixes and collect the warnings.
///
/// The budget allocation's platform breakdown is authoritative: strategy
/// percentages and spends are synced to it, and each platform's campaigns
/// are rescaled to its breakdown amount.
pub fn validate_cross_section(plan: &MediaPlan) -> (MediaPlan, ValidatorReport) {
    let mut fixed = plan.clone();
    let mut report = ValidatorReport::default();

    canonicalize_campaign_platforms(&mut fixed, &mut report);
    sync_strategy_to_breakdown(&mut fixed, &mut report);

    if let (Some(allocation), Some(structure)) =
        (&fixed.budget_allocation, fixed.campaign_structure.as_mut())
    {
        for entry in &allocation.platform_breakdown {
            rescale_platform_campaigns(
                structure,
                &entry.platform,
                entry.monthly_budget,
                V,
                "campaigns_sum_to_platform_budget",
                &mut report,
            );
        }
    }

    check_icp_platforms(&fixed, &mut report);
    check_primary_share(&fixed, &mut report);
    check_cost_kpis(&fixed, &mut report);

    (fixed, report)
}

fn strategy_spellings(plan: &MediaPlan) -> BTreeMap<String, String> {
    plan.platform_strategy
        .iter()
        .map(|s| (normalize_platform(&s.platform), s.platform.clone()))
        .collect()
}

fn canonicalize_campaign_platforms(plan: &mut MediaPlan, report: &mut ValidatorReport) {
    let spellings = strategy_spellings(plan);
    let Some(structure) = plan.campaign_structure.as_mut() else {
        return;
    };

    let mut unknown = BTreeSet::new();
    for temperature in Temperature::ALL {
        for (i, campaign) in structure.group_mut(temperature).iter_mut().enumerate() {
            match spellings.get(&normalize_platform(&campaign.platform)) {
                Some(canonical) if *canonical != campaign.platform => {
                    report.fix(
                        V,
                        format!("campaignStructure.{}[{i}].platform", temperature.as_str()),
                        campaign.platform.as_str(),
                        canonical.as_str(),
                        "canonical_platform_name",
                        "Campaign platform names use the platform strategy spelling.",
                    );
                    campaign.platform = canonical.clone();
                }
                Some(_) => {}
                None => {
                    unknown.insert(campaign.platform.clone());
                }
            }
        }
    }

    for platform in unknown {
        report.warn(format!(
            "Campaigns run on {platform}, which has no platform strategy entry."
        ));
    }
}

fn sync_strategy_to_breakdown(plan: &mut MediaPlan, report: &mut ValidatorReport) {
    let Some(allocation) = &plan.budget_allocation else {
        return;
    };
    if allocation.platform_breakdown.is_empty() {
        return;
    }

    let breakdown: BTreeMap<String, (f64, f64)> = allocation
        .platform_breakdown
        .iter()
        .map(|b| (normalize_platform(&b.platform), (b.percentage, b.monthly_budget)))
        .collect();

    let mut seen = BTreeSet::new();
    for (i, strategy) in plan.platform_strategy.iter_mut().enumerate() {
        let key = normalize_platform(&strategy.platform);
        let Some(&(percentage, amount)) = breakdown.get(&key) else {
            report.warn(format!(
                "{} appears in the platform strategy but not in the budget allocation.",
                strategy.platform
            ));
            continue;
        };
        seen.insert(key);

        if !approx_eq(strategy.budget_percentage, percentage) {
            report.fix(
                V,
                format!("platformStrategy[{i}].budgetPercentage"),
                strategy.budget_percentage,
                percentage,
                "strategy_matches_breakdown",
                "Platform strategy shares follow the budget allocation breakdown.",
            );
            strategy.budget_percentage = percentage;
        }
        if !approx_eq(strategy.monthly_spend, amount) {
            report.fix(
                V,
                format!("platformStrategy[{i}].monthlySpend"),
                strategy.monthly_spend,
                amount,
                "strategy_matches_breakdown",
                "Platform strategy spend follows the budget allocation breakdown.",
            );
            strategy.monthly_spend = amount;
        }
    }

    for entry in &allocation.platform_breakdown {
        if !seen.contains(&normalize_platform(&entry.platform)) {
            report.warn(format!(
                "{} receives budget but has no platform strategy entry.",
                entry.platform
            ));
        }
    }
}

/// Rescale the campaigns running on `platform` so their budgets sum to
/// `total`, keeping their relative sizes.
///
/// Returns the number of campaigns on the platform. Nothing changes when
/// there are none or they already sum to `total`.
pub fn rescale_platform_campaigns(
    structure: &mut CampaignStructure,
    platform: &str,
    total: f64,
    validator: ValidatorCategory,
    rule: &str,
    report: &mut ValidatorReport,
) -> usize {
    let key = normalize_platform(platform);
    let members: Vec<(Temperature, usize, f64)> = structure
        .campaigns()
        .filter(|(_, _, c)| normalize_platform(&c.platform) == key)
        .map(|(t, i, c)| (t, i, c.monthly_budget))
        .collect();

    if members.is_empty() {
        return 0;
    }
    let current: Vec<f64> = members.iter().map(|(_, _, b)| *b).collect();
    if approx_eq(current.iter().sum(), total) && current.iter().all(|b| *b >= 0.0) {
        return members.len();
    }

    let shares = distribute(&current, total.max(0.0));
    for ((temperature, i, old), new) in members.iter().zip(shares) {
        if approx_eq(*old, new) {
            continue;
        }
        let campaign = &mut structure.group_mut(*temperature)[*i];
        report.fix(
            validator,
            format!("campaignStructure.{}[{i}].monthlyBudget", temperature.as_str()),
            *old,
            new,
            rule,
            format!(
                "{} campaigns are rescaled to the platform's ${total:.0} monthly budget.",
                platform
            ),
        );
        campaign.monthly_budget = new;
    }
    members.len()
}

fn check_icp_platforms(plan: &MediaPlan, report: &mut ValidatorReport) {
    let Some(icp) = &plan.icp_targeting else {
        return;
    };
    let spellings = strategy_spellings(plan);
    for targeting in &icp.platform_targeting {
        if !spellings.contains_key(&normalize_platform(&targeting.platform)) {
            report.warn(format!(
                "ICP targeting describes {}, which is not in the platform strategy.",
                targeting.platform
            ));
        }
    }
}

fn check_primary_share(plan: &MediaPlan, report: &mut ValidatorReport) {
    let strategy = &plan.platform_strategy;
    if strategy.len() < 2 {
        return;
    }
    for (i, entry) in strategy.iter().enumerate() {
        if entry.priority != Priority::Primary {
            continue;
        }
        let strictly_smallest = strategy
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .all(|(_, other)| entry.budget_percentage < other.budget_percentage);
        if strictly_smallest {
            report.warn(format!(
                "{} is a primary platform but has the smallest budget share ({}%).",
                entry.platform, entry.budget_percentage
            ));
        }
    }
}

fn check_cost_kpis(plan: &MediaPlan, report: &mut ValidatorReport) {
    if plan.performance_model.is_none() {
        return;
    }
    let tracks_cost = plan.kpi_targets.iter().any(|k| {
        matches!(
            DerivedMetric::classify(&k.metric),
            Some(DerivedMetric::Cpl | DerivedMetric::Cac)
        )
    });
    if !tracks_cost {
        report.warn("The plan has a CAC model but no KPI tracks cost per lead or CAC.");
    }
}
