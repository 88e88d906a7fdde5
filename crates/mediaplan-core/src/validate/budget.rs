//! Budget validator: platform percentages, per-platform amounts and the
//! daily ceiling.

use crate::config::OnboardingConfig;
use crate::plan::{BudgetAllocation, MediaPlan};

use super::numbers::{approx_eq, distribute, non_negative};
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::Budget;

/// Days the monthly budget is spread over when deriving the daily ceiling.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// The budget every derived figure is computed from: the allocation's
/// total when positive, otherwise the onboarding monthly budget.
pub fn effective_budget(plan: &MediaPlan, config: &OnboardingConfig) -> f64 {
    plan.budget_allocation
        .as_ref()
        .map(|a| a.total_monthly_budget)
        .filter(|total| total.is_finite() && *total > 0.0)
        .unwrap_or(config.monthly_budget)
}

/// Enforce that platform percentages sum to exactly 100, that each
/// platform's amount matches its percentage of `monthly_budget`, and that
/// the daily ceiling is `floor(total / 30)` unless overridden.
///
/// `monthly_budget` is the effective budget the allocation must add up to.
pub fn validate_and_fix_budget(
    allocation: &BudgetAllocation,
    monthly_budget: f64,
) -> (BudgetAllocation, ValidatorReport) {
    let mut fixed = allocation.clone();
    let mut report = ValidatorReport::default();

    let (budget, clamped) = non_negative(monthly_budget);
    if clamped {
        report.warn(format!(
            "Monthly budget {monthly_budget} is not a valid amount; using $0 until it is corrected."
        ));
    }
    if !approx_eq(fixed.total_monthly_budget, budget) {
        report.fix(
            V,
            "budgetAllocation.totalMonthlyBudget",
            fixed.total_monthly_budget,
            budget,
            "total_monthly_budget",
            "Total monthly budget must equal the effective monthly ad budget.",
        );
        fixed.total_monthly_budget = budget;
    }

    fix_percentages(&mut fixed, &mut report);
    fix_amounts(&mut fixed, budget, &mut report);
    fix_daily_ceiling(&mut fixed, budget, &mut report);

    if let Some(testing) = &fixed.testing_phase {
        if testing.budget > budget + super::numbers::EPSILON {
            report.warn(format!(
                "Testing phase budget (${:.0}) exceeds the total monthly budget (${budget:.0}).",
                testing.budget
            ));
        }
    }

    (fixed, report)
}

fn fix_percentages(allocation: &mut BudgetAllocation, report: &mut ValidatorReport) {
    let breakdown = &mut allocation.platform_breakdown;

    if breakdown.is_empty() {
        report.warn("Budget allocation has no platforms; percentages cannot be checked.");
        return;
    }

    for entry in breakdown.iter() {
        if entry.percentage < 0.0 {
            report.warn(format!(
                "{} had a negative budget share ({}%); treated as 0%.",
                entry.platform, entry.percentage
            ));
        }
    }

    let current: Vec<f64> = breakdown.iter().map(|e| e.percentage).collect();
    let sum: f64 = current.iter().sum();
    let has_negative = current.iter().any(|p| *p < 0.0);

    let (target, rule, reason) = if breakdown.len() == 1 {
        (
            vec![100.0],
            "single_platform_full_share",
            "The only platform receives 100% of the budget.".to_owned(),
        )
    } else if has_negative || !approx_eq(sum, 100.0) {
        if current.iter().all(|p| *p <= 0.0) {
            report.warn("Every platform share was 0%; the budget was split evenly.");
        }
        (
            distribute(&current, 100.0),
            "percentages_sum_to_100",
            format!(
                "Platform percentages summed to {sum}%; rescaled proportionally to 100% \
                 with the rounding remainder on the largest platform."
            ),
        )
    } else {
        return;
    };

    for (i, (entry, new_pct)) in breakdown.iter_mut().zip(target).enumerate() {
        if !approx_eq(entry.percentage, new_pct) {
            report.fix(
                V,
                format!("budgetAllocation.platformBreakdown[{i}].percentage"),
                entry.percentage,
                new_pct,
                rule,
                reason.clone(),
            );
            entry.percentage = new_pct;
        }
    }
}

fn fix_amounts(allocation: &mut BudgetAllocation, budget: f64, report: &mut ValidatorReport) {
    for (i, entry) in allocation.platform_breakdown.iter_mut().enumerate() {
        let amount = (entry.percentage / 100.0 * budget).round();
        if !approx_eq(entry.monthly_budget, amount) {
            report.fix(
                V,
                format!("budgetAllocation.platformBreakdown[{i}].monthlyBudget"),
                entry.monthly_budget,
                amount,
                "platform_amount_from_percentage",
                format!(
                    "{} receives {}% of ${budget:.0}.",
                    entry.platform, entry.percentage
                ),
            );
            entry.monthly_budget = amount;
        }
    }
}

fn fix_daily_ceiling(allocation: &mut BudgetAllocation, budget: f64, report: &mut ValidatorReport) {
    if allocation.daily_ceiling_override {
        if allocation.daily_ceiling * DAYS_PER_MONTH + super::numbers::EPSILON < budget {
            report.warn(format!(
                "Overridden daily ceiling (${:.0}) cannot spend the ${budget:.0} monthly budget in {DAYS_PER_MONTH} days.",
                allocation.daily_ceiling
            ));
        }
        return;
    }

    let ceiling = (budget / DAYS_PER_MONTH).floor();
    if !approx_eq(allocation.daily_ceiling, ceiling) {
        report.fix(
            V,
            "budgetAllocation.dailyCeiling",
            allocation.daily_ceiling,
            ceiling,
            "daily_ceiling",
            format!("Daily ceiling is floor(${budget:.0} / {DAYS_PER_MONTH})."),
        );
        allocation.daily_ceiling = ceiling;
    }
}
