//! Integration tests for the validation cascade over a complete plan.

use mediaplan_core::plan::SectionName;
use mediaplan_core::validate::cac::{CacInputs, compute_cac_model, ratio_value};
use mediaplan_core::{ValidatorCategory, run_cascade};
use mediaplan_test_utils::{sample_config, sample_plan};

// ---------------------------------------------------------------------------
// Baseline behaviour
// ---------------------------------------------------------------------------

#[test]
fn sample_plan_is_consistent() {
    let result = run_cascade(&sample_plan(), &sample_config(), ValidatorCategory::ALL);

    assert!(result.is_clean(), "fixes: {:?}\nwarnings: {:?}", result.auto_fixes, result.warnings);
    assert!(result.updated_sections.is_empty());
    assert_eq!(result.validators_run, ValidatorCategory::ALL.to_vec());
    assert_eq!(result.plan, sample_plan());
}

#[test]
fn cascade_is_idempotent_after_repairs() {
    let mut plan = sample_plan();
    let allocation = plan.budget_allocation.as_mut().unwrap();
    allocation.total_monthly_budget = 22_222.0;
    allocation.platform_breakdown[1].percentage = 45.0;
    plan.campaign_phases[0].budget = 1.0;
    plan.kpi_targets[1].target = "12 SQLs".to_owned();

    let first = run_cascade(&plan, &sample_config(), ValidatorCategory::ALL);
    assert!(!first.auto_fixes.is_empty());

    let second = run_cascade(&first.plan, &sample_config(), ValidatorCategory::ALL);
    assert!(second.auto_fixes.is_empty(), "{:?}", second.auto_fixes);
    assert_eq!(second.plan, first.plan);
}

#[test]
fn repaired_plan_satisfies_sum_invariants() {
    let mut plan = sample_plan();
    let allocation = plan.budget_allocation.as_mut().unwrap();
    allocation.total_monthly_budget = 12_345.0;
    allocation.platform_breakdown[0].percentage = 47.0;
    allocation.platform_breakdown[2].percentage = 0.0;

    let result = run_cascade(&plan, &sample_config(), ValidatorCategory::ALL);
    let plan = result.plan;
    let allocation = plan.budget_allocation.as_ref().unwrap();

    let pct: f64 = allocation.platform_breakdown.iter().map(|b| b.percentage).sum();
    assert_eq!(pct, 100.0);
    assert_eq!(allocation.daily_ceiling, (12_345.0_f64 / 30.0).floor());

    let phases: f64 = plan.campaign_phases.iter().map(|p| p.budget).sum();
    assert!((phases - 12_345.0).abs() < 0.01, "phases sum to {phases}");

    let structure = plan.campaign_structure.as_ref().unwrap();
    for strategy in &plan.platform_strategy {
        let campaigns: f64 = structure
            .campaigns()
            .filter(|(_, _, c)| c.platform == strategy.platform)
            .map(|(_, _, c)| c.monthly_budget)
            .sum();
        assert!(
            (campaigns - strategy.monthly_spend).abs() < 0.01,
            "{} campaigns sum to {campaigns}, spend is {}",
            strategy.platform,
            strategy.monthly_spend
        );
    }
}

#[test]
fn cascade_never_emits_non_finite_numbers() {
    let mut plan = sample_plan();
    let model = &mut plan.performance_model.as_mut().unwrap().cac_model;
    model.target_cpl = 1e9;
    model.lead_to_sql_rate = 7.0;

    let result = run_cascade(&plan, &sample_config(), ValidatorCategory::ALL);
    let model = &result.plan.performance_model.as_ref().unwrap().cac_model;
    assert!(model.target_cpl.is_finite());
    assert!(model.estimated_ltv.is_finite());
    assert_eq!(model.lead_to_sql_rate, 1.0);
    assert_eq!(model.expected_monthly_customers, 0);
    assert_eq!(model.target_cac, None);
    assert!(result.warnings.iter().any(|w| w.contains("CAC is undefined")));
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_funnel_figures() {
    let model = compute_cac_model(&CacInputs {
        monthly_budget: 15_000.0,
        target_cpl: 75.0,
        lead_to_sql_rate: 0.4,
        sql_to_customer_rate: 0.25,
        offer_price: 997.0,
        retention_multiplier: 12.0,
    })
    .model;

    assert_eq!(model.expected_monthly_leads, 200);
    assert_eq!(model.expected_monthly_sqls, 80);
    assert_eq!(model.expected_monthly_customers, 20);
    assert_eq!(model.target_cac, Some(750.0));
    assert_eq!(model.estimated_ltv, 11_964.0);
    let ratio = ratio_value(&model.ltv_to_cac_ratio).unwrap();
    assert!((ratio - 15.952).abs() <= 0.1);
}

#[test]
fn scenario_c_breakdown_short_of_100() {
    let mut plan = sample_plan();
    let allocation = plan.budget_allocation.as_mut().unwrap();
    allocation.platform_breakdown[2].percentage = 10.0;

    let result = run_cascade(&plan, &sample_config(), [ValidatorCategory::Budget]);
    let pct: Vec<f64> = result
        .plan
        .budget_allocation
        .unwrap()
        .platform_breakdown
        .iter()
        .map(|b| b.percentage)
        .collect();
    assert_eq!(pct, vec![56.0, 33.0, 11.0]);
    assert_eq!(
        result.updated_sections.sections(),
        vec![SectionName::BudgetAllocation]
    );
}

#[test]
fn unrequested_validators_leave_sections_alone() {
    let mut plan = sample_plan();
    plan.budget_allocation.as_mut().unwrap().total_monthly_budget = 30_000.0;

    let result = run_cascade(&plan, &sample_config(), [ValidatorCategory::Budget]);
    assert_eq!(result.validators_run, vec![ValidatorCategory::Budget]);
    // The funnel model is stale until cacModel runs.
    assert_eq!(result.plan.performance_model, plan.performance_model);
}
