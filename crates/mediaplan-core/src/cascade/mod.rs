//! Cascade orchestrator.
//!
//! Runs the requested validators over a copy of a plan in dependency order,
//! threading the plan through each one, and collects the audit trail.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::OnboardingConfig;
use crate::plan::{MediaPlan, MediaPlanPatch};
use crate::validate::cac::{CacInputs, compute_cac_model, reconcile_cac_model};
use crate::validate::{
    ValidationAutoFix, ValidatorCategory, ValidatorReport, effective_budget,
    reconcile_kpi_targets, reconcile_timeline, sweep_stale_references, validate_and_fix_budget,
    validate_cross_section, validate_phase_budgets, validate_within_platform_budgets,
};

/// Outcome of one cascade run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCascadeResult {
    pub auto_fixes: Vec<ValidationAutoFix>,
    pub warnings: Vec<String>,
    /// Sections the cascade changed, with their new contents.
    pub updated_sections: MediaPlanPatch,
    /// Validators that ran, in execution order. Validators skipped because
    /// their section is absent are not listed.
    pub validators_run: Vec<ValidatorCategory>,
    /// The plan after every fix.
    pub plan: MediaPlan,
}

impl ValidationCascadeResult {
    pub fn is_clean(&self) -> bool {
        self.auto_fixes.is_empty() && self.warnings.is_empty()
    }
}

/// Run `validators` over `plan`. Equivalent to
/// `Cascade::new(config).run(plan, validators)`.
pub fn run_cascade(
    plan: &MediaPlan,
    config: &OnboardingConfig,
    validators: impl IntoIterator<Item = ValidatorCategory>,
) -> ValidationCascadeResult {
    Cascade::new(config).run(plan, validators)
}

/// A configured cascade.
#[derive(Debug, Clone, Copy)]
pub struct Cascade<'a> {
    config: &'a OnboardingConfig,
    baseline: Option<&'a MediaPlan>,
}

/// The value threaded through the fold.
struct CascadeState {
    plan: MediaPlan,
    auto_fixes: Vec<ValidationAutoFix>,
    warnings: Vec<String>,
    validators_run: Vec<ValidatorCategory>,
}

impl<'a> Cascade<'a> {
    pub fn new(config: &'a OnboardingConfig) -> Self {
        Self {
            config,
            baseline: None,
        }
    }

    /// Supply the plan as it was before the edit being validated, so stale
    /// references to the old budget can be found.
    pub fn with_baseline(mut self, baseline: &'a MediaPlan) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Run the requested validators in execution order.
    ///
    /// Only the requested validators run; their dependencies are not added.
    /// `plan` is never modified.
    pub fn run(
        &self,
        plan: &MediaPlan,
        validators: impl IntoIterator<Item = ValidatorCategory>,
    ) -> ValidationCascadeResult {
        let requested: BTreeSet<ValidatorCategory> = validators.into_iter().collect();

        let initial = CascadeState {
            plan: plan.clone(),
            auto_fixes: Vec::new(),
            warnings: Vec::new(),
            validators_run: Vec::new(),
        };

        let state = ValidatorCategory::execution_order()
            .into_iter()
            .filter(|v| requested.contains(v))
            .fold(initial, |state, validator| self.step(state, validator, plan));

        let updated_sections = MediaPlanPatch::diff(plan, &state.plan);
        info!(
            requested = requested.len(),
            ran = state.validators_run.len(),
            auto_fixes = state.auto_fixes.len(),
            warnings = state.warnings.len(),
            updated_sections = ?updated_sections.sections(),
            "validation cascade finished"
        );

        ValidationCascadeResult {
            auto_fixes: state.auto_fixes,
            warnings: state.warnings,
            updated_sections,
            validators_run: state.validators_run,
            plan: state.plan,
        }
    }

    fn step(
        &self,
        mut state: CascadeState,
        validator: ValidatorCategory,
        previous: &MediaPlan,
    ) -> CascadeState {
        let Some((plan, report)) = self.apply(validator, &state.plan, previous) else {
            debug!(%validator, "validator skipped: required section is absent");
            return state;
        };

        debug!(
            %validator,
            auto_fixes = report.auto_fixes.len(),
            warnings = report.warnings.len(),
            "validator ran"
        );
        for warning in &report.warnings {
            warn!(%validator, "{warning}");
        }

        state.plan = plan;
        state.auto_fixes.extend(report.auto_fixes);
        state.warnings.extend(report.warnings);
        state.validators_run.push(validator);
        state
    }

    /// Run one validator. `None` means its required section is absent.
    fn apply(
        &self,
        validator: ValidatorCategory,
        plan: &MediaPlan,
        previous: &MediaPlan,
    ) -> Option<(MediaPlan, ValidatorReport)> {
        let budget = effective_budget(plan, self.config);
        let mut next = plan.clone();

        let report = match validator {
            ValidatorCategory::Budget => {
                let allocation = plan.budget_allocation.as_ref()?;
                let (fixed, report) = validate_and_fix_budget(allocation, budget);
                next.budget_allocation = Some(fixed);
                report
            }
            ValidatorCategory::CacModel => {
                let performance = next.performance_model.as_mut()?;
                let inputs = CacInputs::resolve(Some(&performance.cac_model), self.config, budget);
                let (fixed, report) = reconcile_cac_model(&performance.cac_model, &inputs);
                performance.cac_model = fixed;
                report
            }
            ValidatorCategory::KpiTargets => {
                if plan.kpi_targets.is_empty() {
                    return None;
                }
                let model = match &plan.performance_model {
                    Some(performance) => performance.cac_model.clone(),
                    None => {
                        compute_cac_model(&CacInputs::resolve(None, self.config, budget)).model
                    }
                };
                let (fixed, report) = reconcile_kpi_targets(&plan.kpi_targets, &model, budget);
                next.kpi_targets = fixed;
                report
            }
            ValidatorCategory::CrossSection => {
                if plan.platform_strategy.is_empty() {
                    return None;
                }
                let (fixed, report) = validate_cross_section(plan);
                next = fixed;
                report
            }
            ValidatorCategory::PhaseBudgets => {
                if plan.campaign_phases.is_empty() {
                    return None;
                }
                let ceiling = plan.budget_allocation.as_ref().map(|a| a.daily_ceiling);
                let (fixed, report) = validate_phase_budgets(
                    &plan.campaign_phases,
                    budget,
                    ceiling,
                    plan.campaign_structure.as_ref(),
                );
                next.campaign_phases = fixed;
                report
            }
            ValidatorCategory::WithinPlatformBudgets => {
                let structure = plan.campaign_structure.as_ref()?;
                if plan.platform_strategy.is_empty() {
                    return None;
                }
                let (fixed, report) =
                    validate_within_platform_budgets(&plan.platform_strategy, structure);
                next.campaign_structure = Some(fixed);
                report
            }
            ValidatorCategory::Timeline => {
                let summary = plan.executive_summary.as_ref()?;
                if plan.campaign_phases.is_empty() {
                    return None;
                }
                reconcile_timeline(summary, &plan.campaign_phases)
            }
            ValidatorCategory::StaleReferences => {
                let (fixed, report) = sweep_stale_references(plan, previous, self.baseline, budget);
                next = fixed;
                report
            }
        };

        Some((next, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{
        BudgetAllocation, CacModel, ExecutiveSummary, PerformanceModel, PlatformBudget,
        SectionName,
    };

    fn config() -> OnboardingConfig {
        OnboardingConfig::new(15_000.0).target_cpl(75.0).offer_price(997.0)
    }

    fn plan() -> MediaPlan {
        MediaPlan {
            executive_summary: Some(ExecutiveSummary {
                overview: "Invest $15,000 per month.".to_owned(),
                recommended_monthly_budget: 15_000.0,
                ..ExecutiveSummary::default()
            }),
            budget_allocation: Some(BudgetAllocation {
                total_monthly_budget: 15_000.0,
                daily_ceiling: 500.0,
                platform_breakdown: vec![
                    PlatformBudget {
                        platform: "Google Ads".to_owned(),
                        percentage: 50.0,
                        monthly_budget: 7_500.0,
                    },
                    PlatformBudget {
                        platform: "Meta".to_owned(),
                        percentage: 30.0,
                        monthly_budget: 4_500.0,
                    },
                ],
                ..BudgetAllocation::default()
            }),
            performance_model: Some(PerformanceModel {
                cac_model: CacModel {
                    target_cpl: 75.0,
                    lead_to_sql_rate: 0.4,
                    sql_to_customer_rate: 0.25,
                    ..CacModel::default()
                },
            }),
            ..MediaPlan::default()
        }
    }

    #[test]
    fn runs_only_requested_validators_in_order() {
        let result = run_cascade(
            &plan(),
            &config(),
            [ValidatorCategory::CacModel, ValidatorCategory::Budget],
        );
        assert_eq!(
            result.validators_run,
            vec![ValidatorCategory::Budget, ValidatorCategory::CacModel]
        );
    }

    #[test]
    fn skipped_validators_are_not_reported_as_run() {
        let result = run_cascade(
            &plan(),
            &config(),
            [ValidatorCategory::PhaseBudgets, ValidatorCategory::Timeline],
        );
        assert!(result.validators_run.is_empty());
        assert!(result.updated_sections.is_empty());
    }

    #[test]
    fn input_plan_is_not_modified() {
        let input = plan();
        let before = input.clone();
        let _ = run_cascade(&input, &config(), ValidatorCategory::ALL);
        assert_eq!(input, before);
    }

    #[test]
    fn updated_sections_lists_changed_sections_only() {
        let result = run_cascade(
            &plan(),
            &config(),
            [ValidatorCategory::Budget, ValidatorCategory::CacModel],
        );
        assert_eq!(
            result.updated_sections.sections(),
            vec![SectionName::BudgetAllocation, SectionName::PerformanceModel]
        );
        let model = &result.plan.performance_model.as_ref().unwrap().cac_model;
        assert_eq!(model.expected_monthly_customers, 20);
    }

    #[test]
    fn kpi_reconciler_uses_working_copy_model() {
        let mut input = plan();
        input.kpi_targets = vec![crate::plan::KpiTarget {
            metric: "Monthly Leads".to_owned(),
            target: "100".to_owned(),
            ..Default::default()
        }];
        let result = run_cascade(
            &input,
            &config(),
            [ValidatorCategory::CacModel, ValidatorCategory::KpiTargets],
        );
        assert_eq!(result.plan.kpi_targets[0].target, "200");
    }

    #[test]
    fn baseline_budget_feeds_stale_reference_sweep() {
        let mut baseline = plan();
        baseline.budget_allocation.as_mut().unwrap().total_monthly_budget = 15_000.0;
        let mut edited = plan();
        edited.budget_allocation.as_mut().unwrap().total_monthly_budget = 20_000.0;
        edited.executive_summary.as_mut().unwrap().recommended_monthly_budget = 0.0;

        let result = Cascade::new(&config())
            .with_baseline(&baseline)
            .run(&edited, [ValidatorCategory::StaleReferences]);
        let summary = result.plan.executive_summary.unwrap();
        assert_eq!(summary.overview, "Invest $20,000 per month.");
        assert_eq!(summary.recommended_monthly_budget, 20_000.0);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let first = run_cascade(&plan(), &config(), ValidatorCategory::ALL);
        let second = run_cascade(&first.plan, &config(), ValidatorCategory::ALL);
        assert!(second.auto_fixes.is_empty(), "{:?}", second.auto_fixes);
        assert_eq!(second.plan, first.plan);
    }
}
