//! Customer-acquisition funnel model.
//!
//! [`compute_cac_model`] is a pure calculator. [`reconcile_cac_model`] runs
//! it against a plan's current model and records every field it changes.

use serde::{Deserialize, Serialize};

use crate::config::OnboardingConfig;
use crate::plan::CacModel;

use super::numbers::{approx_eq, format_ratio, non_negative, round2};
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::CacModel;

/// Ratio text used when CAC is undefined.
pub const UNDEFINED_RATIO: &str = "N/A";

/// Inputs of the funnel model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacInputs {
    pub monthly_budget: f64,
    #[serde(rename = "targetCPL")]
    pub target_cpl: f64,
    pub lead_to_sql_rate: f64,
    pub sql_to_customer_rate: f64,
    pub offer_price: f64,
    pub retention_multiplier: f64,
}

impl CacInputs {
    /// Inputs for a plan whose effective budget is `monthly_budget`.
    ///
    /// CPL and conversion rates come from the plan's current model when
    /// positive, otherwise from the onboarding target CPL and the configured
    /// funnel defaults. Offer price and retention always come from
    /// onboarding.
    pub fn resolve(current: Option<&CacModel>, config: &OnboardingConfig, monthly_budget: f64) -> Self {
        let positive = |v: f64| (v.is_finite() && v > 0.0).then_some(v);
        let from_plan = |f: fn(&CacModel) -> f64| current.map(f).and_then(positive);

        Self {
            monthly_budget,
            target_cpl: from_plan(|m| m.target_cpl)
                .or(config.target_cpl.and_then(positive))
                .unwrap_or(0.0),
            lead_to_sql_rate: from_plan(|m| m.lead_to_sql_rate)
                .unwrap_or(config.funnel.lead_to_sql_rate),
            sql_to_customer_rate: from_plan(|m| m.sql_to_customer_rate)
                .unwrap_or(config.funnel.sql_to_customer_rate),
            offer_price: config.offer_price,
            retention_multiplier: config.retention_multiplier,
        }
    }
}

/// A computed model plus the guards that fired while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacComputation {
    pub model: CacModel,
    pub warnings: Vec<String>,
}

/// Compute the funnel: leads, SQLs, customers, CAC, LTV and LTV:CAC.
///
/// Every division is guarded and every input is clamped, so the model never
/// contains NaN or infinity. Clamps and the undefined-CAC case are reported
/// as warnings.
pub fn compute_cac_model(inputs: &CacInputs) -> CacComputation {
    let mut warnings = Vec::new();

    let budget = clamp_amount(inputs.monthly_budget, "Monthly budget", &mut warnings);
    let cpl = clamp_amount(inputs.target_cpl, "Target CPL", &mut warnings);
    let lead_to_sql = clamp_rate(inputs.lead_to_sql_rate, "Lead-to-SQL rate", &mut warnings);
    let sql_to_customer =
        clamp_rate(inputs.sql_to_customer_rate, "SQL-to-customer rate", &mut warnings);
    let offer_price = clamp_amount(inputs.offer_price, "Offer price", &mut warnings);
    let retention = clamp_amount(
        inputs.retention_multiplier,
        "Retention multiplier",
        &mut warnings,
    );

    let leads = if cpl > 0.0 {
        (budget / cpl).floor() as u64
    } else {
        warnings.push("Target CPL is zero; expected leads set to 0.".to_owned());
        0
    };
    let sqls = (leads as f64 * lead_to_sql).round() as u64;
    let customers = (sqls as f64 * sql_to_customer).round() as u64;

    let target_cac = if customers > 0 {
        Some(round2(budget / customers as f64))
    } else {
        warnings.push(
            "Funnel produces 0 customers per month; CAC is undefined.".to_owned(),
        );
        None
    };

    let estimated_ltv = round2(offer_price * retention);
    if offer_price <= 0.0 {
        warnings.push("Offer price is unknown; estimated LTV is $0.".to_owned());
    }

    let ltv_to_cac_ratio = match target_cac {
        Some(cac) if cac > 0.0 => format_ratio(estimated_ltv / cac),
        _ => UNDEFINED_RATIO.to_owned(),
    };

    CacComputation {
        model: CacModel {
            target_cpl: cpl,
            expected_monthly_leads: leads,
            lead_to_sql_rate: lead_to_sql,
            expected_monthly_sqls: sqls,
            sql_to_customer_rate: sql_to_customer,
            expected_monthly_customers: customers,
            target_cac,
            estimated_ltv,
            ltv_to_cac_ratio,
        },
        warnings,
    }
}

fn clamp_amount(value: f64, label: &str, warnings: &mut Vec<String>) -> f64 {
    let (clean, clamped) = non_negative(value);
    if clamped {
        warnings.push(format!("{label} {value} is not a valid amount; using 0."));
    }
    clean
}

fn clamp_rate(value: f64, label: &str, warnings: &mut Vec<String>) -> f64 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        return value;
    }
    let clean = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    warnings.push(format!("{label} {value} is outside 0-1; using {clean}."));
    clean
}

/// Recompute the model from `inputs` and record each field of `current`
/// that changes.
pub fn reconcile_cac_model(current: &CacModel, inputs: &CacInputs) -> (CacModel, ValidatorReport) {
    let computation = compute_cac_model(inputs);
    let next = computation.model;
    let mut report = ValidatorReport {
        warnings: computation.warnings,
        ..ValidatorReport::default()
    };

    let field = |name: &str| format!("performanceModel.cacModel.{name}");

    if !approx_eq(current.target_cpl, next.target_cpl) {
        report.fix(
            V,
            field("targetCPL"),
            current.target_cpl,
            next.target_cpl,
            "cpl_input",
            "Target CPL taken from the plan, falling back to the onboarding target.",
        );
    }
    if !approx_eq(current.lead_to_sql_rate, next.lead_to_sql_rate) {
        report.fix(
            V,
            field("leadToSqlRate"),
            current.lead_to_sql_rate,
            next.lead_to_sql_rate,
            "conversion_rate_input",
            "Lead-to-SQL rate must be a fraction between 0 and 1.",
        );
    }
    if !approx_eq(current.sql_to_customer_rate, next.sql_to_customer_rate) {
        report.fix(
            V,
            field("sqlToCustomerRate"),
            current.sql_to_customer_rate,
            next.sql_to_customer_rate,
            "conversion_rate_input",
            "SQL-to-customer rate must be a fraction between 0 and 1.",
        );
    }
    if current.expected_monthly_leads != next.expected_monthly_leads {
        report.fix(
            V,
            field("expectedMonthlyLeads"),
            current.expected_monthly_leads,
            next.expected_monthly_leads,
            "leads_from_budget",
            format!(
                "floor(${:.0} budget / ${} CPL).",
                inputs.monthly_budget, next.target_cpl
            ),
        );
    }
    if current.expected_monthly_sqls != next.expected_monthly_sqls {
        report.fix(
            V,
            field("expectedMonthlySQLs"),
            current.expected_monthly_sqls,
            next.expected_monthly_sqls,
            "sqls_from_leads",
            format!(
                "round({} leads x {} lead-to-SQL rate).",
                next.expected_monthly_leads, next.lead_to_sql_rate
            ),
        );
    }
    if current.expected_monthly_customers != next.expected_monthly_customers {
        report.fix(
            V,
            field("expectedMonthlyCustomers"),
            current.expected_monthly_customers,
            next.expected_monthly_customers,
            "customers_from_sqls",
            format!(
                "round({} SQLs x {} SQL-to-customer rate).",
                next.expected_monthly_sqls, next.sql_to_customer_rate
            ),
        );
    }
    let cac_changed = match (current.target_cac, next.target_cac) {
        (Some(a), Some(b)) => !approx_eq(a, b),
        (None, None) => false,
        _ => true,
    };
    if cac_changed {
        report.fix(
            V,
            field("targetCAC"),
            current.target_cac,
            next.target_cac,
            "cac_from_budget",
            "Target CAC is the monthly budget divided by expected monthly customers.",
        );
    }
    if !approx_eq(current.estimated_ltv, next.estimated_ltv) {
        report.fix(
            V,
            field("estimatedLTV"),
            current.estimated_ltv,
            next.estimated_ltv,
            "ltv_from_offer",
            format!(
                "Offer price ${} x retention multiplier {}.",
                inputs.offer_price, inputs.retention_multiplier
            ),
        );
    }
    if current.ltv_to_cac_ratio != next.ltv_to_cac_ratio {
        report.fix(
            V,
            field("ltvToCacRatio"),
            current.ltv_to_cac_ratio.as_str(),
            next.ltv_to_cac_ratio.as_str(),
            "ltv_to_cac_ratio",
            "Ratio text must reflect estimated LTV divided by target CAC.",
        );
    }

    (next, report)
}

/// Numeric value of a ratio string such as `"16.0:1"`.
pub fn ratio_value(ratio: &str) -> Option<f64> {
    ratio.strip_suffix(":1")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> CacInputs {
        CacInputs {
            monthly_budget: 15_000.0,
            target_cpl: 75.0,
            lead_to_sql_rate: 0.4,
            sql_to_customer_rate: 0.25,
            offer_price: 997.0,
            retention_multiplier: 12.0,
        }
    }

    #[test]
    fn scenario_a_funnel() {
        let result = compute_cac_model(&scenario_a());
        let model = result.model;

        assert_eq!(model.expected_monthly_leads, 200);
        assert_eq!(model.expected_monthly_sqls, 80);
        assert_eq!(model.expected_monthly_customers, 20);
        assert_eq!(model.target_cac, Some(750.0));
        assert_eq!(model.estimated_ltv, 11_964.0);
        let ratio = ratio_value(&model.ltv_to_cac_ratio).expect("ratio should parse");
        assert!((ratio - 15.95).abs() < 0.1, "ratio was {}", model.ltv_to_cac_ratio);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn zero_customers_yields_undefined_cac() {
        let inputs = CacInputs {
            monthly_budget: 100.0,
            ..scenario_a()
        };
        let result = compute_cac_model(&inputs);
        assert_eq!(result.model.expected_monthly_customers, 0);
        assert_eq!(result.model.target_cac, None);
        assert_eq!(result.model.ltv_to_cac_ratio, UNDEFINED_RATIO);
        assert!(result.warnings.iter().any(|w| w.contains("CAC is undefined")));
    }

    #[test]
    fn zero_cpl_does_not_divide() {
        let inputs = CacInputs {
            target_cpl: 0.0,
            ..scenario_a()
        };
        let result = compute_cac_model(&inputs);
        assert_eq!(result.model.expected_monthly_leads, 0);
        assert_eq!(result.model.target_cac, None);
    }

    #[test]
    fn non_finite_inputs_are_clamped() {
        let inputs = CacInputs {
            monthly_budget: f64::NAN,
            target_cpl: f64::INFINITY,
            lead_to_sql_rate: 1.5,
            sql_to_customer_rate: -0.2,
            offer_price: f64::NEG_INFINITY,
            retention_multiplier: 12.0,
        };
        let result = compute_cac_model(&inputs);
        let model = &result.model;
        assert_eq!(model.lead_to_sql_rate, 1.0);
        assert_eq!(model.sql_to_customer_rate, 0.0);
        assert!(model.target_cpl.is_finite());
        assert!(model.estimated_ltv.is_finite());
        assert!(result.warnings.len() >= 4, "{:?}", result.warnings);
    }

    #[test]
    fn funnel_is_monotone() {
        for budget in [0.0, 999.0, 15_000.0, 250_000.0] {
            for cpl in [1.0, 37.5, 200.0] {
                for rate in [0.0, 0.33, 0.5, 1.0] {
                    let model = compute_cac_model(&CacInputs {
                        monthly_budget: budget,
                        target_cpl: cpl,
                        lead_to_sql_rate: rate,
                        sql_to_customer_rate: rate,
                        offer_price: 100.0,
                        retention_multiplier: 3.0,
                    })
                    .model;
                    assert!(model.expected_monthly_sqls <= model.expected_monthly_leads);
                    assert!(model.expected_monthly_customers <= model.expected_monthly_sqls);
                }
            }
        }
    }

    #[test]
    fn reconcile_records_changed_fields_only() {
        let current = compute_cac_model(&scenario_a()).model;
        let inputs = CacInputs {
            monthly_budget: 30_000.0,
            ..scenario_a()
        };
        let (next, report) = reconcile_cac_model(&current, &inputs);

        assert_eq!(next.expected_monthly_leads, 400);
        let fields: Vec<&str> = report.auto_fixes.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"performanceModel.cacModel.expectedMonthlyLeads"));
        assert!(!fields.contains(&"performanceModel.cacModel.targetCPL"));
        assert!(!fields.contains(&"performanceModel.cacModel.estimatedLTV"));
    }

    #[test]
    fn reconcile_is_clean_when_model_is_current() {
        let current = compute_cac_model(&scenario_a()).model;
        let (_, report) = reconcile_cac_model(&current, &scenario_a());
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn resolve_prefers_plan_inputs_over_onboarding() {
        let config = OnboardingConfig::new(15_000.0).target_cpl(50.0).offer_price(997.0);
        let current = compute_cac_model(&scenario_a()).model;

        let inputs = CacInputs::resolve(Some(&current), &config, 15_000.0);
        assert_eq!(inputs.target_cpl, 75.0);
        assert_eq!(inputs.lead_to_sql_rate, 0.4);

        let inputs = CacInputs::resolve(None, &config, 15_000.0);
        assert_eq!(inputs.target_cpl, 50.0);
        assert_eq!(inputs.lead_to_sql_rate, 0.30);
        assert_eq!(inputs.sql_to_customer_rate, 0.25);
        assert_eq!(inputs.offer_price, 997.0);
    }

    #[test]
    fn ratio_value_parses_formatted_ratio() {
        assert_eq!(ratio_value("16.0:1"), Some(16.0));
        assert_eq!(ratio_value(UNDEFINED_RATIO), None);
    }
}
