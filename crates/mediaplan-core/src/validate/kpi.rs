//! KPI reconciler: keeps stated KPI targets in line with the funnel model.

use crate::plan::{CacModel, KpiTarget};

use super::numbers::{format_count, format_currency, format_ratio};
use super::text::{scan_numbers, scan_ratios};
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::KpiTargets;

/// Relative deviation a stated target may have before it is overwritten.
pub const KPI_TOLERANCE: f64 = 0.05;

/// A KPI metric the funnel model derives a value for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedMetric {
    LtvToCac,
    Cpl,
    Cac,
    Sqls,
    Leads,
    Customers,
    Ltv,
    AdSpend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Currency,
    Count,
    Ratio,
}

impl DerivedMetric {
    /// Recognize a KPI by its metric name.
    ///
    /// Order matters: "LTV:CAC" mentions both LTV and CAC, "cost per lead"
    /// mentions leads, "Cost per SQL" mentions SQLs. Conversion rates, MQLs
    /// and unit costs other than CPL and CAC are not derived metrics.
    pub fn classify(metric: &str) -> Option<Self> {
        let m = metric.to_lowercase();
        let has = |needle: &str| m.contains(needle);

        if has("ltv:cac") || has("ltv/cac") || has("ltv to cac") || has("ltv-to-cac") {
            return Some(Self::LtvToCac);
        }
        if has("rate") || has("conversion") || has("%") {
            return None;
        }
        if has("cpl") || has("cost per lead") || has("cost-per-lead") {
            return Some(Self::Cpl);
        }
        if has("cac")
            || has("customer acquisition")
            || has("cost per acquisition")
            || has("cost-per-acquisition")
            || has("cost per customer")
            || has("cost-per-customer")
        {
            return Some(Self::Cac);
        }
        // Any other unit cost (per SQL, per MQL, per click) has no model value.
        if has("cost per") || has("cost-per") {
            return None;
        }
        if has("mql") || has("marketing qualified") {
            return None;
        }

        if has("sql") || has("qualified") {
            Some(Self::Sqls)
        } else if has("lead") {
            Some(Self::Leads)
        } else if has("ltv") || has("lifetime value") {
            Some(Self::Ltv)
        } else if has("customer") {
            Some(Self::Customers)
        } else if has("ad spend") || has("monthly budget") || has("monthly spend") {
            Some(Self::AdSpend)
        } else {
            None
        }
    }

    fn format(self) -> Format {
        match self {
            Self::LtvToCac => Format::Ratio,
            Self::Sqls | Self::Leads | Self::Customers => Format::Count,
            Self::Cpl | Self::Cac | Self::Ltv | Self::AdSpend => Format::Currency,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::LtvToCac => "LTV:CAC ratio",
            Self::Cpl => "cost per lead",
            Self::Cac => "customer acquisition cost",
            Self::Sqls => "monthly SQLs",
            Self::Leads => "monthly leads",
            Self::Customers => "monthly customers",
            Self::Ltv => "estimated LTV",
            Self::AdSpend => "monthly ad spend",
        }
    }

    /// The value the model implies, or `None` when it is undefined.
    fn expected(self, model: &CacModel, monthly_budget: f64) -> Option<f64> {
        match self {
            Self::LtvToCac => model
                .target_cac
                .filter(|cac| *cac > 0.0)
                .map(|cac| model.estimated_ltv / cac),
            Self::Cpl => Some(model.target_cpl),
            Self::Cac => model.target_cac,
            Self::Sqls => Some(model.expected_monthly_sqls as f64),
            Self::Leads => Some(model.expected_monthly_leads as f64),
            Self::Customers => Some(model.expected_monthly_customers as f64),
            Self::Ltv => Some(model.estimated_ltv),
            Self::AdSpend => Some(monthly_budget),
        }
    }
}

/// Overwrite KPI targets that deviate from `model` by more than 5%.
///
/// Only the figure inside the target text is replaced, so "< $75" becomes
/// "< $60" rather than "$60".
pub fn reconcile_kpi_targets(
    kpis: &[KpiTarget],
    model: &CacModel,
    monthly_budget: f64,
) -> (Vec<KpiTarget>, ValidatorReport) {
    let mut fixed = kpis.to_vec();
    let mut report = ValidatorReport::default();

    for (i, kpi) in fixed.iter_mut().enumerate() {
        let Some(metric) = DerivedMetric::classify(&kpi.metric) else {
            continue;
        };
        let Some(expected) = metric.expected(model, monthly_budget) else {
            report.warn(format!(
                "KPI \"{}\" cannot be checked: the {} is undefined.",
                kpi.metric,
                metric.label()
            ));
            continue;
        };
        let Some((span, stated, currency)) = stated_value(&kpi.target, metric.format()) else {
            report.warn(format!(
                "KPI \"{}\" target \"{}\" has no figure to check against the {}.",
                kpi.metric,
                kpi.target,
                metric.label()
            ));
            continue;
        };

        if !deviates(stated, expected) {
            continue;
        }

        let mut figure = match metric.format() {
            Format::Currency => format_currency(expected),
            Format::Count => format_count(expected.max(0.0).round() as u64),
            Format::Ratio => format_ratio(expected),
        };
        if metric.format() == Format::Currency && !currency {
            figure = figure.replacen('$', "", 1);
        }

        let mut target = kpi.target.clone();
        target.replace_range(span, &figure);
        report.fix(
            V,
            format!("kpiTargets[{i}].target"),
            kpi.target.as_str(),
            target.as_str(),
            "kpi_matches_model",
            format!(
                "Stated {} deviated more than {:.0}% from the model value {figure}.",
                metric.label(),
                KPI_TOLERANCE * 100.0
            ),
        );
        kpi.target = target;
    }

    (fixed, report)
}

/// The figure in a target, its byte span, and whether it carried a `$`.
fn stated_value(target: &str, format: Format) -> Option<(std::ops::Range<usize>, f64, bool)> {
    if format == Format::Ratio {
        if let Some(ratio) = scan_ratios(target).into_iter().next() {
            return Some((ratio.span, ratio.value, false));
        }
    }
    scan_numbers(target)
        .into_iter()
        .next()
        .map(|t| (t.span, t.value, t.currency))
}

fn deviates(stated: f64, expected: f64) -> bool {
    if expected.abs() < f64::EPSILON {
        return stated.abs() > f64::EPSILON;
    }
    ((stated - expected) / expected).abs() > KPI_TOLERANCE
}
