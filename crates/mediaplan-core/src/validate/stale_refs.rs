//! Stale-reference sweeper.
//!
//! After the numbers in a plan change, prose written by the generator still
//! quotes the old figures ("a $15,000 budget yields a $750 CAC"). The
//! sweeper pairs each recomputed figure with its previous value and rewrites
//! exact textual occurrences in a fixed set of free-text fields.

use std::ops::Range;

use crate::plan::MediaPlan;

use super::cac::ratio_value;
use super::numbers::{EPSILON, approx_eq, format_currency, round2};
use super::text::{NumberToken, scan_numbers, scan_ratios};
use super::types::{ValidatorCategory, ValidatorReport};

const V: ValidatorCategory = ValidatorCategory::StaleReferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Currency,
    Ratio,
}

/// A figure that changed: occurrences of `old` should read `new`.
#[derive(Debug, Clone, PartialEq)]
struct StalePair {
    label: &'static str,
    kind: Kind,
    old: f64,
    new: f64,
    /// Replacement text for ratios, taken verbatim from the model.
    ratio_text: Option<String>,
}

/// Rewrite stale figures in free text and sync the recommended budget.
///
/// `previous` is the plan before the cascade ran. `baseline` is the plan
/// before the edit, when the caller has it; old figures are read from it
/// first, so a figure the edit itself changed is still found in the prose.
/// Without a baseline the old budget is the previous
/// `recommendedMonthlyBudget`. `budget` is the effective monthly budget now.
pub fn sweep_stale_references(
    plan: &MediaPlan,
    previous: &MediaPlan,
    baseline: Option<&MediaPlan>,
    budget: f64,
) -> (MediaPlan, ValidatorReport) {
    let mut fixed = plan.clone();
    let mut report = ValidatorReport::default();

    let pairs = stale_pairs(plan, previous, baseline, budget, &mut report);

    if !pairs.is_empty() {
        if let Some(summary) = fixed.executive_summary.as_mut() {
            rewrite(&mut summary.overview, "executiveSummary.overview", &pairs, &mut report);
            for (i, text) in summary.key_recommendations.iter_mut().enumerate() {
                rewrite(
                    text,
                    &format!("executiveSummary.keyRecommendations[{i}]"),
                    &pairs,
                    &mut report,
                );
            }
        }
        for (i, strategy) in fixed.platform_strategy.iter_mut().enumerate() {
            rewrite(
                &mut strategy.rationale,
                &format!("platformStrategy[{i}].rationale"),
                &pairs,
                &mut report,
            );
        }
        if let Some(monitoring) = fixed.risk_monitoring.as_mut() {
            for (i, risk) in monitoring.risks.iter_mut().enumerate() {
                rewrite(
                    &mut risk.description,
                    &format!("riskMonitoring.risks[{i}].description"),
                    &pairs,
                    &mut report,
                );
                rewrite(
                    &mut risk.mitigation,
                    &format!("riskMonitoring.risks[{i}].mitigation"),
                    &pairs,
                    &mut report,
                );
            }
        }
    }

    if let Some(summary) = fixed.executive_summary.as_mut() {
        if budget > 0.0 && !approx_eq(summary.recommended_monthly_budget, budget) {
            report.fix(
                V,
                "executiveSummary.recommendedMonthlyBudget",
                summary.recommended_monthly_budget,
                budget,
                "recommended_budget_matches_allocation",
                "The recommended monthly budget restates the effective monthly budget.",
            );
            summary.recommended_monthly_budget = budget;
        }
    }

    (fixed, report)
}

fn stale_pairs(
    plan: &MediaPlan,
    previous: &MediaPlan,
    baseline: Option<&MediaPlan>,
    budget: f64,
    report: &mut ValidatorReport,
) -> Vec<StalePair> {
    let mut pairs = Vec::new();
    let mut push = |label, kind, old: f64, new: f64, ratio_text: Option<String>| {
        if old > 0.0 && new > 0.0 && !approx_eq(old, new) {
            pairs.push(StalePair {
                label,
                kind,
                old,
                new,
                ratio_text,
            });
        }
    };

    let old_budget = baseline.and_then(baseline_budget).or_else(|| {
        previous
            .executive_summary
            .as_ref()
            .map(|s| s.recommended_monthly_budget)
    });
    if let Some(old) = old_budget {
        push("monthly budget", Kind::Currency, old, budget, None);
    }

    let before = baseline
        .and_then(|b| b.performance_model.as_ref())
        .or(previous.performance_model.as_ref())
        .map(|p| &p.cac_model);
    let after = plan.performance_model.as_ref().map(|p| &p.cac_model);
    if let (Some(before), Some(after)) = (before, after) {
        push("CPL", Kind::Currency, before.target_cpl, after.target_cpl, None);
        if let (Some(old), Some(new)) = (before.target_cac, after.target_cac) {
            push("CAC", Kind::Currency, old, new, None);
        }
        if let (Some(old), Some(new)) = (
            ratio_value(&before.ltv_to_cac_ratio),
            ratio_value(&after.ltv_to_cac_ratio),
        ) {
            push(
                "LTV:CAC ratio",
                Kind::Ratio,
                old,
                new,
                Some(after.ltv_to_cac_ratio.clone()),
            );
        }
    }

    // Two figures that used to read the same cannot be told apart in text.
    let ambiguous: Vec<usize> = (0..pairs.len())
        .filter(|&i| {
            pairs.iter().enumerate().any(|(j, other)| {
                j != i
                    && other.kind == pairs[i].kind
                    && approx_eq(other.old, pairs[i].old)
                    && !approx_eq(other.new, pairs[i].new)
            })
        })
        .collect();
    for &i in &ambiguous {
        report.warn(format!(
            "The old {} figure also stood for another value; text mentioning it was left unchanged.",
            pairs[i].label
        ));
    }
    pairs
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !ambiguous.contains(i))
        .map(|(_, p)| p)
        .collect()
}

/// Monthly budget stated by a baseline plan, if it states one.
fn baseline_budget(baseline: &MediaPlan) -> Option<f64> {
    let positive = |b: f64| (b.is_finite() && b > 0.0).then_some(b);
    baseline
        .budget_allocation
        .as_ref()
        .and_then(|a| positive(a.total_monthly_budget))
        .or_else(|| {
            baseline
                .executive_summary
                .as_ref()
                .and_then(|s| positive(s.recommended_monthly_budget))
        })
}

/// Replace stale figures in `text` in one pass over the original.
fn rewrite(text: &mut String, field: &str, pairs: &[StalePair], report: &mut ValidatorReport) {
    let mut edits: Vec<(Range<usize>, String, &'static str)> = Vec::new();

    for token in scan_numbers(text).into_iter().filter(|t| t.currency) {
        let hit = pairs
            .iter()
            .find(|p| p.kind == Kind::Currency && currency_matches(&token, p.old));
        if let Some(pair) = hit {
            edits.push((token.span.clone(), restyle_currency(&token, pair.new), pair.label));
        }
    }
    for token in scan_ratios(text) {
        let hit = pairs
            .iter()
            .find(|p| p.kind == Kind::Ratio && (token.value - p.old).abs() < 0.05 + EPSILON);
        if let Some(StalePair {
            ratio_text: Some(new_text),
            label,
            ..
        }) = hit
        {
            edits.push((token.span, new_text.clone(), *label));
        }
    }

    if edits.is_empty() {
        return;
    }
    edits.sort_by_key(|(span, _, _)| span.start);

    let old_text = text.clone();
    let mut labels: Vec<&str> = Vec::new();
    for (span, replacement, label) in edits.into_iter().rev() {
        text.replace_range(span, &replacement);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels.reverse();

    report.fix(
        V,
        field,
        old_text,
        text.as_str(),
        "stale_reference",
        format!("Text quoted an outdated {}.", labels.join(" and ")),
    );
}

/// Whether a `$` figure in text states `old`, at the precision it was
/// written with: "$750" states 749.5 to 750.49, "$15k" states 15,000.
fn currency_matches(token: &NumberToken, old: f64) -> bool {
    if approx_eq(token.value, old) {
        return true;
    }
    token.suffix.is_none() && token.decimals == 0 && approx_eq(token.value, old.round())
}

/// Format `amount` the way the original figure was written.
fn restyle_currency(token: &NumberToken, amount: f64) -> String {
    match token.suffix {
        Some(suffix) => {
            let scale = if suffix == 'm' { 1_000_000.0 } else { 1_000.0 };
            let scaled = round2(amount / scale);
            let number = if approx_eq(scaled, scaled.round()) {
                format!("{scaled:.0}")
            } else {
                format!("{scaled}")
            };
            format!("${number}{suffix}")
        }
        None if token.decimals == 2 => {
            let formatted = format_currency(amount);
            if formatted.contains('.') {
                formatted
            } else {
                format!("{formatted}.00")
            }
        }
        None if token.decimals == 0 => format_currency(amount.round()),
        None => format_currency(amount),
    }
}
