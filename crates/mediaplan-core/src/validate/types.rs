use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ValidatorCategory
// ---------------------------------------------------------------------------

/// A validator the cascade can run.
///
/// Declaration order is the global execution order; `Ord` follows it so a
/// `BTreeSet<ValidatorCategory>` iterates in the order validators run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidatorCategory {
    Budget,
    CacModel,
    KpiTargets,
    CrossSection,
    PhaseBudgets,
    WithinPlatformBudgets,
    Timeline,
    StaleReferences,
}

impl ValidatorCategory {
    pub const ALL: [ValidatorCategory; 8] = [
        Self::Budget,
        Self::CacModel,
        Self::KpiTargets,
        Self::CrossSection,
        Self::PhaseBudgets,
        Self::WithinPlatformBudgets,
        Self::Timeline,
        Self::StaleReferences,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::CacModel => "cacModel",
            Self::KpiTargets => "kpiTargets",
            Self::CrossSection => "crossSection",
            Self::PhaseBudgets => "phaseBudgets",
            Self::WithinPlatformBudgets => "withinPlatformBudgets",
            Self::Timeline => "timeline",
            Self::StaleReferences => "staleReferences",
        }
    }

    /// Validators whose output this validator reads.
    ///
    /// - `cacModel` reads the effective budget settled by `budget`.
    /// - `kpiTargets` reconciles against the model written by `cacModel`.
    /// - `crossSection` syncs platforms to the breakdown amounts from `budget`.
    /// - `phaseBudgets` rescales to the total and ceiling from `budget`.
    /// - `withinPlatformBudgets` reads platform spend synced by `crossSection`.
    /// - `staleReferences` needs every recomputed figure, so it follows
    ///   `budget`, `cacModel` and `kpiTargets`.
    pub fn depends_on(self) -> &'static [ValidatorCategory] {
        match self {
            Self::Budget => &[],
            Self::CacModel => &[Self::Budget],
            Self::KpiTargets => &[Self::Budget, Self::CacModel],
            Self::CrossSection => &[Self::Budget],
            Self::PhaseBudgets => &[Self::Budget],
            Self::WithinPlatformBudgets => &[Self::CrossSection],
            Self::Timeline => &[],
            Self::StaleReferences => &[Self::Budget, Self::CacModel, Self::KpiTargets],
        }
    }

    /// Deterministic topological order of the dependency graph.
    ///
    /// Kahn's algorithm, breaking ties by declaration order, so independent
    /// validators keep their declared position.
    pub fn execution_order() -> Vec<ValidatorCategory> {
        let n = Self::ALL.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for category in Self::ALL {
            for dep in category.depends_on() {
                dependents[*dep as usize].push(category as usize);
                in_degree[category as usize] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(node)) = ready.pop() {
            order.push(Self::ALL[node]);
            for &next in &dependents[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        debug_assert_eq!(order.len(), n, "validator dependency graph has a cycle");
        order
    }
}

impl fmt::Display for ValidatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorCategory {
    type Err = ValidatorCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidatorCategoryParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`ValidatorCategory`] string.
#[derive(Debug, Clone)]
pub struct ValidatorCategoryParseError(pub String);

impl fmt::Display for ValidatorCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid validator category: {:?}", self.0)
    }
}

impl std::error::Error for ValidatorCategoryParseError {}

// ---------------------------------------------------------------------------
// Audit records
// ---------------------------------------------------------------------------

/// A correction applied without human confirmation.
///
/// Edits may come from an autonomous agent, so every fix names the rule it
/// enforced and why, for a human reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationAutoFix {
    pub validator: ValidatorCategory,
    /// Full path of the corrected field, e.g. `budgetAllocation.dailyCeiling`.
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    pub rule: String,
    pub reason: String,
}

/// Fixes and warnings produced by one validator run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorReport {
    pub auto_fixes: Vec<ValidationAutoFix>,
    pub warnings: Vec<String>,
}

impl ValidatorReport {
    pub fn fix(
        &mut self,
        validator: ValidatorCategory,
        field: impl Into<String>,
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
        rule: &str,
        reason: impl Into<String>,
    ) {
        self.auto_fixes.push(ValidationAutoFix {
            validator,
            field: field.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            rule: rule.to_owned(),
            reason: reason.into(),
        });
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn is_clean(&self) -> bool {
        self.auto_fixes.is_empty() && self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_order_matches_declared_order() {
        assert_eq!(
            ValidatorCategory::execution_order(),
            ValidatorCategory::ALL.to_vec()
        );
    }

    #[test]
    fn dependencies_run_before_dependents() {
        let order = ValidatorCategory::execution_order();
        let pos = |c: ValidatorCategory| order.iter().position(|o| *o == c).unwrap();
        for category in ValidatorCategory::ALL {
            for dep in category.depends_on() {
                assert!(
                    pos(*dep) < pos(category),
                    "{dep} must run before {category}"
                );
            }
        }
    }

    #[test]
    fn categories_roundtrip_through_strings() {
        for category in ValidatorCategory::ALL {
            assert_eq!(category.as_str().parse::<ValidatorCategory>().unwrap(), category);
        }
        assert!("kpis".parse::<ValidatorCategory>().is_err());
    }

    #[test]
    fn category_serializes_camel_case() {
        let json = serde_json::to_string(&ValidatorCategory::WithinPlatformBudgets).unwrap();
        assert_eq!(json, r#""withinPlatformBudgets""#);
    }

    #[test]
    fn report_records_fix_values_as_json() {
        let mut report = ValidatorReport::default();
        report.fix(
            ValidatorCategory::Budget,
            "budgetAllocation.dailyCeiling",
            300.0,
            500.0,
            "daily_ceiling",
            "dailyCeiling is floor(total / 30)",
        );
        assert_eq!(report.auto_fixes[0].old_value, serde_json::json!(300.0));
        assert!(!report.is_clean());
    }
}
