//! `mediaplan resolve` command: show which validators an edit would trigger.

use anyhow::{Context, Result};

use mediaplan_core::{SectionName, affected_validators};

/// Validators affected by an edit to `section` at `field`, in execution order.
pub fn resolve_names(section: &str, field: &str) -> Result<Vec<&'static str>> {
    let section: SectionName = section.parse().with_context(|| {
        let known: Vec<&str> = SectionName::ALL.iter().map(|s| s.as_str()).collect();
        format!("known sections: {}", known.join(", "))
    })?;
    Ok(affected_validators(section.as_str(), field)
        .into_iter()
        .map(|v| v.as_str())
        .collect())
}

/// Run the resolve command.
pub fn run_resolve(section: &str, field: Option<&str>) -> Result<()> {
    for name in resolve_names(section, field.unwrap_or(""))? {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_section_lists_six_validators() {
        assert_eq!(
            resolve_names("budgetAllocation", "totalMonthlyBudget").unwrap(),
            vec![
                "budget",
                "cacModel",
                "kpiTargets",
                "crossSection",
                "phaseBudgets",
                "staleReferences"
            ]
        );
    }

    #[test]
    fn risk_section_lists_sweeper_only() {
        assert_eq!(
            resolve_names("riskMonitoring", "risks[0].mitigation").unwrap(),
            vec!["staleReferences"]
        );
    }

    #[test]
    fn unknown_section_lists_known_sections() {
        let err = resolve_names("pricing", "").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("executiveSummary"), "{msg}");
        assert!(msg.contains("pricing"), "{msg}");
    }
}
