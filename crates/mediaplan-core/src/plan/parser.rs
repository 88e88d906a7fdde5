//! Media plan JSON parser with structural validation.
//!
//! Parses a plan document into a [`MediaPlan`] and validates:
//! - Platform names are unique within `platformStrategy`.
//! - Platform names are unique within `budgetAllocation.platformBreakdown`.
//! - Campaign names are unique across `campaignStructure`.
//! - Numeric budget fields are finite.
//!
//! Arithmetic consistency is not checked here; that is the cascade's job.
//! These checks only reject documents the validators cannot reason about.

use std::collections::HashSet;

use thiserror::Error;

use super::model::MediaPlan;

/// Errors that can occur during plan parsing and validation.
#[derive(Debug, Error)]
pub enum PlanLoadError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate platform {platform:?} in {section}")]
    DuplicatePlatform {
        section: &'static str,
        platform: String,
    },

    #[error("duplicate campaign name: {0:?}")]
    DuplicateCampaign(String),

    #[error("non-finite value in {field}")]
    NonFinite { field: String },
}

/// Parse and validate a media plan JSON string.
pub fn parse_media_plan(content: &str) -> Result<MediaPlan, PlanLoadError> {
    let plan: MediaPlan = serde_json::from_str(content)?;
    validate_structure(&plan)?;
    Ok(plan)
}

/// Validate the structural invariants every validator relies on.
pub fn validate_structure(plan: &MediaPlan) -> Result<(), PlanLoadError> {
    let mut seen = HashSet::new();
    for entry in &plan.platform_strategy {
        if !seen.insert(normalize_platform(&entry.platform)) {
            return Err(PlanLoadError::DuplicatePlatform {
                section: "platformStrategy",
                platform: entry.platform.clone(),
            });
        }
        check_finite("platformStrategy.budgetPercentage", entry.budget_percentage)?;
        check_finite("platformStrategy.monthlySpend", entry.monthly_spend)?;
    }

    if let Some(allocation) = &plan.budget_allocation {
        check_finite(
            "budgetAllocation.totalMonthlyBudget",
            allocation.total_monthly_budget,
        )?;
        check_finite("budgetAllocation.dailyCeiling", allocation.daily_ceiling)?;

        let mut seen = HashSet::new();
        for entry in &allocation.platform_breakdown {
            if !seen.insert(normalize_platform(&entry.platform)) {
                return Err(PlanLoadError::DuplicatePlatform {
                    section: "budgetAllocation.platformBreakdown",
                    platform: entry.platform.clone(),
                });
            }
            check_finite("budgetAllocation.platformBreakdown.percentage", entry.percentage)?;
        }
    }

    if let Some(structure) = &plan.campaign_structure {
        let mut seen = HashSet::new();
        for (_, _, campaign) in structure.campaigns() {
            if !seen.insert(campaign.name.as_str()) {
                return Err(PlanLoadError::DuplicateCampaign(campaign.name.clone()));
            }
        }
    }

    for phase in &plan.campaign_phases {
        check_finite("campaignPhases.budget", phase.budget)?;
    }

    Ok(())
}

/// Canonical key used to compare platform names across sections.
///
/// "Google Ads", "google ads" and " Google  Ads " all name the same platform.
pub fn normalize_platform(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_finite(field: &str, value: f64) -> Result<(), PlanLoadError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlanLoadError::NonFinite {
            field: field.to_owned(),
        })
    }
}
