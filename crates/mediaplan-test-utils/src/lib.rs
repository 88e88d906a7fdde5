//! Shared fixtures for mediaplan integration tests.
//!
//! The sample plan is internally consistent for its onboarding data: a full
//! cascade over it produces no fixes and no warnings. Tests edit one field
//! and assert on what the cascade does in response.
//!
//! Key figures: $15,000/month split 50/30/20 across Google Ads, Meta and
//! LinkedIn; $75 CPL, 40% lead-to-SQL, 25% SQL-to-customer; a $997 monthly
//! offer. That funnel yields 200 leads, 80 SQLs, 20 customers, a $750 CAC
//! and an $11,964 LTV.

use mediaplan_core::config::{OnboardingConfig, OnboardingFormData};
use mediaplan_core::plan::MediaPlan;
use serde_json::{Value, json};

/// The sample plan as JSON, the way the generator would emit it.
pub fn sample_plan_json() -> Value {
    json!({
        "executiveSummary": {
            "overview": "A $15,000 monthly program across Google Ads, Meta and LinkedIn, targeting a $750 CAC and a 16.0:1 LTV:CAC ratio.",
            "keyRecommendations": [
                "Lead with high-intent search on Google Ads at $75 per lead.",
                "Hold LinkedIn to a $3,000 test until SQL quality is proven."
            ],
            "recommendedMonthlyBudget": 15000,
            "timelineToResults": "60-90 days"
        },
        "platformStrategy": [
            {
                "platform": "Google Ads",
                "rationale": "Captures existing demand; half of the $15,000 budget.",
                "budgetPercentage": 50,
                "monthlySpend": 7500,
                "priority": "primary"
            },
            {
                "platform": "Meta",
                "rationale": "Cheap reach for lookalike prospecting and retargeting.",
                "budgetPercentage": 30,
                "monthlySpend": 4500,
                "priority": "secondary"
            },
            {
                "platform": "LinkedIn",
                "rationale": "Job-title targeting for decision makers.",
                "budgetPercentage": 20,
                "monthlySpend": 3000,
                "priority": "testing"
            }
        ],
        "icpTargeting": {
            "primaryAudience": "Operations leaders at 50-500 person B2B SaaS companies",
            "platformTargeting": [
                { "platform": "Google Ads", "description": "Problem-aware search terms" },
                { "platform": "Meta", "description": "1% lookalikes of customers" },
                { "platform": "LinkedIn", "description": "VP and Director of Operations" }
            ]
        },
        "campaignStructure": {
            "cold": [
                { "name": "Search - Non-Brand", "platform": "Google Ads", "objective": "Leads", "monthlyBudget": 5000 },
                { "name": "Lookalike Prospecting", "platform": "Meta", "objective": "Leads", "monthlyBudget": 3000 },
                { "name": "Job Title Targeting", "platform": "LinkedIn", "objective": "Leads", "monthlyBudget": 3000 }
            ],
            "warm": [
                { "name": "Engagement Retargeting", "platform": "Meta", "objective": "Conversions", "monthlyBudget": 1500 }
            ],
            "hot": [
                { "name": "Brand Search", "platform": "Google Ads", "objective": "Conversions", "monthlyBudget": 2500 }
            ]
        },
        "budgetAllocation": {
            "totalMonthlyBudget": 15000,
            "dailyCeiling": 500,
            "platformBreakdown": [
                { "platform": "Google Ads", "percentage": 50, "monthlyBudget": 7500 },
                { "platform": "Meta", "percentage": 30, "monthlyBudget": 4500 },
                { "platform": "LinkedIn", "percentage": 20, "monthlyBudget": 3000 }
            ],
            "testingPhase": {
                "durationDays": 14,
                "budget": 3000,
                "description": "Creative and audience testing"
            }
        },
        "campaignPhases": [
            {
                "name": "Foundation",
                "duration": "Weeks 1-4",
                "budget": 4000,
                "campaigns": ["Search - Non-Brand", "Brand Search"],
                "objectives": ["Establish baseline CPL"]
            },
            {
                "name": "Optimization",
                "duration": "Weeks 5-8",
                "budget": 5000,
                "campaigns": ["Lookalike Prospecting", "Engagement Retargeting"],
                "objectives": ["Cut CPL by pruning audiences"]
            },
            {
                "name": "Scale",
                "duration": "Weeks 9-12",
                "budget": 6000,
                "campaigns": ["Job Title Targeting"],
                "objectives": ["Scale winners"]
            }
        ],
        "kpiTargets": [
            { "metric": "Cost per Lead", "target": "$75", "benchmark": "$60-$120", "timeframe": "Monthly" },
            { "metric": "Monthly SQLs", "target": "80", "benchmark": "", "timeframe": "Month 3" },
            { "metric": "CAC", "target": "$750", "benchmark": "", "timeframe": "Month 3" },
            { "metric": "LTV:CAC Ratio", "target": "16.0:1", "benchmark": "3:1", "timeframe": "Quarterly" },
            { "metric": "Click-through Rate", "target": "2.5%", "benchmark": "1.9%", "timeframe": "Weekly" }
        ],
        "performanceModel": {
            "cacModel": {
                "targetCPL": 75,
                "expectedMonthlyLeads": 200,
                "leadToSqlRate": 0.4,
                "expectedMonthlySQLs": 80,
                "sqlToCustomerRate": 0.25,
                "expectedMonthlyCustomers": 20,
                "targetCAC": 750,
                "estimatedLTV": 11964,
                "ltvToCacRatio": "16.0:1"
            }
        },
        "riskMonitoring": {
            "risks": [
                {
                    "description": "CPL rises above $75 as audiences saturate.",
                    "mitigation": "Rotate creative weekly."
                }
            ]
        }
    })
}

/// The sample plan, typed.
pub fn sample_plan() -> MediaPlan {
    serde_json::from_value(sample_plan_json()).expect("sample plan should deserialize")
}

/// Onboarding answers matching [`sample_plan`].
pub fn sample_onboarding() -> OnboardingFormData {
    serde_json::from_value(json!({
        "budgetTargets": { "monthlyAdBudget": 15000, "targetCpl": 75 },
        "productOffer": {
            "offerPrice": 997,
            "pricingTiers": [{ "name": "Pro", "price": 997 }],
            "pricingModel": "monthly"
        }
    }))
    .expect("sample onboarding should deserialize")
}

/// [`sample_onboarding`] resolved into a config.
pub fn sample_config() -> OnboardingConfig {
    OnboardingConfig::from_form(&sample_onboarding())
}
