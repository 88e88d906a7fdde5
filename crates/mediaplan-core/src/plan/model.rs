//! Typed media plan document.
//!
//! These types map directly to the JSON document produced by the plan
//! generator and are (de)serialized via `serde` with camelCase field names.
//! Every section is optional or may be empty: the generator can omit any of
//! them, and validators that need a missing section are skipped.

use serde::{Deserialize, Serialize};

/// The document under validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(default)]
    pub platform_strategy: Vec<PlatformStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icp_targeting: Option<IcpTargeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_structure: Option<CampaignStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<BudgetAllocation>,
    #[serde(default)]
    pub campaign_phases: Vec<CampaignPhase>,
    #[serde(default)]
    pub kpi_targets: Vec<KpiTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_model: Option<PerformanceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_monitoring: Option<RiskMonitoring>,
}

// ---------------------------------------------------------------------------
// Executive summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub key_recommendations: Vec<String>,
    #[serde(default)]
    pub recommended_monthly_budget: f64,
    /// Free text such as "60-90 days" or "3 months".
    #[serde(default)]
    pub timeline_to_results: String,
}

// ---------------------------------------------------------------------------
// Platform strategy
// ---------------------------------------------------------------------------

/// Relative importance of an advertising platform in the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[serde(alias = "high")]
    Primary,
    #[default]
    #[serde(alias = "medium")]
    Secondary,
    #[serde(alias = "low")]
    Testing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStrategy {
    pub platform: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub budget_percentage: f64,
    #[serde(default)]
    pub monthly_spend: f64,
    #[serde(default)]
    pub priority: Priority,
}

// ---------------------------------------------------------------------------
// ICP targeting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IcpTargeting {
    #[serde(default)]
    pub primary_audience: String,
    #[serde(default)]
    pub platform_targeting: Vec<PlatformTargeting>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTargeting {
    pub platform: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Campaign structure
// ---------------------------------------------------------------------------

/// Funnel temperature a campaign is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperature {
    Cold,
    Warm,
    Hot,
}

impl Temperature {
    pub const ALL: [Temperature; 3] = [Self::Cold, Self::Warm, Self::Hot];

    /// JSON key of the campaign group.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStructure {
    #[serde(default)]
    pub cold: Vec<Campaign>,
    #[serde(default)]
    pub warm: Vec<Campaign>,
    #[serde(default)]
    pub hot: Vec<Campaign>,
}

impl CampaignStructure {
    pub fn group(&self, temperature: Temperature) -> &[Campaign] {
        match temperature {
            Temperature::Cold => &self.cold,
            Temperature::Warm => &self.warm,
            Temperature::Hot => &self.hot,
        }
    }

    pub fn group_mut(&mut self, temperature: Temperature) -> &mut Vec<Campaign> {
        match temperature {
            Temperature::Cold => &mut self.cold,
            Temperature::Warm => &mut self.warm,
            Temperature::Hot => &mut self.hot,
        }
    }

    /// Iterate every campaign in cold, warm, hot order with its temperature
    /// and index inside its group.
    pub fn campaigns(&self) -> impl Iterator<Item = (Temperature, usize, &Campaign)> {
        Temperature::ALL.into_iter().flat_map(move |t| {
            self.group(t)
                .iter()
                .enumerate()
                .map(move |(i, c)| (t, i, c))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cold.is_empty() && self.warm.is_empty() && self.hot.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub monthly_budget: f64,
}

// ---------------------------------------------------------------------------
// Budget allocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    #[serde(default)]
    pub total_monthly_budget: f64,
    #[serde(default)]
    pub daily_ceiling: f64,
    /// When set, `daily_ceiling` was chosen by a human and is not rederived.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub daily_ceiling_override: bool,
    #[serde(default)]
    pub platform_breakdown: Vec<PlatformBudget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_phase: Option<TestingPhase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBudget {
    pub platform: String,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub monthly_budget: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestingPhase {
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Campaign phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPhase {
    pub name: String,
    /// Free text such as "4 weeks" or "Days 1-30".
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub budget: f64,
    /// Names of campaigns in `campaignStructure` active during this phase.
    #[serde(default)]
    pub campaigns: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
}

// ---------------------------------------------------------------------------
// KPI targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiTarget {
    pub metric: String,
    /// Stated target, e.g. "$75" or "200 leads".
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub benchmark: String,
    #[serde(default)]
    pub timeframe: String,
}

// ---------------------------------------------------------------------------
// Performance model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceModel {
    #[serde(default)]
    pub cac_model: CacModel,
}

/// Customer-acquisition funnel model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacModel {
    #[serde(rename = "targetCPL", default)]
    pub target_cpl: f64,
    #[serde(rename = "expectedMonthlyLeads", default)]
    pub expected_monthly_leads: u64,
    #[serde(rename = "leadToSqlRate", default)]
    pub lead_to_sql_rate: f64,
    #[serde(rename = "expectedMonthlySQLs", default)]
    pub expected_monthly_sqls: u64,
    #[serde(rename = "sqlToCustomerRate", default)]
    pub sql_to_customer_rate: f64,
    #[serde(rename = "expectedMonthlyCustomers", default)]
    pub expected_monthly_customers: u64,
    /// `None` is the "undefined" sentinel used when no customers are expected.
    #[serde(rename = "targetCAC", default)]
    pub target_cac: Option<f64>,
    #[serde(rename = "estimatedLTV", default)]
    pub estimated_ltv: f64,
    #[serde(rename = "ltvToCacRatio", default)]
    pub ltv_to_cac_ratio: String,
}

// ---------------------------------------------------------------------------
// Risk monitoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskMonitoring {
    #[serde(default)]
    pub risks: Vec<Risk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub description: String,
    #[serde(default)]
    pub mitigation: String,
}
