use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{
    BudgetAllocation, CampaignPhase, CampaignStructure, ExecutiveSummary, IcpTargeting, KpiTarget,
    MediaPlan, PerformanceModel, PlatformStrategy, RiskMonitoring,
};

// ---------------------------------------------------------------------------
// SectionName
// ---------------------------------------------------------------------------

/// A named, independently addressable sub-document of a [`MediaPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionName {
    ExecutiveSummary,
    PlatformStrategy,
    IcpTargeting,
    CampaignStructure,
    BudgetAllocation,
    CampaignPhases,
    KpiTargets,
    PerformanceModel,
    RiskMonitoring,
}

impl SectionName {
    pub const ALL: [SectionName; 9] = [
        Self::ExecutiveSummary,
        Self::PlatformStrategy,
        Self::IcpTargeting,
        Self::CampaignStructure,
        Self::BudgetAllocation,
        Self::CampaignPhases,
        Self::KpiTargets,
        Self::PerformanceModel,
        Self::RiskMonitoring,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executiveSummary",
            Self::PlatformStrategy => "platformStrategy",
            Self::IcpTargeting => "icpTargeting",
            Self::CampaignStructure => "campaignStructure",
            Self::BudgetAllocation => "budgetAllocation",
            Self::CampaignPhases => "campaignPhases",
            Self::KpiTargets => "kpiTargets",
            Self::PerformanceModel => "performanceModel",
            Self::RiskMonitoring => "riskMonitoring",
        }
    }

    /// Whether the section is a JSON array rather than an object.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::PlatformStrategy | Self::CampaignPhases | Self::KpiTargets
        )
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionName {
    type Err = SectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| SectionParseError(s.to_owned()))
    }
}

/// Error returned when parsing an unknown [`SectionName`].
#[derive(Debug, Clone)]
pub struct SectionParseError(pub String);

impl fmt::Display for SectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown plan section: {:?}", self.0)
    }
}

impl std::error::Error for SectionParseError {}

// ---------------------------------------------------------------------------
// JSON views of a single section
// ---------------------------------------------------------------------------

/// Serialize one section of `plan` to JSON.
///
/// Absent optional sections serialize as `null`.
pub fn section_to_value(plan: &MediaPlan, section: SectionName) -> serde_json::Result<Value> {
    match section {
        SectionName::ExecutiveSummary => serde_json::to_value(&plan.executive_summary),
        SectionName::PlatformStrategy => serde_json::to_value(&plan.platform_strategy),
        SectionName::IcpTargeting => serde_json::to_value(&plan.icp_targeting),
        SectionName::CampaignStructure => serde_json::to_value(&plan.campaign_structure),
        SectionName::BudgetAllocation => serde_json::to_value(&plan.budget_allocation),
        SectionName::CampaignPhases => serde_json::to_value(&plan.campaign_phases),
        SectionName::KpiTargets => serde_json::to_value(&plan.kpi_targets),
        SectionName::PerformanceModel => serde_json::to_value(&plan.performance_model),
        SectionName::RiskMonitoring => serde_json::to_value(&plan.risk_monitoring),
    }
}

/// JSON of an empty instance of `section`, used when editing a field of a
/// section the plan does not have yet.
pub fn default_section_value(section: SectionName) -> serde_json::Result<Value> {
    match section {
        SectionName::ExecutiveSummary => serde_json::to_value(ExecutiveSummary::default()),
        SectionName::IcpTargeting => serde_json::to_value(IcpTargeting::default()),
        SectionName::CampaignStructure => serde_json::to_value(CampaignStructure::default()),
        SectionName::BudgetAllocation => serde_json::to_value(BudgetAllocation::default()),
        SectionName::PerformanceModel => serde_json::to_value(PerformanceModel::default()),
        SectionName::RiskMonitoring => serde_json::to_value(RiskMonitoring::default()),
        SectionName::PlatformStrategy | SectionName::CampaignPhases | SectionName::KpiTargets => {
            Ok(Value::Array(Vec::new()))
        }
    }
}

/// Return a copy of `plan` with `section` replaced by the typed
/// deserialization of `value`.
///
/// Fails if `value` does not have the shape of the section.
pub fn with_section_value(
    plan: &MediaPlan,
    section: SectionName,
    value: Value,
) -> serde_json::Result<MediaPlan> {
    let mut next = plan.clone();
    match section {
        SectionName::ExecutiveSummary => {
            next.executive_summary = serde_json::from_value::<Option<ExecutiveSummary>>(value)?;
        }
        SectionName::PlatformStrategy => {
            next.platform_strategy = serde_json::from_value::<Vec<PlatformStrategy>>(value)?;
        }
        SectionName::IcpTargeting => {
            next.icp_targeting = serde_json::from_value::<Option<IcpTargeting>>(value)?;
        }
        SectionName::CampaignStructure => {
            next.campaign_structure = serde_json::from_value::<Option<CampaignStructure>>(value)?;
        }
        SectionName::BudgetAllocation => {
            next.budget_allocation = serde_json::from_value::<Option<BudgetAllocation>>(value)?;
        }
        SectionName::CampaignPhases => {
            next.campaign_phases = serde_json::from_value::<Vec<CampaignPhase>>(value)?;
        }
        SectionName::KpiTargets => {
            next.kpi_targets = serde_json::from_value::<Vec<KpiTarget>>(value)?;
        }
        SectionName::PerformanceModel => {
            next.performance_model = serde_json::from_value::<Option<PerformanceModel>>(value)?;
        }
        SectionName::RiskMonitoring => {
            next.risk_monitoring = serde_json::from_value::<Option<RiskMonitoring>>(value)?;
        }
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// Partial plan (changed sections only)
// ---------------------------------------------------------------------------

/// The subset of sections that a cascade actually changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaPlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<ExecutiveSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_strategy: Option<Vec<PlatformStrategy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icp_targeting: Option<IcpTargeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_structure: Option<CampaignStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<BudgetAllocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_phases: Option<Vec<CampaignPhase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_targets: Option<Vec<KpiTarget>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_model: Option<PerformanceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_monitoring: Option<RiskMonitoring>,
}

impl MediaPlanPatch {
    /// Collect every section of `after` that differs from `before`.
    ///
    /// Validators never delete sections, so a changed optional section is
    /// always present in `after`.
    pub fn diff(before: &MediaPlan, after: &MediaPlan) -> Self {
        fn changed<T: Clone + PartialEq>(a: &T, b: &T) -> Option<T> {
            (a != b).then(|| b.clone())
        }

        Self {
            executive_summary: changed(&before.executive_summary, &after.executive_summary)
                .flatten(),
            platform_strategy: changed(&before.platform_strategy, &after.platform_strategy),
            icp_targeting: changed(&before.icp_targeting, &after.icp_targeting).flatten(),
            campaign_structure: changed(&before.campaign_structure, &after.campaign_structure)
                .flatten(),
            budget_allocation: changed(&before.budget_allocation, &after.budget_allocation)
                .flatten(),
            campaign_phases: changed(&before.campaign_phases, &after.campaign_phases),
            kpi_targets: changed(&before.kpi_targets, &after.kpi_targets),
            performance_model: changed(&before.performance_model, &after.performance_model)
                .flatten(),
            risk_monitoring: changed(&before.risk_monitoring, &after.risk_monitoring).flatten(),
        }
    }

    /// Names of the sections carried by this patch, in document order.
    pub fn sections(&self) -> Vec<SectionName> {
        let present = [
            (SectionName::ExecutiveSummary, self.executive_summary.is_some()),
            (SectionName::PlatformStrategy, self.platform_strategy.is_some()),
            (SectionName::IcpTargeting, self.icp_targeting.is_some()),
            (SectionName::CampaignStructure, self.campaign_structure.is_some()),
            (SectionName::BudgetAllocation, self.budget_allocation.is_some()),
            (SectionName::CampaignPhases, self.campaign_phases.is_some()),
            (SectionName::KpiTargets, self.kpi_targets.is_some()),
            (SectionName::PerformanceModel, self.performance_model.is_some()),
            (SectionName::RiskMonitoring, self.risk_monitoring.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(name, is_present)| is_present.then_some(name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_roundtrip_through_strings() {
        for section in SectionName::ALL {
            let parsed: SectionName = section.as_str().parse().expect("should parse");
            assert_eq!(parsed, section);
        }
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = "budget".parse::<SectionName>().unwrap_err();
        assert_eq!(err.to_string(), "unknown plan section: \"budget\"");
    }

    #[test]
    fn absent_section_serializes_as_null() {
        let plan = MediaPlan::default();
        let value = section_to_value(&plan, SectionName::BudgetAllocation).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn with_section_value_rejects_wrong_shape() {
        let plan = MediaPlan::default();
        let result = with_section_value(
            &plan,
            SectionName::KpiTargets,
            serde_json::json!({"metric": "CPL"}),
        );
        assert!(result.is_err(), "an object is not a KPI list");
    }

    #[test]
    fn diff_reports_only_changed_sections() {
        let before = MediaPlan {
            budget_allocation: Some(BudgetAllocation {
                total_monthly_budget: 10_000.0,
                ..BudgetAllocation::default()
            }),
            ..MediaPlan::default()
        };
        let mut after = before.clone();
        after
            .budget_allocation
            .as_mut()
            .unwrap()
            .total_monthly_budget = 12_000.0;

        let patch = MediaPlanPatch::diff(&before, &after);
        assert_eq!(patch.sections(), vec![SectionName::BudgetAllocation]);
        assert!(MediaPlanPatch::diff(&after, &after).is_empty());
    }
}
