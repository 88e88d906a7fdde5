//! Media plan document: typed model, section addressing, JSON parsing.

pub mod model;
pub mod parser;
pub mod section;

pub use model::{
    BudgetAllocation, CacModel, Campaign, CampaignPhase, CampaignStructure, ExecutiveSummary,
    IcpTargeting, KpiTarget, MediaPlan, PerformanceModel, PlatformBudget, PlatformStrategy,
    PlatformTargeting, Priority, Risk, RiskMonitoring, Temperature, TestingPhase,
};
pub use parser::{PlanLoadError, normalize_platform, parse_media_plan, validate_structure};
pub use section::{MediaPlanPatch, SectionName, SectionParseError};
