//! Validators that repair or flag inconsistencies in a media plan.
//!
//! Each validator is a pure function from the sections it reads to the
//! sections it rewrites plus a [`ValidatorReport`]. Ordering and dispatch
//! live in [`crate::cascade`].

pub mod budget;
pub mod cac;
pub mod cross_section;
pub mod kpi;
pub mod numbers;
pub mod phase_budget;
pub mod resolver;
pub mod stale_refs;
pub mod text;
pub mod timeline;
pub mod types;
pub mod within_platform;

pub use budget::{effective_budget, validate_and_fix_budget};
pub use cac::{CacComputation, CacInputs, compute_cac_model, reconcile_cac_model};
pub use cross_section::validate_cross_section;
pub use kpi::{DerivedMetric, reconcile_kpi_targets};
pub use phase_budget::validate_phase_budgets;
pub use resolver::affected_validators;
pub use stale_refs::sweep_stale_references;
pub use timeline::reconcile_timeline;
pub use types::{ValidationAutoFix, ValidatorCategory, ValidatorCategoryParseError, ValidatorReport};
pub use within_platform::validate_within_platform_budgets;
