//! Validation cascade for media plans.
//!
//! A plan changes through [`edit::apply_edit`]; the sections it touched are
//! mapped to validators by [`validate::affected_validators`], and
//! [`cascade::run_cascade`] repairs or flags whatever the edit made
//! inconsistent.

pub mod cascade;
pub mod config;
pub mod edit;
pub mod plan;
pub mod validate;

pub use cascade::{Cascade, ValidationCascadeResult, run_cascade};
pub use config::{OnboardingConfig, OnboardingFormData};
pub use edit::{AppliedEdit, EditError, apply_edit};
pub use plan::{MediaPlan, MediaPlanPatch, SectionName};
pub use validate::{ValidationAutoFix, ValidatorCategory, affected_validators};
