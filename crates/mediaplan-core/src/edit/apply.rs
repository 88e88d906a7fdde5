//! Apply a single field edit to a plan, producing a new snapshot.
//!
//! The target section is converted to JSON, the parsed [`FieldPath`] is
//! walked to the addressed value, the new value is written, and the section
//! is deserialized back into its typed form. A value that does not fit the
//! section's schema is rejected here, before any cascade runs.

use serde_json::Value;
use thiserror::Error;

use crate::plan::section::{default_section_value, section_to_value, with_section_value};
use crate::plan::{MediaPlan, PlanLoadError, SectionName, validate_structure};

use super::path::{FieldPath, FieldPathError, PathSegment};

/// Errors that reject an edit. The input plan is never modified.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("unknown plan section {0:?}")]
    UnknownSection(String),

    #[error(transparent)]
    Path(#[from] FieldPathError),

    #[error("{field} is an array and cannot be replaced with a {found}; {guidance}")]
    ArrayReplacement {
        field: String,
        found: &'static str,
        guidance: String,
    },

    #[error("index {index} is out of bounds for {field} (length {len})")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("cannot address {segment} inside {field}: value is a {found}")]
    NotAContainer {
        field: String,
        segment: String,
        found: &'static str,
    },

    #[error("unknown field {key:?} in {field}")]
    UnknownField { field: String, key: String },

    #[error("edited {section} does not match its schema: {source}")]
    TypeMismatch {
        section: SectionName,
        #[source]
        source: serde_json::Error,
    },

    #[error("edited plan is structurally invalid: {0}")]
    Invalid(#[from] PlanLoadError),

    #[error("failed to serialize {section}: {source}")]
    Serialization {
        section: SectionName,
        #[source]
        source: serde_json::Error,
    },
}

/// The result of a successful edit.
#[derive(Debug, Clone)]
pub struct AppliedEdit {
    /// New plan snapshot with the edit applied.
    pub plan: MediaPlan,
    /// The section that was edited.
    pub section: SectionName,
    /// The parsed path, relative to the section.
    pub path: FieldPath,
    /// Value previously at the path (`null` if it did not exist).
    pub old_value: Value,
}

/// Apply `new_value` at `field_path` inside `section` of `plan`.
///
/// `field_path` is relative to the section (`cacModel.targetCPL` inside
/// `performanceModel`); a redundant leading section name is accepted. The
/// empty path replaces the whole section.
pub fn apply_edit(
    plan: &MediaPlan,
    section: &str,
    field_path: &str,
    new_value: Value,
) -> Result<AppliedEdit, EditError> {
    let section: SectionName = section
        .parse()
        .map_err(|_| EditError::UnknownSection(section.to_owned()))?;
    let path = FieldPath::parse(field_path)?;

    let mut root = section_to_value(plan, section)
        .map_err(|source| EditError::Serialization { section, source })?;
    let section_absent = root.is_null();
    if section_absent && !path.is_empty() {
        root = default_section_value(section)
            .map_err(|source| EditError::Serialization { section, source })?;
    }

    let path = strip_section_prefix(&root, section, path);
    let field = display_field(section, &path);

    let slot = resolve_slot(&mut root, &path, section)?;
    let old_value = if section_absent {
        Value::Null
    } else {
        slot.clone()
    };

    if old_value.is_array() && !new_value.is_array() {
        return Err(EditError::ArrayReplacement {
            guidance: array_guidance(&field),
            field,
            found: json_kind(&new_value),
        });
    }
    // `null` and `false` are what optional and flag fields serialize away,
    // so their absence after the round trip says nothing about the key.
    let omittable = matches!(new_value, Value::Null | Value::Bool(false));
    *slot = new_value;

    let next = with_section_value(plan, section, root)
        .map_err(|source| EditError::TypeMismatch { section, source })?;
    if !omittable {
        let written = section_to_value(&next, section)
            .map_err(|source| EditError::Serialization { section, source })?;
        if let Some(key) = dropped_key(&written, &path) {
            return Err(EditError::UnknownField { field, key });
        }
    }
    validate_structure(&next)?;

    tracing::debug!(section = %section, field = %field, "applied plan edit");

    Ok(AppliedEdit {
        plan: next,
        section,
        path,
        old_value,
    })
}

/// Drop a leading key equal to the section name when the section itself has
/// no such field, so `budgetAllocation.totalMonthlyBudget` works as a path
/// inside `budgetAllocation`.
fn strip_section_prefix(root: &Value, section: SectionName, path: FieldPath) -> FieldPath {
    match path.first_key() {
        Some(key) if key == section.as_str() && root.get(key).is_none() => path.without_first(),
        _ => path,
    }
}

/// Walk `path` from `root`, creating missing object keys, and return the
/// addressed slot.
fn resolve_slot<'a>(
    root: &'a mut Value,
    path: &FieldPath,
    section: SectionName,
) -> Result<&'a mut Value, EditError> {
    let mut current = root;
    let mut walked = section.as_str().to_owned();

    for segment in path.segments() {
        match segment {
            PathSegment::Key(name) => {
                if current.is_null() {
                    *current = Value::Object(serde_json::Map::new());
                }
                let found = json_kind(current);
                let Value::Object(map) = current else {
                    return Err(EditError::NotAContainer {
                        field: walked,
                        segment: segment.to_string(),
                        found,
                    });
                };
                current = map.entry(name.clone()).or_insert(Value::Null);
            }
            PathSegment::Index(index) => {
                let found = json_kind(current);
                let Value::Array(items) = current else {
                    return Err(EditError::NotAContainer {
                        field: walked,
                        segment: segment.to_string(),
                        found,
                    });
                };
                let len = items.len();
                current = items.get_mut(*index).ok_or(EditError::IndexOutOfBounds {
                    field: walked.clone(),
                    index: *index,
                    len,
                })?;
            }
        }
        if matches!(segment, PathSegment::Key(_)) {
            walked.push('.');
        }
        walked.push_str(&segment.to_string());
    }
    Ok(current)
}

/// First key along `path` that the typed section did not keep. Keys the
/// schema does not know are silently dropped on deserialization.
fn dropped_key(value: &Value, path: &FieldPath) -> Option<String> {
    let mut current = value;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(name), Value::Object(map)) => match map.get(name) {
                Some(next) => next,
                None => return Some(name.clone()),
            },
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    None
}

fn display_field(section: SectionName, path: &FieldPath) -> String {
    if path.is_empty() {
        section.as_str().to_owned()
    } else if matches!(path.segments().first(), Some(PathSegment::Index(_))) {
        format!("{section}{path}")
    } else {
        format!("{section}.{path}")
    }
}

fn array_guidance(field: &str) -> String {
    format!(
        "edit a single element with a path like `{field}[0].<field>`, \
         or pass a JSON array to replace the whole list"
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::plan::{BudgetAllocation, CacModel, PerformanceModel, PlatformBudget};

    fn plan() -> MediaPlan {
        MediaPlan {
            budget_allocation: Some(BudgetAllocation {
                total_monthly_budget: 10_000.0,
                daily_ceiling: 333.0,
                platform_breakdown: vec![
                    PlatformBudget {
                        platform: "Google Ads".into(),
                        percentage: 60.0,
                        monthly_budget: 6_000.0,
                    },
                    PlatformBudget {
                        platform: "Meta".into(),
                        percentage: 40.0,
                        monthly_budget: 4_000.0,
                    },
                ],
                ..BudgetAllocation::default()
            }),
            performance_model: Some(PerformanceModel {
                cac_model: CacModel {
                    target_cpl: 50.0,
                    ..CacModel::default()
                },
            }),
            ..MediaPlan::default()
        }
    }

    #[test]
    fn edits_scalar_field_and_returns_old_value() {
        let original = plan();
        let edit =
            apply_edit(&original, "budgetAllocation", "totalMonthlyBudget", json!(15000)).unwrap();

        assert_eq!(edit.old_value, json!(10000.0));
        assert_eq!(
            edit.plan.budget_allocation.as_ref().unwrap().total_monthly_budget,
            15_000.0
        );
        // The input snapshot is untouched.
        assert_eq!(
            original.budget_allocation.unwrap().total_monthly_budget,
            10_000.0
        );
    }

    #[test]
    fn edits_nested_array_element() {
        let edit = apply_edit(
            &plan(),
            "budgetAllocation",
            "platformBreakdown[1].percentage",
            json!(55),
        )
        .unwrap();
        let breakdown = &edit.plan.budget_allocation.unwrap().platform_breakdown;
        assert_eq!(breakdown[1].percentage, 55.0);
        assert_eq!(edit.old_value, json!(40.0));
    }

    #[test]
    fn edits_cac_model_through_original_field_name() {
        let edit =
            apply_edit(&plan(), "performanceModel", "cacModel.targetCPL", json!(80)).unwrap();
        assert_eq!(
            edit.plan.performance_model.unwrap().cac_model.target_cpl,
            80.0
        );
    }

    #[test]
    fn accepts_redundant_section_prefix() {
        let edit = apply_edit(
            &plan(),
            "budgetAllocation",
            "budgetAllocation.totalMonthlyBudget",
            json!(12000),
        )
        .unwrap();
        assert_eq!(
            edit.plan.budget_allocation.unwrap().total_monthly_budget,
            12_000.0
        );
        assert_eq!(edit.path.to_string(), "totalMonthlyBudget");
    }

    #[test]
    fn rejects_replacing_array_with_scalar() {
        let err = apply_edit(&plan(), "budgetAllocation", "platformBreakdown", json!(100))
            .unwrap_err();
        match err {
            EditError::ArrayReplacement { field, guidance, .. } => {
                assert_eq!(field, "budgetAllocation.platformBreakdown");
                assert!(guidance.contains("platformBreakdown[0]"), "{guidance}");
            }
            other => panic!("expected ArrayReplacement, got: {other}"),
        }
    }

    #[test]
    fn rejects_replacing_array_section_with_object() {
        let err = apply_edit(&plan(), "kpiTargets", "", json!({"metric": "CPL"})).unwrap_err();
        assert!(matches!(err, EditError::ArrayReplacement { .. }), "{err}");
    }

    #[test]
    fn rejects_type_mismatch() {
        let err = apply_edit(
            &plan(),
            "budgetAllocation",
            "totalMonthlyBudget",
            json!("fifteen thousand"),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::TypeMismatch { .. }), "{err}");
    }

    #[test]
    fn rejects_out_of_bounds_index() {
        let err = apply_edit(
            &plan(),
            "budgetAllocation",
            "platformBreakdown[5].percentage",
            json!(10),
        )
        .unwrap_err();
        assert!(
            matches!(err, EditError::IndexOutOfBounds { index: 5, len: 2, .. }),
            "{err}"
        );
    }

    #[test]
    fn rejects_unknown_section() {
        let err = apply_edit(&plan(), "budget", "total", json!(1)).unwrap_err();
        assert!(matches!(err, EditError::UnknownSection(ref s) if s == "budget"));
    }

    #[test]
    fn rejects_malformed_path() {
        let err = apply_edit(&plan(), "budgetAllocation", "platformBreakdown[", json!(1))
            .unwrap_err();
        assert!(matches!(err, EditError::Path(_)));
    }

    #[test]
    fn rejects_edit_that_duplicates_a_platform() {
        let err = apply_edit(
            &plan(),
            "budgetAllocation",
            "platformBreakdown[1].platform",
            json!("google ads"),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::Invalid(_)), "{err}");
    }

    #[test]
    fn creates_absent_section_on_field_edit() {
        let edit = apply_edit(
            &MediaPlan::default(),
            "executiveSummary",
            "timelineToResults",
            json!("60-90 days"),
        )
        .unwrap();
        assert_eq!(edit.old_value, Value::Null);
        assert_eq!(
            edit.plan.executive_summary.unwrap().timeline_to_results,
            "60-90 days"
        );
    }

    #[test]
    fn rejects_misspelled_field() {
        let err =
            apply_edit(&plan(), "performanceModel", "cacModel.targetCpl", json!(60)).unwrap_err();
        match err {
            EditError::UnknownField { field, key } => {
                assert_eq!(field, "performanceModel.cacModel.targetCpl");
                assert_eq!(key, "targetCpl");
            }
            other => panic!("expected UnknownField, got: {other}"),
        }
    }

    #[test]
    fn rejects_misspelled_field_inside_array_element() {
        let err = apply_edit(
            &plan(),
            "budgetAllocation",
            "platformBreakdown[0].percent",
            json!(70),
        )
        .unwrap_err();
        assert!(
            matches!(err, EditError::UnknownField { ref key, .. } if key == "percent"),
            "{err}"
        );
    }

    #[test]
    fn sets_absent_optional_fields() {
        let edit = apply_edit(
            &plan(),
            "budgetAllocation",
            "testingPhase",
            json!({"durationDays": 14, "budget": 2000, "description": "Creative tests"}),
        )
        .unwrap();
        assert_eq!(edit.old_value, Value::Null);
        let testing = edit.plan.budget_allocation.unwrap().testing_phase.unwrap();
        assert_eq!(testing.budget, 2_000.0);

        let edit = apply_edit(&plan(), "budgetAllocation", "dailyCeilingOverride", json!(false))
            .unwrap();
        assert!(!edit.plan.budget_allocation.unwrap().daily_ceiling_override);
    }

    #[test]
    fn rejects_key_into_scalar() {
        let err = apply_edit(
            &plan(),
            "budgetAllocation",
            "totalMonthlyBudget.amount",
            json!(1),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::NotAContainer { found: "number", .. }), "{err}");
    }
}
