//! Timeline reconciler. Warns only; prose timelines are never rewritten.

use crate::plan::{CampaignPhase, ExecutiveSummary};

use super::text::parse_duration;
use super::types::ValidatorReport;

/// How far the summed phase durations may fall outside the stated range.
pub const TIMELINE_TOLERANCE: f64 = 0.25;

/// Compare the summed phase durations with `timelineToResults`.
pub fn reconcile_timeline(summary: &ExecutiveSummary, phases: &[CampaignPhase]) -> ValidatorReport {
    let mut report = ValidatorReport::default();

    let stated = summary.timeline_to_results.trim();
    if stated.is_empty() || phases.is_empty() {
        return report;
    }
    let Some((low, high)) = parse_duration(stated).map(|d| d.range_days()) else {
        report.warn(format!(
            "Timeline to results \"{stated}\" could not be read as a duration."
        ));
        return report;
    };

    let mut total = 0.0;
    for phase in phases {
        match parse_duration(&phase.duration) {
            Some(d) => total += d.length_days(),
            None => {
                report.warn(format!(
                    "Phase \"{}\" duration \"{}\" could not be read; timeline not checked.",
                    phase.name, phase.duration
                ));
                return report;
            }
        }
    }

    let min = low * (1.0 - TIMELINE_TOLERANCE);
    let max = high * (1.0 + TIMELINE_TOLERANCE);
    if total < min || total > max {
        report.warn(format!(
            "Campaign phases last {total:.0} days, but the expected timeline to results is \"{stated}\"."
        ));
    }
    report
}
