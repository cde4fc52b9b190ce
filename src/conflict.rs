//! Temporal conflict detection over an ordered activity list.
//!
//! Overlaps and travel-time shortfalls are normal output of a plan a user is
//! still editing, so they surface as [`Conflict`] values with a severity,
//! never as errors. Only caller misuse (bad ids, out-of-bounds durations) is
//! an error.

use std::collections::HashSet;

use tracing::debug;

use crate::geo::{TravelMode, distance_km, travel_time_minutes};
use crate::model::{Activity, Conflict, ConflictKind, ConflictSeverity, PlanError};

/// Detection parameters.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Travel mode assumed between consecutive activities.
    pub mode: TravelMode,
    /// Minimum plausible activity duration in minutes.
    pub min_duration_minutes: i64,
    /// Maximum plausible activity duration in minutes.
    pub max_duration_minutes: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: TravelMode::Driving,
            min_duration_minutes: 15,
            max_duration_minutes: 12 * 60,
        }
    }
}

/// Detect overlaps and travel infeasibilities.
///
/// Works on a start-sorted index copy (ties broken by input position), so
/// repeated calls on the same input yield identical conflict lists
/// regardless of the caller's ordering. The input is never mutated.
///
/// Overlaps come from a sweep that keeps the set of not-yet-ended
/// activities: every truly overlapping pair is reported exactly once,
/// including an activity contained inside a longer one. O(n log n) plus one
/// output entry per overlapping pair; travel checks stay a single adjacent
/// scan.
pub fn detect_conflicts(
    activities: &[Activity],
    config: &DetectorConfig,
) -> Result<Vec<Conflict>, PlanError> {
    validate(activities, config)?;

    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| (activities[i].window.start(), i));

    let mut conflicts = Vec::new();

    let mut active: Vec<usize> = Vec::new();
    for &idx in &order {
        let current = &activities[idx];
        active.retain(|&j| activities[j].window.end() > current.window.start());
        for &j in &active {
            let earlier = &activities[j];
            conflicts.push(Conflict {
                kind: ConflictKind::Overlap,
                activity_ids: vec![earlier.id.clone(), current.id.clone()],
                message: format!(
                    "`{}` ({}-{}) overlaps `{}` ({}-{})",
                    earlier.title,
                    earlier.window.start().format("%H:%M"),
                    earlier.window.end().format("%H:%M"),
                    current.title,
                    current.window.start().format("%H:%M"),
                    current.window.end().format("%H:%M"),
                ),
                severity: ConflictSeverity::Error,
            });
        }
        active.push(idx);
    }

    for pair in order.windows(2) {
        let current = &activities[pair[0]];
        let next = &activities[pair[1]];

        // Overlapping pairs are already covered by the sweep above.
        if current.window.end() > next.window.start() {
            continue;
        }

        let gap_minutes = next
            .window
            .start()
            .signed_duration_since(current.window.end())
            .num_seconds() as f64
            / 60.0;
        let required_minutes = travel_time_minutes(
            distance_km(current.location, next.location),
            config.mode,
            1.0,
        );

        if required_minutes > gap_minutes {
            conflicts.push(Conflict {
                kind: ConflictKind::TravelInfeasible,
                activity_ids: vec![current.id.clone(), next.id.clone()],
                message: format!(
                    "travel from `{}` to `{}` needs ~{:.0} min but only {:.0} min are available",
                    current.title, next.title, required_minutes, gap_minutes,
                ),
                severity: ConflictSeverity::Warning,
            });
        }
    }

    debug!(
        activities = activities.len(),
        conflicts = conflicts.len(),
        "conflict detection complete"
    );

    Ok(conflicts)
}

/// Caller-input validation shared by the detector and the optimizers.
pub(crate) fn validate(activities: &[Activity], config: &DetectorConfig) -> Result<(), PlanError> {
    let mut seen = HashSet::new();
    for activity in activities {
        if !seen.insert(activity.id.as_str()) {
            return Err(PlanError::DuplicateActivityId {
                id: activity.id.clone(),
            });
        }

        let minutes = activity.window.duration_minutes();
        if minutes < config.min_duration_minutes || minutes > config.max_duration_minutes {
            return Err(PlanError::DurationOutOfBounds {
                id: activity.id.clone(),
                minutes,
                min: config.min_duration_minutes,
                max: config.max_duration_minutes,
            });
        }
    }
    Ok(())
}
