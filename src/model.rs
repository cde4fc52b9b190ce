//! Core data model for single-day itinerary planning.
//!
//! Activities and day plans are owned by the caller; everything the planner
//! produces (conflicts, clusters, optimization results) is derived output
//! recomputed from current input state.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::{DetectorConfig, detect_conflicts};

/// Validation failures reported synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("time window ends at {end} but starts at {start}; end must be after start")]
    InvalidTimeWindow { start: NaiveTime, end: NaiveTime },

    #[error("duplicate activity id `{id}` in day plan")]
    DuplicateActivityId { id: String },

    #[error(
        "activity `{id}` lasts {minutes} minutes; allowed range is {min}..={max} minutes"
    )]
    DurationOutOfBounds {
        id: String,
        minutes: i64,
        min: i64,
        max: i64,
    },
}

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A half-open slot in the day.
///
/// Fields are private so an inverted window cannot be constructed; duration
/// is always derived from the endpoints, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, PlanError> {
        if end <= start {
            return Err(PlanError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Replace the start instant, re-validating the window.
    pub fn with_start(self, start: NaiveTime) -> Result<Self, PlanError> {
        Self::new(start, self.end)
    }

    /// Replace the end instant, re-validating the window.
    pub fn with_end(self, end: NaiveTime) -> Result<Self, PlanError> {
        Self::new(self.start, end)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Category tag for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sightseeing,
    Dining,
    Transport,
    Lodging,
    Entertainment,
    Shopping,
}

/// A single planned stop in the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique within one day plan.
    pub id: String,
    pub title: String,
    pub location: Coordinate,
    pub window: TimeWindow,
    pub category: ActivityCategory,
    #[serde(default)]
    pub cost: Option<f64>,
    /// Externally fixed time commitment (e.g. a paid booking). The optimizer
    /// never moves anchored activities relative to each other.
    #[serde(default)]
    pub anchored: bool,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        location: Coordinate,
        window: TimeWindow,
        category: ActivityCategory,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            location,
            window,
            category,
            cost: None,
            anchored: false,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }
}

/// One day's ordered activity sequence plus its current conflicts.
///
/// Conflicts are a pure function of the activity list: every structural
/// mutation re-runs the detector, so a plan can never carry stale conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    activities: Vec<Activity>,
    conflicts: Vec<Conflict>,
}

impl DayPlan {
    pub fn new(
        date: NaiveDate,
        activities: Vec<Activity>,
        config: &DetectorConfig,
    ) -> Result<Self, PlanError> {
        let conflicts = detect_conflicts(&activities, config)?;
        Ok(Self {
            date,
            activities,
            conflicts,
        })
    }

    /// Planned execution order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Conflicts for the current ordering.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Insert at a position in the execution order (clamped to the end).
    pub fn insert_activity(
        &mut self,
        index: usize,
        activity: Activity,
        config: &DetectorConfig,
    ) -> Result<(), PlanError> {
        let index = index.min(self.activities.len());
        let mut candidate = self.activities.clone();
        candidate.insert(index, activity);
        // Validate on the candidate so a rejected insert leaves the plan untouched.
        self.conflicts = detect_conflicts(&candidate, config)?;
        self.activities = candidate;
        Ok(())
    }

    /// Remove by id; returns the removed activity if present.
    pub fn remove_activity(
        &mut self,
        id: &str,
        config: &DetectorConfig,
    ) -> Result<Option<Activity>, PlanError> {
        let Some(position) = self.activities.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        let removed = self.activities.remove(position);
        self.conflicts = detect_conflicts(&self.activities, config)?;
        Ok(Some(removed))
    }

    /// Replace the whole ordering, e.g. when applying an optimizer result.
    pub fn replace_activities(
        &mut self,
        activities: Vec<Activity>,
        config: &DetectorConfig,
    ) -> Result<(), PlanError> {
        self.conflicts = detect_conflicts(&activities, config)?;
        self.activities = activities;
        Ok(())
    }
}

/// Scheduling problem kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two activities' time windows intersect.
    Overlap,
    /// The gap between two activities is shorter than the travel they need.
    TravelInfeasible,
    /// Reserved; not emitted by the current detector.
    LocationConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Tight but possibly workable.
    Warning,
    /// Definite violation.
    Error,
}

/// A detected scheduling problem between two or more activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub activity_ids: Vec<String>,
    pub message: String,
    pub severity: ConflictSeverity,
}
