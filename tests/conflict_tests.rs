//! Conflict detector tests
//!
//! Overlap and travel-infeasibility detection, validation errors, and the
//! day-plan recompute invariant.

mod fixtures;

use chrono::NaiveDate;
use day_planner::conflict::{DetectorConfig, detect_conflicts};
use day_planner::model::{ConflictKind, ConflictSeverity, DayPlan, PlanError};
use fixtures::{activity, window};

fn config() -> DetectorConfig {
    DetectorConfig::default()
}

// ============================================================================
// Overlap Detection
// ============================================================================

#[test]
fn test_overlapping_bookings_flagged() {
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 11, 0)),
        activity("b", 36.20, -115.20, window(10, 30, 12, 0)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();

    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::Overlap);
    assert_eq!(conflict.severity, ConflictSeverity::Error);
    assert_eq!(conflict.activity_ids, vec!["a".to_string(), "b".to_string()]);
    assert!(conflict.message.contains('A') && conflict.message.contains('B'));
}

#[test]
fn test_overlap_chain_reported_once_per_pair() {
    // a overlaps b, b overlaps c, but a and c are disjoint
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 10, 30)),
        activity("b", 36.10, -115.10, window(10, 0, 11, 30)),
        activity("c", 36.10, -115.10, window(11, 0, 12, 30)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();

    let overlaps: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Overlap)
        .collect();
    assert_eq!(overlaps.len(), 2);
    assert_eq!(overlaps[0].activity_ids, vec!["a", "b"]);
    assert_eq!(overlaps[1].activity_ids, vec!["b", "c"]);
}

#[test]
fn test_containing_activity_overlaps_every_contained_one() {
    // b and c are disjoint but both sit inside a's window; a must be
    // reported against each of them
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 12, 0)),
        activity("b", 36.10, -115.10, window(9, 30, 10, 0)),
        activity("c", 36.10, -115.10, window(10, 30, 11, 0)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();

    let overlaps: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Overlap)
        .map(|c| c.activity_ids.clone())
        .collect();
    assert_eq!(overlaps, vec![vec!["a", "b"], vec!["a", "c"]]);
}

#[test]
fn test_shared_endpoint_is_not_overlap() {
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 10, 0)),
        activity("b", 36.10, -115.10, window(10, 0, 11, 0)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();
    assert!(conflicts.iter().all(|c| c.kind != ConflictKind::Overlap));
}

// ============================================================================
// Travel Feasibility
// ============================================================================

#[test]
fn test_tight_travel_flagged_with_minutes() {
    // ~55 km apart with a 5 minute gap; driving at 25 km/h needs ~133 min
    let activities = vec![
        activity("a", 0.0, 0.0, window(8, 0, 9, 0)),
        activity("b", 0.0, 0.5, window(9, 5, 10, 5)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();

    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::TravelInfeasible);
    assert_eq!(conflict.severity, ConflictSeverity::Warning);
    assert_eq!(conflict.activity_ids, vec!["a", "b"]);
    assert!(conflict.message.contains("133"), "required minutes missing: {}", conflict.message);
    assert!(conflict.message.contains("5 min"), "available minutes missing: {}", conflict.message);
}

#[test]
fn test_generous_gap_is_clean() {
    // Same two points but three hours apart
    let activities = vec![
        activity("a", 0.0, 0.0, window(8, 0, 9, 0)),
        activity("b", 0.0, 0.5, window(12, 0, 13, 0)),
    ];

    let conflicts = detect_conflicts(&activities, &config()).unwrap();
    assert!(conflicts.is_empty());
}

#[test]
fn test_walking_mode_stricter_than_driving() {
    // ~5.5 km with a 30 minute gap: fine by car, not on foot
    let activities = vec![
        activity("a", 0.0, 0.0, window(9, 0, 10, 0)),
        activity("b", 0.0, 0.05, window(10, 30, 11, 30)),
    ];

    let driving = detect_conflicts(&activities, &config()).unwrap();
    assert!(driving.is_empty());

    let walking = DetectorConfig {
        mode: day_planner::geo::TravelMode::Walking,
        ..DetectorConfig::default()
    };
    let conflicts = detect_conflicts(&activities, &walking).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::TravelInfeasible);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_runs_identical() {
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 11, 0)),
        activity("b", 36.50, -115.50, window(10, 30, 12, 0)),
        activity("c", 36.90, -115.90, window(12, 5, 13, 0)),
    ];

    let first = detect_conflicts(&activities, &config()).unwrap();
    let second = detect_conflicts(&activities, &config()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_input_order_does_not_matter() {
    let forward = vec![
        activity("a", 36.10, -115.10, window(9, 0, 11, 0)),
        activity("b", 36.50, -115.50, window(10, 30, 12, 0)),
        activity("c", 36.90, -115.90, window(12, 5, 13, 0)),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    assert_eq!(
        detect_conflicts(&forward, &config()).unwrap(),
        detect_conflicts(&reversed, &config()).unwrap(),
    );
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_duplicate_id_rejected() {
    let activities = vec![
        activity("a", 36.10, -115.10, window(9, 0, 10, 0)),
        activity("a", 36.20, -115.20, window(11, 0, 12, 0)),
    ];

    let err = detect_conflicts(&activities, &config()).unwrap_err();
    assert_eq!(err, PlanError::DuplicateActivityId { id: "a".to_string() });
}

#[test]
fn test_too_short_activity_rejected() {
    let activities = vec![activity("a", 36.10, -115.10, window(9, 0, 9, 10))];

    let err = detect_conflicts(&activities, &config()).unwrap_err();
    assert!(matches!(err, PlanError::DurationOutOfBounds { ref id, minutes: 10, .. } if id == "a"));
}

#[test]
fn test_too_long_activity_rejected() {
    let activities = vec![activity("a", 36.10, -115.10, window(8, 0, 21, 0))];

    let err = detect_conflicts(&activities, &config()).unwrap_err();
    assert!(matches!(err, PlanError::DurationOutOfBounds { minutes: 780, .. }));
}

// ============================================================================
// Trivial Inputs
// ============================================================================

#[test]
fn test_empty_and_single_are_clean() {
    assert!(detect_conflicts(&[], &config()).unwrap().is_empty());

    let single = vec![activity("a", 36.10, -115.10, window(9, 0, 10, 0))];
    assert!(detect_conflicts(&single, &config()).unwrap().is_empty());
}

// ============================================================================
// DayPlan Recompute Invariant
// ============================================================================

#[test]
fn test_day_plan_recomputes_on_edit() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
    let mut plan = DayPlan::new(
        date,
        vec![activity("a", 36.10, -115.10, window(9, 0, 10, 0))],
        &config(),
    )
    .unwrap();
    assert!(plan.conflicts().is_empty());

    plan.insert_activity(
        1,
        activity("b", 36.10, -115.10, window(9, 30, 10, 30)),
        &config(),
    )
    .unwrap();
    assert_eq!(plan.conflicts().len(), 1);
    assert_eq!(plan.conflicts()[0].kind, ConflictKind::Overlap);

    let removed = plan.remove_activity("b", &config()).unwrap();
    assert!(removed.is_some());
    assert!(plan.conflicts().is_empty());
}

#[test]
fn test_replace_activities_recomputes() {
    // Applying an optimizer result swaps the whole ordering in one step;
    // conflicts must track the new list
    let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
    let mut plan = DayPlan::new(
        date,
        vec![
            activity("a", 36.10, -115.10, window(9, 0, 10, 0)),
            activity("b", 36.10, -115.10, window(11, 0, 12, 0)),
        ],
        &config(),
    )
    .unwrap();
    assert!(plan.conflicts().is_empty());

    plan.replace_activities(
        vec![
            activity("a", 36.10, -115.10, window(9, 0, 10, 0)),
            activity("b", 36.10, -115.10, window(9, 30, 10, 30)),
        ],
        &config(),
    )
    .unwrap();
    assert_eq!(plan.conflicts().len(), 1);
    assert_eq!(plan.conflicts()[0].kind, ConflictKind::Overlap);

    // An invalid replacement is rejected wholesale
    let err = plan
        .replace_activities(
            vec![activity("a", 36.10, -115.10, window(9, 0, 9, 5))],
            &config(),
        )
        .unwrap_err();
    assert!(matches!(err, PlanError::DurationOutOfBounds { .. }));
    assert_eq!(plan.activities().len(), 2);
}

#[test]
fn test_rejected_insert_leaves_plan_untouched() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
    let mut plan = DayPlan::new(
        date,
        vec![activity("a", 36.10, -115.10, window(9, 0, 10, 0))],
        &config(),
    )
    .unwrap();

    // Duplicate id is a validation error, not a conflict
    let err = plan
        .insert_activity(1, activity("a", 36.20, -115.20, window(11, 0, 12, 0)), &config())
        .unwrap_err();
    assert!(matches!(err, PlanError::DuplicateActivityId { .. }));
    assert_eq!(plan.activities().len(), 1);
    assert!(plan.conflicts().is_empty());
}
