//! Heuristic route optimization for a single day's activities.
//!
//! Nearest-neighbor construction per anchor-bounded run, followed by a
//! bounded adjacent-swap improvement pass. The optimizer reorders only the
//! relative sequence of non-anchored activities; timestamps are never
//! touched, so externally communicated appointment times stay valid until
//! the caller explicitly reschedules.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::conflict::{DetectorConfig, validate};
use crate::geo::{TravelMode, distance_km, travel_time_minutes};
use crate::model::{Activity, PlanError};

/// Cap on improvement passes per run; each pass is O(run length).
const MAX_IMPROVEMENT_PASSES: usize = 32;

const EFFICIENCY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub mode: TravelMode,
    /// Rank candidate orderings by travel time rather than raw distance.
    pub prioritize_time: bool,
    /// Reject swaps that would turn a satisfiable adjacent pairing into a
    /// travel-infeasible one.
    pub preserve_time_constraints: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            mode: TravelMode::Driving,
            prioritize_time: true,
            preserve_time_constraints: true,
        }
    }
}

/// Improvement relative to the caller's original ordering. Never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub time_minutes: f64,
    pub distance_km: f64,
    /// Monetary savings; populated in enhanced mode only.
    pub cost: Option<f64>,
}

/// Outcome of one optimizer invocation. Produced fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptimizationResult {
    /// Candidate ordering; apply or discard, then re-run conflict detection.
    pub activities: Vec<Activity>,
    pub total_travel_time_minutes: f64,
    pub total_distance_km: f64,
    /// 0-100; how close the input ordering already was to the best found.
    pub efficiency_score: f64,
    pub suggestions: Vec<String>,
    pub savings: Savings,
}

/// Compute an improved ordering for a day's activities.
///
/// Activities flagged `anchored` keep their absolute positions; only runs of
/// consecutive non-anchored activities between anchors (or at the day's
/// edges) are reordered. If no better ordering is found for a run, its
/// original order is kept, so the result is never worse than the input.
pub fn optimize(
    activities: &[Activity],
    options: &OptimizeOptions,
) -> Result<RouteOptimizationResult, PlanError> {
    let detector = DetectorConfig {
        mode: options.mode,
        ..DetectorConfig::default()
    };
    validate(activities, &detector)?;

    if activities.len() <= 1 {
        return Ok(trivial_result(activities));
    }

    let baseline_minutes = total_travel_minutes(activities, options.mode);
    let baseline_km = total_distance_km(activities);

    let order = optimize_order(activities, options);
    let optimized: Vec<Activity> = order.iter().map(|&i| activities[i].clone()).collect();

    let optimized_minutes = total_travel_minutes(&optimized, options.mode);
    let optimized_km = total_distance_km(&optimized);

    let savings = Savings {
        time_minutes: (baseline_minutes - optimized_minutes).max(0.0),
        distance_km: (baseline_km - optimized_km).max(0.0),
        cost: None,
    };

    let efficiency_score = if baseline_minutes <= EFFICIENCY_EPSILON
        || optimized_minutes >= baseline_minutes
    {
        100.0
    } else {
        (100.0 * optimized_minutes / baseline_minutes).clamp(0.0, 100.0)
    };

    let suggestions = build_suggestions(activities, &savings);

    debug!(
        activities = activities.len(),
        baseline_minutes,
        optimized_minutes,
        efficiency_score,
        "route optimization complete"
    );

    Ok(RouteOptimizationResult {
        activities: optimized,
        total_travel_time_minutes: optimized_minutes,
        total_distance_km: optimized_km,
        efficiency_score,
        suggestions,
        savings,
    })
}

fn trivial_result(activities: &[Activity]) -> RouteOptimizationResult {
    RouteOptimizationResult {
        activities: activities.to_vec(),
        total_travel_time_minutes: 0.0,
        total_distance_km: 0.0,
        efficiency_score: 100.0,
        suggestions: Vec::new(),
        savings: Savings {
            time_minutes: 0.0,
            distance_km: 0.0,
            cost: None,
        },
    }
}

fn build_suggestions(activities: &[Activity], savings: &Savings) -> Vec<String> {
    let mut suggestions = Vec::new();
    if savings.time_minutes >= 1.0 {
        suggestions.push(format!(
            "Reordering saves about {:.0} min of travel ({:.1} km less)",
            savings.time_minutes, savings.distance_km,
        ));
    } else {
        suggestions.push("Current order is already close to the best found".to_string());
    }

    let anchored = activities.iter().filter(|a| a.anchored).count();
    if anchored > 0 {
        suggestions.push(format!(
            "{anchored} fixed booking(s) kept their scheduled positions"
        ));
    }
    suggestions
}

// ============================================================================
// Ordering construction
// ============================================================================

/// A maximal stretch of non-anchored activities between two anchors (or the
/// plan's edges).
struct Run {
    indices: Vec<usize>,
    entry: Option<usize>,
    exit: Option<usize>,
}

enum Segment {
    Anchor(usize),
    Run(Run),
}

fn partition(activities: &[Activity]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    let mut last_anchor: Option<usize> = None;

    for (i, activity) in activities.iter().enumerate() {
        if activity.anchored {
            if !pending.is_empty() {
                segments.push(Segment::Run(Run {
                    indices: std::mem::take(&mut pending),
                    entry: last_anchor,
                    exit: Some(i),
                }));
            }
            segments.push(Segment::Anchor(i));
            last_anchor = Some(i);
        } else {
            pending.push(i);
        }
    }
    if !pending.is_empty() {
        segments.push(Segment::Run(Run {
            indices: pending,
            entry: last_anchor,
            exit: None,
        }));
    }
    segments
}

fn optimize_order(activities: &[Activity], options: &OptimizeOptions) -> Vec<usize> {
    let mut order = Vec::with_capacity(activities.len());
    for segment in partition(activities) {
        match segment {
            Segment::Anchor(i) => order.push(i),
            Segment::Run(run) => order.extend(optimize_run(activities, &run, options)),
        }
    }
    order
}

fn optimize_run(activities: &[Activity], run: &Run, options: &OptimizeOptions) -> Vec<usize> {
    if run.indices.len() <= 1 {
        return run.indices.clone();
    }

    let leg_cost = |a: usize, b: usize| -> f64 {
        let km = distance_km(activities[a].location, activities[b].location);
        if options.prioritize_time {
            travel_time_minutes(km, options.mode, 1.0)
        } else {
            km
        }
    };

    let run_cost = |seq: &[usize]| -> f64 {
        let mut total = 0.0;
        if let Some(entry) = run.entry {
            total += leg_cost(entry, seq[0]);
        }
        for pair in seq.windows(2) {
            total += leg_cost(pair[0], pair[1]);
        }
        if let Some(exit) = run.exit {
            total += leg_cost(seq[seq.len() - 1], exit);
        }
        total
    };

    let pair_infeasible = |a: usize, b: usize| -> bool {
        let gap_minutes = activities[b]
            .window
            .start()
            .signed_duration_since(activities[a].window.end())
            .num_seconds() as f64
            / 60.0;
        let required = travel_time_minutes(
            distance_km(activities[a].location, activities[b].location),
            options.mode,
            1.0,
        );
        required > gap_minutes
    };

    let infeasible_count = |seq: &[usize]| -> usize {
        let mut count = 0;
        if let Some(entry) = run.entry {
            count += usize::from(pair_infeasible(entry, seq[0]));
        }
        for pair in seq.windows(2) {
            count += usize::from(pair_infeasible(pair[0], pair[1]));
        }
        if let Some(exit) = run.exit {
            count += usize::from(pair_infeasible(seq[seq.len() - 1], exit));
        }
        count
    };

    // Nearest-neighbor construction, seeded at the run's entry point. A run
    // that opens the day has no entry anchor; its first activity stays first
    // and seeds the walk.
    let mut remaining = run.indices.clone();
    let mut candidate = Vec::with_capacity(run.indices.len());
    let mut cursor = match run.entry {
        Some(anchor) => activities[anchor].location,
        None => {
            let first = remaining.remove(0);
            candidate.push(first);
            activities[first].location
        }
    };
    while !remaining.is_empty() {
        let nearest = remaining
            .iter()
            .enumerate()
            .min_by(|&(_, &a), &(_, &b)| {
                distance_km(cursor, activities[a].location)
                    .total_cmp(&distance_km(cursor, activities[b].location))
            })
            .map(|(pos, _)| pos)
            .unwrap_or(0);
        let next = remaining.remove(nearest);
        cursor = activities[next].location;
        candidate.push(next);
    }

    // Bounded local improvement: adjacent swaps kept only when they strictly
    // reduce run cost and do not create a new travel infeasibility.
    let mut cost = run_cost(&candidate);
    let mut infeasible = infeasible_count(&candidate);
    for pass in 0..MAX_IMPROVEMENT_PASSES {
        let mut improved = false;
        for i in 0..candidate.len() - 1 {
            let mut swapped = candidate.clone();
            swapped.swap(i, i + 1);
            let swapped_cost = run_cost(&swapped);
            if swapped_cost >= cost {
                continue;
            }
            if options.preserve_time_constraints {
                let swapped_infeasible = infeasible_count(&swapped);
                if swapped_infeasible > infeasible {
                    continue;
                }
                infeasible = swapped_infeasible;
            }
            candidate = swapped;
            cost = swapped_cost;
            improved = true;
        }
        if !improved {
            trace!(pass, cost, "run improvement converged");
            break;
        }
    }

    // Never return a run ordering worse than the caller's.
    let original_cost = run_cost(&run.indices);
    let acceptable = cost < original_cost
        && (!options.preserve_time_constraints
            || infeasible_count(&candidate) <= infeasible_count(&run.indices));
    if acceptable {
        candidate
    } else {
        run.indices.clone()
    }
}

// ============================================================================
// Metrics
// ============================================================================

pub(crate) fn total_travel_minutes(activities: &[Activity], mode: TravelMode) -> f64 {
    activities
        .windows(2)
        .map(|pair| {
            travel_time_minutes(distance_km(pair[0].location, pair[1].location), mode, 1.0)
        })
        .sum()
}

pub(crate) fn total_distance_km(activities: &[Activity]) -> f64 {
    activities
        .windows(2)
        .map(|pair| distance_km(pair[0].location, pair[1].location))
        .sum()
}
