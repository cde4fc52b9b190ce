//! Timing advice derived from a day plan.
//!
//! Purely advisory: reads the plan and its current conflicts, suggests
//! adjustments, and nominates the best contiguous window of the day. Never
//! mutates the plan.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Activity, ConflictKind, ConflictSeverity, DayPlan, TimeWindow};

/// Gaps shorter than this are too tight to be useful slack.
const MIN_USEFUL_GAP_MINUTES: f64 = 10.0;

/// Gaps longer than this signal a poorly structured day.
const MAX_REASONABLE_GAP_MINUTES: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingAdvice {
    pub suggestions: Vec<String>,
    /// Longest contiguous span of activities with clean transitions.
    pub best_window: Option<TimeWindow>,
}

/// Suggest timing adjustments for a day plan.
pub fn advise(plan: &DayPlan) -> TimingAdvice {
    let activities = plan.activities();
    if activities.is_empty() {
        return TimingAdvice {
            suggestions: vec!["No activities planned yet; add one to get timing advice".to_string()],
            best_window: None,
        };
    }

    let mut order: Vec<usize> = (0..activities.len()).collect();
    order.sort_by_key(|&i| (activities[i].window.start(), i));

    // Conflicted adjacent pairs, keyed the way the detector emits them
    // (earlier start first).
    let conflicted: HashSet<(&str, &str)> = plan
        .conflicts()
        .iter()
        .filter(|c| matches!(c.kind, ConflictKind::Overlap | ConflictKind::TravelInfeasible))
        .filter_map(|c| match c.activity_ids.as_slice() {
            [a, b, ..] => Some((a.as_str(), b.as_str())),
            _ => None,
        })
        .collect();

    let mut suggestions = Vec::new();

    let errors = plan
        .conflicts()
        .iter()
        .filter(|c| c.severity == ConflictSeverity::Error)
        .count();
    let warnings = plan.conflicts().len() - errors;
    if errors > 0 {
        suggestions.push(format!(
            "Resolve {errors} overlapping booking(s) before reordering the day"
        ));
    }
    if warnings > 0 {
        suggestions.push(format!(
            "{warnings} transition(s) have tight travel time; consider adding buffer"
        ));
    }

    // Span accounting: a link between consecutive activities is clean when
    // the pair is conflict-free and the gap is neither degenerate nor idle.
    let mut best: Option<(usize, usize)> = None;
    let mut span_start = 0usize;
    for pos in 0..order.len() {
        let link_ok = pos + 1 < order.len() && {
            let current = &activities[order[pos]];
            let next = &activities[order[pos + 1]];
            let gap = next
                .window
                .start()
                .signed_duration_since(current.window.end())
                .num_seconds() as f64
                / 60.0;

            if gap > 0.0 && gap < MIN_USEFUL_GAP_MINUTES {
                suggestions.push(format!(
                    "Only {gap:.0} min between `{}` and `{}`; consider more buffer",
                    current.title, next.title,
                ));
            }
            if gap > MAX_REASONABLE_GAP_MINUTES {
                suggestions.push(format!(
                    "{:.1} h idle after `{}`; a nearby activity could fill the gap",
                    gap / 60.0,
                    current.title,
                ));
            }

            !conflicted.contains(&(current.id.as_str(), next.id.as_str()))
                && gap >= MIN_USEFUL_GAP_MINUTES
                && gap <= MAX_REASONABLE_GAP_MINUTES
        };

        if !link_ok {
            best = pick_longer(best, (span_start, pos), activities, &order);
            span_start = pos + 1;
        }
    }

    let best_window = best.and_then(|(first, last)| {
        let start = activities[order[first]].window.start();
        let end = activities[order[last]].window.end();
        TimeWindow::new(start, end).ok()
    });

    TimingAdvice {
        suggestions,
        best_window,
    }
}

fn pick_longer(
    best: Option<(usize, usize)>,
    candidate: (usize, usize),
    activities: &[Activity],
    order: &[usize],
) -> Option<(usize, usize)> {
    let span_minutes = |(first, last): (usize, usize)| -> i64 {
        activities[order[last]]
            .window
            .end()
            .signed_duration_since(activities[order[first]].window.start())
            .num_minutes()
    };
    match best {
        // Strict comparison keeps the earliest of equally long spans.
        Some(current) if span_minutes(candidate) > span_minutes(current) => Some(candidate),
        Some(current) => Some(current),
        None => Some(candidate),
    }
}
