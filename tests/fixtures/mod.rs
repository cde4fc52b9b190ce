//! Shared builders for planner tests.

#![allow(dead_code)]

use chrono::NaiveTime;
use day_planner::model::{Activity, ActivityCategory, Coordinate, TimeWindow};

pub fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn window(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> TimeWindow {
    TimeWindow::new(t(start_h, start_m), t(end_h, end_m)).unwrap()
}

/// Sightseeing activity with the id uppercased as its title.
pub fn activity(id: &str, lat: f64, lng: f64, win: TimeWindow) -> Activity {
    Activity::new(
        id,
        id.to_uppercase(),
        Coordinate::new(lat, lng),
        win,
        ActivityCategory::Sightseeing,
    )
}
