//! Great-circle distance and travel-time estimation.
//!
//! Straight-line (haversine) distance plus a mode-specific average speed.
//! Ignores the road network, which is fine for day-plan sizing; callers
//! needing road-accurate times can pre-adjust via the traffic factor.

use serde::{Deserialize, Serialize};

use crate::model::Coordinate;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// How the traveler moves between activities.
///
/// Speeds are urban averages, not free-flow maximums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    #[default]
    Driving,
    Transit,
}

impl TravelMode {
    /// Assumed average speed in km/h.
    pub fn speed_kmh(self) -> f64 {
        match self {
            TravelMode::Walking => 5.0,
            TravelMode::Driving => 25.0,
            TravelMode::Transit => 20.0,
        }
    }
}

/// Haversine distance between two points in kilometers.
pub fn distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimated travel time in minutes for a distance at the mode's speed.
///
/// `traffic_factor` scales the uncongested time; values below 1.0 are
/// clamped to 1.0 (congestion never makes a trip faster).
pub fn travel_time_minutes(distance_km: f64, mode: TravelMode, traffic_factor: f64) -> f64 {
    let factor = if traffic_factor.is_finite() {
        traffic_factor.max(1.0)
    } else {
        1.0
    };
    distance_km / mode.speed_kmh() * 60.0 * factor
}
