//! Provider seams for caller-supplied live-data hints.
//!
//! The planner performs no network or disk I/O. Live traffic and pricing
//! data, when a deployment has them, arrive through these traits; the
//! neutral default implementations keep the enhanced optimizer usable with
//! no external data at all.

use chrono::NaiveTime;

use crate::enhanced::TrafficSeverity;
use crate::model::{Activity, Coordinate};

/// Supplies a congestion bucket per segment and departure time.
pub trait TrafficProvider {
    fn severity_for(
        &self,
        from: &Coordinate,
        to: &Coordinate,
        depart: NaiveTime,
    ) -> TrafficSeverity;
}

/// No traffic data: every segment is uncongested.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTraffic;

impl TrafficProvider for NoTraffic {
    fn severity_for(
        &self,
        _from: &Coordinate,
        _to: &Coordinate,
        _depart: NaiveTime,
    ) -> TrafficSeverity {
        TrafficSeverity::None
    }
}

/// Supplies per-segment toll and per-stop parking costs.
///
/// Values are summed verbatim; the planner does no toll or parking lookup of
/// its own.
pub trait CostHintProvider {
    fn toll_for(&self, _from: &Coordinate, _to: &Coordinate) -> f64 {
        0.0
    }

    fn parking_for(&self, _activity: &Activity) -> f64 {
        0.0
    }
}

/// No cost data: every segment and stop is free.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCostHints;

impl CostHintProvider for NoCostHints {}
