//! Traffic-, cost-, and emissions-aware route optimization.
//!
//! Wraps the basic optimizer and layers per-segment traffic delay, fuel,
//! toll and parking costs, and a CO2 estimate on top of its result. All
//! hint data is caller-supplied; when the enhancement layer cannot produce
//! sound numbers it degrades to the basic result with zeroed cost and
//! traffic fields instead of failing the call.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo::{TravelMode, distance_km, travel_time_minutes};
use crate::model::{Activity, PlanError};
use crate::optimizer::{OptimizeOptions, RouteOptimizationResult, optimize};
use crate::traits::{CostHintProvider, TrafficProvider};

/// How many of the most-delayed segments to report.
const MOST_DELAYED_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Compact,
    Standard,
    Suv,
    Electric,
}

impl VehicleType {
    /// Fuel efficiency; `None` for vehicles that burn no fuel.
    pub fn km_per_liter(self) -> Option<f64> {
        match self {
            VehicleType::Compact => Some(16.0),
            VehicleType::Standard => Some(12.0),
            VehicleType::Suv => Some(8.0),
            VehicleType::Electric => None,
        }
    }

    /// Tailpipe emissions per kilometer.
    pub fn co2_kg_per_km(self) -> f64 {
        match self {
            VehicleType::Compact => 0.12,
            VehicleType::Standard => 0.17,
            VehicleType::Suv => 0.23,
            VehicleType::Electric => 0.0,
        }
    }
}

/// Discrete congestion buckets supplied per segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficSeverity {
    #[default]
    None,
    Light,
    Moderate,
    Heavy,
    Severe,
}

impl TrafficSeverity {
    /// Multiplier applied to uncongested travel time.
    pub fn multiplier(self) -> f64 {
        match self {
            TrafficSeverity::None => 1.0,
            TrafficSeverity::Light => 1.15,
            TrafficSeverity::Moderate => 1.35,
            TrafficSeverity::Heavy => 1.6,
            TrafficSeverity::Severe => 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhancedOptions {
    pub base: OptimizeOptions,
    pub vehicle: VehicleType,
    pub consider_traffic: bool,
    pub consider_tolls: bool,
    pub consider_parking: bool,
    pub fuel_price_per_liter: f64,
}

impl Default for EnhancedOptions {
    fn default() -> Self {
        Self {
            base: OptimizeOptions::default(),
            vehicle: VehicleType::Standard,
            consider_traffic: true,
            consider_tolls: true,
            consider_parking: true,
            fuel_price_per_liter: 1.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fuel: f64,
    pub tolls: f64,
    pub parking: f64,
    pub total: f64,
}

impl CostBreakdown {
    fn zero() -> Self {
        Self {
            fuel: 0.0,
            tolls: 0.0,
            parking: 0.0,
            total: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedSegment {
    pub from_id: String,
    pub to_id: String,
    pub delay_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficImpact {
    pub total_delay_minutes: f64,
    /// Worst segments first.
    pub delayed_segments: Vec<DelayedSegment>,
}

impl TrafficImpact {
    fn zero() -> Self {
        Self {
            total_delay_minutes: 0.0,
            delayed_segments: Vec::new(),
        }
    }
}

/// Basic optimizer result extended with cost, traffic, and emission figures.
///
/// A degraded result (enhancement layer failed) has the same shape with the
/// extra fields zeroed, so consumers need no special-case handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedRouteResult {
    pub route: RouteOptimizationResult,
    pub costs: CostBreakdown,
    pub traffic: TrafficImpact,
    pub co2_kg: f64,
}

/// Optimize and layer traffic/cost/emission estimates on the result.
///
/// Validation errors from the basic optimizer propagate; any failure inside
/// the enhancement layer falls back to the basic result instead.
pub fn optimize_enhanced<T, C>(
    activities: &[Activity],
    options: &EnhancedOptions,
    traffic: &T,
    costs: &C,
) -> Result<EnhancedRouteResult, PlanError>
where
    T: TrafficProvider,
    C: CostHintProvider,
{
    let route = optimize(activities, &options.base)?;
    match enhance(route.clone(), options, traffic, costs) {
        Some(result) => Ok(result),
        None => {
            warn!("enhanced metrics unavailable; returning basic optimizer result");
            Ok(EnhancedRouteResult {
                route,
                costs: CostBreakdown::zero(),
                traffic: TrafficImpact::zero(),
                co2_kg: 0.0,
            })
        }
    }
}

/// Returns `None` on any unsound input (non-finite or negative hint values),
/// which triggers the basic fallback.
fn enhance<T, C>(
    mut route: RouteOptimizationResult,
    options: &EnhancedOptions,
    traffic: &T,
    costs: &C,
) -> Option<EnhancedRouteResult>
where
    T: TrafficProvider,
    C: CostHintProvider,
{
    if !options.fuel_price_per_liter.is_finite() || options.fuel_price_per_liter < 0.0 {
        return None;
    }

    let driving = options.base.mode == TravelMode::Driving;

    let impact = if options.consider_traffic {
        traffic_impact(&route.activities, options.base.mode, traffic)?
    } else {
        TrafficImpact::zero()
    };

    let fuel_per_km = match options.vehicle.km_per_liter() {
        Some(km_per_liter) if driving => options.fuel_price_per_liter / km_per_liter,
        _ => 0.0,
    };
    let fuel = route.total_distance_km * fuel_per_km;
    let co2_kg = if driving {
        route.total_distance_km * options.vehicle.co2_kg_per_km()
    } else {
        0.0
    };

    let mut tolls = 0.0;
    if options.consider_tolls && driving {
        for pair in route.activities.windows(2) {
            let toll = costs.toll_for(&pair[0].location, &pair[1].location);
            if !toll.is_finite() || toll < 0.0 {
                return None;
            }
            tolls += toll;
        }
    }

    let mut parking = 0.0;
    if options.consider_parking && driving {
        for activity in &route.activities {
            let fee = costs.parking_for(activity);
            if !fee.is_finite() || fee < 0.0 {
                return None;
            }
            parking += fee;
        }
    }

    // Fuel saved by the shorter route is the monetary side of the savings.
    route.savings.cost = Some(route.savings.distance_km * fuel_per_km);

    Some(EnhancedRouteResult {
        route,
        costs: CostBreakdown {
            fuel,
            tolls,
            parking,
            total: fuel + tolls + parking,
        },
        traffic: impact,
        co2_kg,
    })
}

fn traffic_impact<T>(
    activities: &[Activity],
    mode: TravelMode,
    traffic: &T,
) -> Option<TrafficImpact>
where
    T: TrafficProvider,
{
    let mut total_delay_minutes = 0.0;
    let mut delayed_segments = Vec::new();

    for pair in activities.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let base_minutes =
            travel_time_minutes(distance_km(from.location, to.location), mode, 1.0);
        let severity = traffic.severity_for(&from.location, &to.location, from.window.end());
        let delay = base_minutes * (severity.multiplier() - 1.0);
        if !delay.is_finite() || delay < 0.0 {
            return None;
        }
        if delay > 0.0 {
            total_delay_minutes += delay;
            delayed_segments.push(DelayedSegment {
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                delay_minutes: delay,
            });
        }
    }

    delayed_segments.sort_by(|a, b| b.delay_minutes.total_cmp(&a.delay_minutes));
    delayed_segments.truncate(MOST_DELAYED_SEGMENTS);

    Some(TrafficImpact {
        total_delay_minutes,
        delayed_segments,
    })
}
