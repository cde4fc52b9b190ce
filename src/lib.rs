//! day-planner core
//!
//! Pure, stateless scheduling computations for a single day's itinerary:
//! conflict detection, spatial clustering, timing advice, and heuristic
//! route optimization. The crate performs no I/O; persistence, live data,
//! and UI concerns belong to the caller.

pub mod model;
pub mod geo;
pub mod traits;
pub mod conflict;
pub mod cluster;
pub mod advisor;
pub mod optimizer;
pub mod enhanced;
