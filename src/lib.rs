//! rust_highway_planning - highway trajectory planning in Rust
//!
//! This crate provides a road geometry model in Frenet coordinates and a
//! per-tick highway planner: lane choice, speed control and smooth
//! trajectory synthesis for a vehicle driving on a multi-lane highway.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod mapping;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, FrenetPoint, Path2D};
pub use common::{InterpolatingCurve, TrajectoryPlanner};
pub use common::{RoboticsError, RoboticsResult};
pub use mapping::RoadMap;
pub use path_planning::highway::{HighwayPlanner, HighwayPlannerConfig, PlanReport, Snapshot};
