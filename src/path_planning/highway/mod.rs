//! Highway Trajectory Planner Module
//!
//! Plans the ego vehicle's motion on a multi-lane highway, one call per
//! controller tick. Each tick picks a lane with a cost model, adjusts the
//! commanded speed, and emits a smooth trajectory that continues the part of
//! the previous one the controller has not consumed yet.
//!
//! # Components
//!
//! - `config`: lane layout, speed limits, lane-change rules, trajectory shape
//! - `snapshot`: per-tick input and latency compensation
//! - `lane_cost`: lane scoring and best-lane choice
//! - `behavior`: stable / changing-lane state machine
//! - `speed_control`: brake or accelerate by one step per tick
//! - `trajectory`: spline-shaped trajectory synthesis
//! - `planner`: stateful per-tick entry point
//!
//! # Example
//!
//! ```no_run
//! use rust_highway_planning::common::Point2D;
//! use rust_highway_planning::mapping::RoadMap;
//! use rust_highway_planning::path_planning::highway::{
//!     EgoState, HighwayPlanner, HighwayPlannerConfig, Snapshot,
//! };
//!
//! let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
//! let planner = HighwayPlanner::new(road, HighwayPlannerConfig::default()).unwrap();
//!
//! let ego = EgoState::new(1006.0, 0.0, 0.0, 6.0, std::f64::consts::FRAC_PI_2, 0.0);
//! let report = planner.plan(&Snapshot::new(ego)).unwrap();
//! println!("{} points towards lane {}", report.trajectory.len(), report.target_lane);
//! ```

pub mod config;
pub mod snapshot;
pub mod lane_cost;
pub mod behavior;
pub mod speed_control;
pub mod trajectory;
pub mod planner;

pub use config::{HighwayPlannerConfig, LaneConfig, SpeedConfig, LaneChangeConfig, TrajectoryConfig};
pub use snapshot::{EgoState, TrackedVehicle, Snapshot, PlanningContext};
pub use lane_cost::{safety_distance, lane_costs, best_lane, choose_target_lane, LaneChoice};
pub use behavior::{BehaviorStep, LaneBehavior, PlannerState, update_behavior};
pub use speed_control::{needs_braking, update_target_speed};
pub use trajectory::synthesize;
pub use planner::{HighwayPlanner, PlanReport, plan_tick};
