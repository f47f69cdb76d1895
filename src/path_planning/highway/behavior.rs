//! Lane-change behaviour state machine
//!
//! Two states: `Stable` (keep the current lane) and `Changing(target)`.
//! A change is only committed above a minimum speed and when the best lane
//! is cheap enough; it completes once the vehicle is centred in the target
//! lane. Both gates keep noisy lane costs from causing oscillation.

use std::fmt;

use crate::path_planning::highway::config::HighwayPlannerConfig;
use crate::path_planning::highway::lane_cost::{choose_target_lane, LaneChoice};
use crate::path_planning::highway::snapshot::PlanningContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneBehavior {
    Stable,
    Changing(usize),
}

impl fmt::Display for LaneBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneBehavior::Stable => write!(f, "stable"),
            LaneBehavior::Changing(lane) => write!(f, "changing to lane {}", lane),
        }
    }
}

/// Planner memory carried from one tick to the next
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerState {
    pub behavior: LaneBehavior,
    /// Grows every tick spent left of the right-most lane
    pub left_lane_bias: u64,
    /// Commanded speed [mph]
    pub target_speed: f64,
}

impl PlannerState {
    pub fn new() -> Self {
        Self {
            behavior: LaneBehavior::Stable,
            left_lane_bias: 0,
            target_speed: 0.0,
        }
    }

    /// Lane being changed to, `None` while stable
    pub fn target_lane(&self) -> Option<usize> {
        match self.behavior {
            LaneBehavior::Stable => None,
            LaneBehavior::Changing(lane) => Some(lane),
        }
    }
}

impl Default for PlannerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one behaviour tick
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorStep {
    /// Lane to steer for
    pub steer_lane: usize,
    /// Lane costs scored with the bias after this tick's increment
    pub lane_costs: Vec<f64>,
}

/// Advance the behaviour one tick
pub fn update_behavior(state: &mut PlannerState, ctx: &PlanningContext, config: &HighwayPlannerConfig) -> BehaviorStep {
    let lanes = &config.lanes;
    let current_lane = lanes.lane_of(ctx.ego.d);
    let offset = lanes.lane_offset(ctx.ego.d);

    state.left_lane_bias = state
        .left_lane_bias
        .saturating_add((lanes.lane_count - 1 - current_lane) as u64);

    let LaneChoice { lane: best, costs } = choose_target_lane(ctx, config, state.left_lane_bias);

    match state.behavior {
        LaneBehavior::Stable => {
            let min_speed = config.speed.optimal_speed * config.lane_change.min_speed_ratio;
            if ctx.ego.speed >= min_speed {
                if let Some(lane) = best {
                    if lane > current_lane {
                        state.left_lane_bias = 0;
                    }
                    if lane != current_lane {
                        log::info!("lane change {} -> {} committed at s = {:.1}", current_lane, lane, ctx.ego.s);
                    }
                    state.behavior = LaneBehavior::Changing(lane);
                }
            }
        }
        LaneBehavior::Changing(target) => {
            if current_lane == target && offset.abs() < lanes.max_lane_offset {
                log::info!("lane change to {} completed", target);
                state.behavior = LaneBehavior::Stable;
            }
        }
    }

    BehaviorStep {
        steer_lane: state.target_lane().unwrap_or(current_lane),
        lane_costs: costs,
    }
}
