//! Lane selection cost model
//!
//! Every lane gets a score (lower is better) built from three parts:
//! how far the ego vehicle is from the lane centre (discounted the longer
//! it has lingered in left lanes), a fixed preference for right lanes, and
//! the gap to the nearest vehicle ahead in that lane. Lanes more than one
//! lane away, or with a vehicle in the no-go region beside the ego vehicle,
//! receive the critical cost.
//!
//! The side check extrapolates at constant speed over a short horizon. It
//! is a heuristic gate for lane choice, not a collision guarantee.

use ordered_float::OrderedFloat;

use crate::path_planning::highway::config::HighwayPlannerConfig;
use crate::path_planning::highway::snapshot::PlanningContext;

/// Speed-dependent following gap [m] for a speed in mph
pub fn safety_distance(speed: f64) -> f64 {
    let msp = speed / 10.0;
    msp * msp + msp * 3.0
}

/// Score every lane for the current tick
pub fn lane_costs(ctx: &PlanningContext, config: &HighwayPlannerConfig, left_lane_bias: u64) -> Vec<f64> {
    let lanes = &config.lanes;
    let rules = &config.lane_change;

    // Look twice as far ahead as for braking, so overtaking starts early
    let look_ahead = safety_distance(ctx.ego.speed) * 2.0;
    let current_lane = lanes.lane_of(ctx.ego.d);
    let ego_speed_mps = config.to_mps(ctx.ego.speed);
    let horizon = ctx.pending_horizon(config.trajectory.tick_duration);

    let max_bias = rules.max_left_lane_bias;
    let bias_discount = (max_bias - left_lane_bias.min(max_bias)) as f64 / max_bias as f64;

    (0..lanes.lane_count)
        .map(|lane| {
            if (lane as i64 - current_lane as i64).abs() > 1 {
                return rules.critical_cost;
            }

            let lane_diff = ctx.ego.d - lanes.lane_center(lane);
            let mut cost = (lane_diff * lane_diff / 4.0) * bias_discount;
            cost += (lanes.lane_count - 1 - lane) as f64 * 2.0;

            let mut blocked_ahead = 0.0_f64;
            let mut blocked_at_side = false;

            for vehicle in ctx.vehicles.iter().filter(|v| lanes.contains(lane, v.d)) {
                let gap = ctx.gap_to(vehicle.projected_s(horizon));

                if gap > 0.0 && gap < look_ahead {
                    blocked_ahead = blocked_ahead.max(look_ahead - gap);
                }

                let closing = (rules.closing_horizon * (vehicle.speed() - ego_speed_mps)).max(0.0);
                if gap + closing >= -rules.safety_buffer && gap <= rules.safety_buffer {
                    log::trace!("lane {} blocked beside ego by vehicle {}", lane, vehicle.id);
                    blocked_at_side = true;
                    break;
                }
            }

            if blocked_at_side {
                cost += rules.critical_cost;
            }
            cost + blocked_ahead
        })
        .collect()
}

/// Lowest-cost lane; ties go to the right-most lane
pub fn best_lane(costs: &[f64]) -> Option<(usize, f64)> {
    (0..costs.len())
        .rev()
        .min_by_key(|&i| OrderedFloat(costs[i]))
        .map(|i| (i, costs[i]))
}

/// Outcome of scoring the lanes for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct LaneChoice {
    /// Lane to change to, `None` when even the best lane costs more than
    /// the configured ceiling
    pub lane: Option<usize>,
    /// Cost of every lane, as used for the choice
    pub costs: Vec<f64>,
}

/// Score every lane and pick the one to change to
pub fn choose_target_lane(ctx: &PlanningContext, config: &HighwayPlannerConfig, left_lane_bias: u64) -> LaneChoice {
    let costs = lane_costs(ctx, config, left_lane_bias);
    let ceiling = config.lane_change.max_lane_change_cost;

    let lane = match best_lane(&costs) {
        Some((lane, cost)) if cost <= ceiling => {
            log::debug!("lane costs {:?}, best lane {} ({:.2})", costs, lane, cost);
            Some(lane)
        }
        Some((_, cost)) => {
            log::debug!("best lane cost {:.2} above ceiling {:.2}, keeping lane", cost, ceiling);
            None
        }
        None => None,
    };
    LaneChoice { lane, costs }
}
