//! Highway planner: one call per controller tick
//!
//! Each tick validates the snapshot, compensates for the unconsumed
//! trajectory, advances the lane-change state machine, runs one step of
//! speed control and synthesizes the next trajectory. Ticks on the same
//! planner are serialized; the state only advances when the whole tick
//! succeeds.

use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::common::{InterpolatingCurve, Path2D, RoboticsResult, TrajectoryPlanner};
use crate::mapping::RoadMap;
use crate::path_planning::cubic_spline::CubicSpline;
use crate::path_planning::highway::behavior::{update_behavior, BehaviorStep, LaneBehavior, PlannerState};
use crate::path_planning::highway::config::HighwayPlannerConfig;
use crate::path_planning::highway::snapshot::Snapshot;
use crate::path_planning::highway::speed_control::update_target_speed;
use crate::path_planning::highway::trajectory::synthesize;

/// Result of one planning tick
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    /// Trajectory for the controller, one point per tick
    pub trajectory: Path2D,
    /// Lane costs the behaviour decision was made on
    pub lane_costs: Vec<f64>,
    pub behavior: LaneBehavior,
    /// Lane the trajectory steers for
    pub target_lane: usize,
    pub braking: bool,
    /// Commanded speed after this tick [mph]
    pub target_speed: f64,
}

/// Run one tick against explicit state. `state` is left untouched on error,
/// including an invalid `config`.
pub fn plan_tick<C: InterpolatingCurve>(
    road: &RoadMap,
    config: &HighwayPlannerConfig,
    state: &mut PlannerState,
    snapshot: &Snapshot,
) -> RoboticsResult<PlanReport> {
    config.validate()?;
    let ego = snapshot.validate(&config.lanes)?;
    let ctx = snapshot.context(ego, road);

    let mut next = state.clone();
    let BehaviorStep { steer_lane: target_lane, lane_costs } = update_behavior(&mut next, &ctx, config);
    let braking = update_target_speed(&mut next.target_speed, &ctx, config);

    let trajectory = synthesize::<C>(&ctx, &snapshot.pending, target_lane, next.target_speed, config)?;

    log::debug!(
        "tick: s = {:.1} d = {:.2} speed = {:.2}, {}, target lane {}, target speed {:.2}",
        ctx.ego.s,
        ctx.ego.d,
        ctx.ego.speed,
        next.behavior,
        target_lane,
        next.target_speed
    );

    *state = next;
    Ok(PlanReport {
        trajectory,
        lane_costs,
        behavior: state.behavior,
        target_lane,
        braking,
        target_speed: state.target_speed,
    })
}

/// Stateful planner for one ego vehicle on one road
pub struct HighwayPlanner<C = CubicSpline> {
    road: RoadMap,
    config: HighwayPlannerConfig,
    state: Mutex<PlannerState>,
    _curve: PhantomData<fn() -> C>,
}

impl HighwayPlanner {
    /// Planner using the cubic spline for trajectory shaping
    pub fn new(road: RoadMap, config: HighwayPlannerConfig) -> RoboticsResult<Self> {
        Self::with_curve(road, config)
    }
}

impl<C: InterpolatingCurve> HighwayPlanner<C> {
    /// Planner using a caller-chosen curve type
    pub fn with_curve(road: RoadMap, config: HighwayPlannerConfig) -> RoboticsResult<Self> {
        config.validate()?;
        log::info!(
            "highway planner ready: {} waypoints, track length {:.1} m, {} lanes",
            road.waypoints().len(),
            road.track_length(),
            config.lanes.lane_count
        );
        Ok(Self {
            road,
            config,
            state: Mutex::new(PlannerState::new()),
            _curve: PhantomData,
        })
    }

    pub fn road(&self) -> &RoadMap {
        &self.road
    }

    pub fn config(&self) -> &HighwayPlannerConfig {
        &self.config
    }

    /// Copy of the current state
    pub fn state(&self) -> PlannerState {
        self.lock().clone()
    }

    /// Forget lane-change progress, bias and target speed
    pub fn reset(&self) {
        *self.lock() = PlannerState::new();
    }

    /// Plan one tick
    pub fn plan(&self, snapshot: &Snapshot) -> RoboticsResult<PlanReport> {
        let mut state = self.lock();
        plan_tick::<C>(&self.road, &self.config, &mut state, snapshot).map_err(|err| {
            log::warn!("planning tick rejected: {}", err);
            err
        })
    }

    // A panic mid-tick leaves the previous state in place, so it is safe to reuse
    fn lock(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: InterpolatingCurve> TrajectoryPlanner for HighwayPlanner<C> {
    type Input = Snapshot;

    fn plan_trajectory(&self, input: &Snapshot) -> RoboticsResult<Path2D> {
        self.plan(input).map(|report| report.trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Point2D, RoboticsError};
    use crate::path_planning::cubic_spline::LinearInterpolation;
    use crate::path_planning::highway::snapshot::{EgoState, TrackedVehicle};

    fn planner() -> HighwayPlanner {
        let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
        HighwayPlanner::new(road, HighwayPlannerConfig::default()).unwrap()
    }

    fn ego_on(planner: &HighwayPlanner, s: f64, d: f64, speed: f64) -> EgoState {
        let road = planner.road();
        let p = road.to_cartesian(s, d).unwrap();
        let ahead = road.to_cartesian(s + 1.0, d).unwrap();
        EgoState::new(p.x, p.y, s, d, p.bearing_to(&ahead), speed)
    }

    #[test]
    fn test_first_tick_from_rest() {
        let planner = planner();
        let snapshot = Snapshot::new(ego_on(&planner, 100.0, 6.0, 0.0));
        let report = planner.plan(&snapshot).unwrap();

        assert_eq!(report.trajectory.len(), 50);
        assert_eq!(report.target_lane, 1);
        assert_eq!(report.behavior, LaneBehavior::Stable);
        assert!(!report.braking);
        assert!((report.target_speed - 0.224).abs() < 1e-12);
        assert_eq!(report.lane_costs.len(), 3);
        assert_eq!(planner.state().target_speed, report.target_speed);
    }

    #[test]
    fn test_rejected_snapshot_keeps_state() {
        let planner = planner();
        planner.plan(&Snapshot::new(ego_on(&planner, 100.0, 6.0, 0.0))).unwrap();
        let before = planner.state();

        let err = planner.plan(&Snapshot::default()).unwrap_err();
        assert!(matches!(err, RoboticsError::InvalidSnapshot(_)));

        let off_road = ego_on(&planner, 100.0, 6.0, 0.0);
        let off_road = EgoState { d: -0.5, ..off_road };
        assert!(planner.plan(&Snapshot::new(off_road)).is_err());
        assert_eq!(planner.state(), before);
    }

    #[test]
    fn test_reset_clears_state() {
        let planner = planner();
        for _ in 0..5 {
            planner.plan(&Snapshot::new(ego_on(&planner, 100.0, 2.0, 0.0))).unwrap();
        }
        assert!(planner.state().left_lane_bias > 0);
        planner.reset();
        assert_eq!(planner.state(), PlannerState::new());
    }

    #[test]
    fn test_blocked_lane_brakes() {
        let planner = planner();
        let ego = ego_on(&planner, 100.0, 6.0, 30.0);
        let snapshot = Snapshot::new(ego).with_vehicles(vec![TrackedVehicle::new(105.0, 6.0, 0.0, 0.0)]);
        let report = planner.plan(&snapshot).unwrap();
        assert!(report.braking);
        assert_eq!(report.target_speed, 0.0);
    }

    #[test]
    fn test_trait_object_and_curve_choice() {
        let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
        let linear = HighwayPlanner::<LinearInterpolation>::with_curve(road, HighwayPlannerConfig::default()).unwrap();
        let ego = ego_on(&planner(), 100.0, 6.0, 20.0);

        let as_trait: &dyn TrajectoryPlanner<Input = Snapshot> = &linear;
        let path = as_trait.plan_trajectory(&Snapshot::new(ego)).unwrap();
        assert_eq!(path.len(), 50);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
        let mut config = HighwayPlannerConfig::default();
        config.lanes.lane_count = 0;
        assert!(matches!(
            HighwayPlanner::new(road, config),
            Err(RoboticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_plan_tick_rejects_invalid_config() {
        let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
        let mut config = HighwayPlannerConfig::default();
        let ego = ego_on(&planner(), 100.0, 6.0, 20.0);
        config.lanes.lane_count = 0;

        let mut state = PlannerState { left_lane_bias: 7, ..PlannerState::new() };
        let err = plan_tick::<CubicSpline>(&road, &config, &mut state, &Snapshot::new(ego)).unwrap_err();
        assert!(matches!(err, RoboticsError::InvalidParameter(_)));
        assert_eq!(state, PlannerState { left_lane_bias: 7, ..PlannerState::new() });
    }

    #[test]
    fn test_reported_costs_match_decision_bias() {
        use crate::path_planning::highway::lane_cost::lane_costs;

        let planner = planner();
        let ego = ego_on(&planner, 100.0, 2.0, 20.0);
        let snapshot = Snapshot::new(ego);
        let report = planner.plan(&snapshot).unwrap();

        // Starting in lane 0 raises the bias from 0 to 2 before scoring
        let ctx = snapshot.context(snapshot.validate(&planner.config().lanes).unwrap(), planner.road());
        assert_eq!(planner.state().left_lane_bias, 2);
        assert_eq!(report.lane_costs, lane_costs(&ctx, planner.config(), 2));
        assert_ne!(report.lane_costs, lane_costs(&ctx, planner.config(), 0));
    }
}
