//! Longitudinal speed control
//!
//! The target speed moves by at most one fixed step per tick: down when a
//! vehicle ahead in any lane the ego vehicle overlaps is inside the safety
//! distance, otherwise up towards the optimal speed.

use crate::path_planning::highway::config::HighwayPlannerConfig;
use crate::path_planning::highway::lane_cost::safety_distance;
use crate::path_planning::highway::snapshot::PlanningContext;

/// Whether a vehicle ahead in an occupied lane requires braking this tick
pub fn needs_braking(ctx: &PlanningContext, config: &HighwayPlannerConfig) -> bool {
    let lanes = config.lanes.occupied_lanes(ctx.ego.d);
    let min_gap = safety_distance(ctx.ego.speed);
    let horizon = ctx.pending_horizon(config.trajectory.tick_duration);

    ctx.vehicles
        .iter()
        .filter(|v| lanes.iter().any(|&lane| config.lanes.contains(lane, v.d)))
        .any(|v| {
            let gap = ctx.gap_to(v.projected_s(horizon));
            gap > 0.0 && gap < min_gap
        })
}

/// Apply one tick of speed control; returns whether the brake was applied
pub fn update_target_speed(target_speed: &mut f64, ctx: &PlanningContext, config: &HighwayPlannerConfig) -> bool {
    let speed = &config.speed;
    let brake = needs_braking(ctx, config);

    if brake {
        *target_speed = (*target_speed - speed.brake_step).max(0.0);
        log::debug!("braking, target speed {:.3}", target_speed);
    } else if *target_speed < speed.optimal_speed {
        *target_speed = (*target_speed + speed.accel_step).min(speed.optimal_speed);
    }
    brake
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;
    use crate::mapping::RoadMap;
    use crate::path_planning::highway::snapshot::{EgoState, Snapshot, TrackedVehicle};

    fn step(target_speed: &mut f64, ego: EgoState, vehicles: Vec<TrackedVehicle>) -> bool {
        let road = RoadMap::circular(Point2D::origin(), 1000.0, 200).unwrap();
        let snapshot = Snapshot::new(ego).with_vehicles(vehicles);
        let ctx = snapshot.context(ego, &road);
        update_target_speed(target_speed, &ctx, &HighwayPlannerConfig::default())
    }

    fn ego(d: f64, speed: f64) -> EgoState {
        EgoState::new(0.0, 0.0, 200.0, d, 0.0, speed)
    }

    #[test]
    fn test_accelerates_on_empty_road() {
        let mut target = 10.0;
        assert!(!step(&mut target, ego(6.0, 10.0), vec![]));
        assert!((target - 10.224).abs() < 1e-12);
    }

    #[test]
    fn test_caps_at_optimal_speed() {
        let mut target = 49.4;
        step(&mut target, ego(6.0, 49.4), vec![]);
        assert_eq!(target, 49.5);
        step(&mut target, ego(6.0, 49.5), vec![]);
        assert_eq!(target, 49.5);
    }

    #[test]
    fn test_brakes_for_vehicle_ahead() {
        let mut target = 30.0;
        let brake = step(&mut target, ego(6.0, 30.0), vec![TrackedVehicle::new(205.0, 6.0, 0.0, 0.0)]);
        assert!(brake);
        assert!((target - 29.776).abs() < 1e-12);
    }

    #[test]
    fn test_brake_floors_at_zero() {
        let mut target = 0.1;
        step(&mut target, ego(6.0, 30.0), vec![TrackedVehicle::new(205.0, 6.0, 0.0, 0.0)]);
        assert_eq!(target, 0.0);
    }

    #[test]
    fn test_ignores_vehicles_behind_and_in_other_lanes() {
        let mut target = 30.0;
        let vehicles = vec![
            TrackedVehicle::new(195.0, 6.0, 0.0, 0.0),
            TrackedVehicle::new(205.0, 2.0, 0.0, 0.0),
        ];
        assert!(!step(&mut target, ego(6.0, 30.0), vehicles));
    }

    #[test]
    fn test_straddling_checks_neighbour_lane() {
        let mut target = 30.0;
        // Leaning 1.5 m into lane 2 during a change
        let vehicles = vec![TrackedVehicle::new(210.0, 10.0, 0.0, 0.0)];
        assert!(step(&mut target, ego(7.5, 30.0), vehicles.clone()));
        assert!(!step(&mut target, ego(6.5, 30.0), vehicles));
    }
}
