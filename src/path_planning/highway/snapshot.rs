//! Per-tick input: ego state, unconsumed trajectory tail and tracked vehicles

use crate::common::{Path2D, Point2D, Pose2D, RoboticsError, RoboticsResult};
use crate::mapping::RoadMap;
use crate::path_planning::highway::config::LaneConfig;

/// Ego vehicle state as reported for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoState {
    pub x: f64,
    pub y: f64,
    /// Along-track position [m]
    pub s: f64,
    /// Lateral offset from the road centre line, positive to the right [m]
    pub d: f64,
    /// Heading [rad]
    pub yaw: f64,
    /// Speed in the external unit [mph]
    pub speed: f64,
}

impl EgoState {
    pub fn new(x: f64, y: f64, s: f64, d: f64, yaw: f64, speed: f64) -> Self {
        Self { x, y, s, d, yaw, speed }
    }

    /// Build from simulator telemetry, which reports the heading in degrees
    pub fn from_telemetry(x: f64, y: f64, s: f64, d: f64, yaw_deg: f64, speed: f64) -> Self {
        Self::new(x, y, s, d, yaw_deg.to_radians(), speed)
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw)
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.s, self.d, self.yaw, self.speed]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Neighbouring vehicle from the fused object list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedVehicle {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    /// Planar velocity [m/s]
    pub vx: f64,
    pub vy: f64,
    pub s: f64,
    pub d: f64,
}

impl TrackedVehicle {
    pub fn new(s: f64, d: f64, vx: f64, vy: f64) -> Self {
        Self { id: 0, x: 0.0, y: 0.0, vx, vy, s, d }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Parse a raw sensor-fusion row `[id, x, y, vx, vy, s, d]`
    pub fn from_sensor_fusion(row: &[f64]) -> RoboticsResult<Self> {
        if row.len() != 7 {
            return Err(RoboticsError::InvalidSnapshot(format!(
                "sensor fusion row needs 7 values, got {}",
                row.len()
            )));
        }
        if row[0] < 0.0 || row[0].fract() != 0.0 {
            return Err(RoboticsError::InvalidSnapshot(format!(
                "invalid vehicle id {}",
                row[0]
            )));
        }
        Ok(Self::new(row[5], row[6], row[3], row[4])
            .with_id(row[0] as u64)
            .with_position(row[1], row[2]))
    }

    /// Scalar speed [m/s]
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Along-track position after `horizon` seconds at constant speed
    pub fn projected_s(&self, horizon: f64) -> f64 {
        self.s + horizon * self.speed()
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.vx, self.vy, self.s, self.d]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Everything the planner receives for one tick
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub ego: Option<EgoState>,
    /// Unconsumed tail of the previously emitted trajectory
    pub pending: Path2D,
    /// Along-track position at the end of `pending`, when the transport reports it
    pub end_path_s: Option<f64>,
    pub vehicles: Vec<TrackedVehicle>,
}

impl Snapshot {
    pub fn new(ego: EgoState) -> Self {
        Self {
            ego: Some(ego),
            ..Default::default()
        }
    }

    pub fn with_pending(mut self, pending: Path2D) -> Self {
        self.pending = pending;
        self
    }

    pub fn with_end_path_s(mut self, end_path_s: f64) -> Self {
        self.end_path_s = Some(end_path_s);
        self
    }

    pub fn with_vehicles(mut self, vehicles: Vec<TrackedVehicle>) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Reject snapshots that cannot be planned from
    pub fn validate(&self, lanes: &LaneConfig) -> RoboticsResult<EgoState> {
        let ego = self
            .ego
            .ok_or_else(|| RoboticsError::InvalidSnapshot("missing ego state".to_string()))?;
        if !ego.is_finite() {
            return Err(RoboticsError::InvalidSnapshot(format!("non-finite ego state {:?}", ego)));
        }
        if ego.speed < 0.0 {
            return Err(RoboticsError::InvalidSnapshot(format!("negative ego speed {}", ego.speed)));
        }
        if ego.d < 0.0 || ego.d >= lanes.road_width() {
            return Err(RoboticsError::InvalidSnapshot(format!(
                "ego d = {:.3} outside the road [0, {})",
                ego.d,
                lanes.road_width()
            )));
        }
        if let Some(p) = self.pending.points.iter().find(|p| !p.is_finite()) {
            return Err(RoboticsError::InvalidSnapshot(format!("non-finite pending point {:?}", p)));
        }
        if let Some(s) = self.end_path_s {
            if !s.is_finite() {
                return Err(RoboticsError::InvalidSnapshot("non-finite end_path_s".to_string()));
            }
        }
        if let Some(v) = self.vehicles.iter().find(|v| !v.is_finite()) {
            return Err(RoboticsError::InvalidSnapshot(format!(
                "non-finite state for vehicle {}",
                v.id
            )));
        }
        Ok(ego)
    }

    /// Planning view of this snapshot. When a previous trajectory is still
    /// pending, the ego `s` moves to where that trajectory ends.
    pub fn context<'a>(&'a self, ego: EgoState, road: &'a RoadMap) -> PlanningContext<'a> {
        let mut ego = ego;
        if let Some(last) = self.pending.last() {
            ego.s = match self.end_path_s {
                Some(s) => s,
                None => {
                    let heading = self
                        .pending
                        .last_two()
                        .filter(|(prev, last)| prev.distance(last) > 1e-6)
                        .map(|(prev, last)| prev.bearing_to(&last))
                        .unwrap_or(ego.yaw);
                    road.to_frenet(last.x, last.y, heading).s
                }
            };
        }

        PlanningContext {
            ego,
            reported_s: self.ego.map_or(ego.s, |e| e.s),
            pending_len: self.pending.len(),
            vehicles: &self.vehicles,
            road,
        }
    }
}

/// Snapshot after latency compensation, shared by the cost model and the
/// speed controller
#[derive(Debug, Clone, Copy)]
pub struct PlanningContext<'a> {
    /// Ego state with `s` at the end of the pending trajectory
    pub ego: EgoState,
    /// `s` as reported before latency compensation
    pub reported_s: f64,
    /// Number of unconsumed points
    pub pending_len: usize,
    pub vehicles: &'a [TrackedVehicle],
    pub road: &'a RoadMap,
}

impl<'a> PlanningContext<'a> {
    /// Time until the pending trajectory is consumed [s]
    pub fn pending_horizon(&self, tick_duration: f64) -> f64 {
        self.pending_len as f64 * tick_duration
    }

    /// Signed along-track gap from the ego vehicle to `s`, positive ahead
    pub fn gap_to(&self, s: f64) -> f64 {
        self.road.signed_gap(self.ego.s, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{LateralSign, Waypoint};

    fn straight_road() -> RoadMap {
        let waypoints = (0..20)
            .map(|i| Waypoint::new(i as f64 * 30.0, 0.0, i as f64 * 30.0, 0.0, -1.0))
            .collect();
        RoadMap::new(waypoints, 600.0)
            .unwrap()
            .with_lateral_sign(LateralSign::WaypointNormal)
    }

    #[test]
    fn test_from_telemetry_converts_yaw() {
        let ego = EgoState::from_telemetry(0.0, 0.0, 0.0, 6.0, 90.0, 0.0);
        assert!((ego.yaw - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_from_sensor_fusion() {
        let v = TrackedVehicle::from_sensor_fusion(&[4.0, 775.8, 1421.6, 3.0, 4.0, 6721.8, 9.9]).unwrap();
        assert_eq!(v.id, 4);
        assert_eq!(v.s, 6721.8);
        assert_eq!(v.d, 9.9);
        assert!((v.speed() - 5.0).abs() < 1e-12);
        assert!((v.projected_s(2.0) - 6731.8).abs() < 1e-9);

        assert!(TrackedVehicle::from_sensor_fusion(&[1.0, 2.0, 3.0]).is_err());
        assert!(TrackedVehicle::from_sensor_fusion(&[1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let lanes = LaneConfig::default();
        assert!(Snapshot::default().validate(&lanes).is_err());

        let ego = EgoState::new(0.0, 0.0, 10.0, 6.0, 0.0, 20.0);
        assert!(Snapshot::new(ego).validate(&lanes).is_ok());

        let off_road = EgoState { d: 12.5, ..ego };
        assert!(Snapshot::new(off_road).validate(&lanes).is_err());

        let reversing = EgoState { speed: -1.0, ..ego };
        assert!(Snapshot::new(reversing).validate(&lanes).is_err());

        let nan_vehicle = Snapshot::new(ego).with_vehicles(vec![TrackedVehicle::new(f64::NAN, 2.0, 0.0, 0.0)]);
        assert!(matches!(
            nan_vehicle.validate(&lanes),
            Err(RoboticsError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_context_advances_s_to_end_of_pending() {
        let road = straight_road();
        let ego = EgoState::new(100.0, -6.0, 100.0, 6.0, 0.0, 40.0);
        let pending = Path2D::from_xy(&[100.5, 101.0, 101.5], &[-6.0, -6.0, -6.0]);

        let reported = Snapshot::new(ego).with_pending(pending.clone()).with_end_path_s(101.5);
        let ctx = reported.context(ego, &road);
        assert_eq!(ctx.ego.s, 101.5);
        assert_eq!(ctx.reported_s, 100.0);
        assert_eq!(ctx.pending_len, 3);

        // Without end_path_s the end of the tail is located on the map
        let derived = Snapshot::new(ego).with_pending(pending);
        let ctx = derived.context(ego, &road);
        assert!((ctx.ego.s - 101.5).abs() < 1e-9);
        assert!((ctx.pending_horizon(0.02) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_context_with_huge_yaw_returns() {
        let road = straight_road();
        // Finite but far outside [-pi, pi]; a single pending point borrows the ego heading
        let ego = EgoState::new(100.0, -6.0, 100.0, 6.0, 1e17, 10.0);
        let snapshot = Snapshot::new(ego).with_pending(Path2D::from_xy(&[100.5], &[-6.0]));
        assert!(snapshot.validate(&LaneConfig::default()).is_ok());

        let ctx = snapshot.context(ego, &road);
        assert!(ctx.ego.s.is_finite());
    }

    #[test]
    fn test_context_without_pending_keeps_s() {
        let road = straight_road();
        let ego = EgoState::new(100.0, -6.0, 100.0, 6.0, 0.0, 40.0);
        let snapshot = Snapshot::new(ego).with_end_path_s(250.0);
        let ctx = snapshot.context(ego, &road);
        assert_eq!(ctx.ego.s, 100.0);
        assert!((ctx.gap_to(130.0) - 30.0).abs() < 1e-9);
    }
}
