//! Highway planner configuration
//!
//! All values are fixed at startup. Defaults match a three-lane highway
//! with 4 m lanes, a 50 mph limit and a 20 ms controller tick.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{RoboticsError, RoboticsResult};

/// Lane layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Number of lanes in the direction of travel
    pub lane_count: usize,
    /// Full lane width [m]
    pub lane_width: f64,
    /// Lateral tolerance around the lane centre for a finished lane change [m]
    pub max_lane_offset: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            lane_width: 4.0,
            max_lane_offset: 0.25,
        }
    }
}

impl LaneConfig {
    /// Lane containing lateral offset `d`, clamped to the road
    pub fn lane_of(&self, d: f64) -> usize {
        let lane = (d / self.lane_width).floor();
        if lane <= 0.0 {
            0
        } else {
            (lane as usize).min(self.lane_count - 1)
        }
    }

    /// Lateral offset of a lane's centre line
    pub fn lane_center(&self, lane: usize) -> f64 {
        (lane as f64 + 0.5) * self.lane_width
    }

    /// Offset of `d` from the centre of the lane it lies in; positive to the right
    pub fn lane_offset(&self, d: f64) -> f64 {
        d - self.lane_center(self.lane_of(d))
    }

    /// Whether `d` lies strictly inside `lane`
    pub fn contains(&self, lane: usize, d: f64) -> bool {
        let left = lane as f64 * self.lane_width;
        d > left && d < left + self.lane_width
    }

    /// Lanes a vehicle at `d` overlaps: its own lane, plus the neighbour it
    /// leans into by more than a quarter lane width
    pub fn occupied_lanes(&self, d: f64) -> Vec<usize> {
        let lane = self.lane_of(d);
        let offset = self.lane_offset(d);
        let half_width = self.lane_width / 2.0;

        let mut lanes = vec![lane];
        if offset < -half_width / 2.0 && lane > 0 {
            lanes.push(lane - 1);
        }
        if offset > half_width / 2.0 && lane + 1 < self.lane_count {
            lanes.push(lane + 1);
        }
        lanes
    }

    /// Width of the drivable road [m]
    pub fn road_width(&self) -> f64 {
        self.lane_count as f64 * self.lane_width
    }
}

/// Longitudinal speed control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Cruise speed the controller accelerates towards [mph]
    pub optimal_speed: f64,
    /// Target speed increase per tick [mph]
    pub accel_step: f64,
    /// Target speed decrease per tick when braking [mph]
    pub brake_step: f64,
    /// External speed unit per m/s (mph: 2.24)
    pub speed_unit_per_mps: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            optimal_speed: 49.5,
            accel_step: 0.224,
            brake_step: 0.224,
            speed_unit_per_mps: 2.24,
        }
    }
}

/// Lane selection cost model and behaviour gates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneChangeConfig {
    /// Cost assigned to impossible or dangerous lanes
    pub critical_cost: f64,
    /// Best lane cost above which no lane change is committed
    pub max_lane_change_cost: f64,
    /// Left-lane bias at which the lane offset term vanishes
    pub max_left_lane_bias: u64,
    /// Half length of the no-go region around the ego vehicle [m]
    pub safety_buffer: f64,
    /// Look-ahead used to turn a speed advantage into closing distance [s]
    pub closing_horizon: f64,
    /// Fraction of the optimal speed required before changing lanes
    pub min_speed_ratio: f64,
}

impl Default for LaneChangeConfig {
    fn default() -> Self {
        Self {
            critical_cost: 100.0,
            max_lane_change_cost: 50.0,
            max_left_lane_bias: 1000,
            safety_buffer: 20.0,
            closing_horizon: 2.0,
            min_speed_ratio: 2.0 / 3.0,
        }
    }
}

/// Trajectory synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Controller tick [s]
    pub tick_duration: f64,
    /// Number of points in an emitted trajectory
    pub horizon_points: usize,
    /// Anchor points placed ahead of the reference pose
    pub anchor_count: usize,
    /// Along-track spacing between anchors [m]
    pub anchor_spacing: f64,
    /// Forward offset used to pace the points [m]
    pub pacing_offset: f64,
    /// Distance behind the ego pose of the synthesised reference point [m]
    pub backprojection_distance: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            tick_duration: 0.02,
            horizon_points: 50,
            anchor_count: 3,
            anchor_spacing: 30.0,
            pacing_offset: 30.0,
            backprojection_distance: 1.0,
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighwayPlannerConfig {
    pub lanes: LaneConfig,
    pub speed: SpeedConfig,
    pub lane_change: LaneChangeConfig,
    pub trajectory: TrajectoryConfig,
}

impl HighwayPlannerConfig {
    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> RoboticsResult<Self> {
        let config: HighwayPlannerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> RoboticsResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: HighwayPlannerConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        log::info!("loaded planner config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> RoboticsResult<()> {
        fn positive(name: &str, value: f64) -> RoboticsResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(RoboticsError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        }

        if self.lanes.lane_count == 0 {
            return Err(RoboticsError::InvalidParameter("lane_count must be at least 1".to_string()));
        }
        positive("lane_width", self.lanes.lane_width)?;
        positive("max_lane_offset", self.lanes.max_lane_offset)?;
        positive("optimal_speed", self.speed.optimal_speed)?;
        positive("accel_step", self.speed.accel_step)?;
        positive("brake_step", self.speed.brake_step)?;
        positive("speed_unit_per_mps", self.speed.speed_unit_per_mps)?;
        positive("critical_cost", self.lane_change.critical_cost)?;
        positive("max_lane_change_cost", self.lane_change.max_lane_change_cost)?;
        positive("safety_buffer", self.lane_change.safety_buffer)?;
        if self.lane_change.max_left_lane_bias == 0 {
            return Err(RoboticsError::InvalidParameter(
                "max_left_lane_bias must be at least 1".to_string(),
            ));
        }
        if !(self.lane_change.closing_horizon >= 0.0) {
            return Err(RoboticsError::InvalidParameter(
                "closing_horizon must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.lane_change.min_speed_ratio) {
            return Err(RoboticsError::InvalidParameter(
                "min_speed_ratio must lie in [0, 1]".to_string(),
            ));
        }
        positive("tick_duration", self.trajectory.tick_duration)?;
        positive("anchor_spacing", self.trajectory.anchor_spacing)?;
        positive("pacing_offset", self.trajectory.pacing_offset)?;
        positive("backprojection_distance", self.trajectory.backprojection_distance)?;
        if self.trajectory.horizon_points == 0 {
            return Err(RoboticsError::InvalidParameter("horizon_points must be at least 1".to_string()));
        }
        if self.trajectory.anchor_count == 0 {
            return Err(RoboticsError::InvalidParameter("anchor_count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Convert a speed in the external unit to metres per second
    pub fn to_mps(&self, speed: f64) -> f64 {
        speed / self.speed.speed_unit_per_mps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = HighwayPlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lanes.lane_count, 3);
        assert_eq!(config.trajectory.horizon_points, 50);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "lanes:\n  lane_count: 4\nspeed:\n  optimal_speed: 60.0\n";
        let config = HighwayPlannerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.lanes.lane_count, 4);
        assert_eq!(config.lanes.lane_width, 4.0);
        assert_eq!(config.speed.optimal_speed, 60.0);
        assert_eq!(config.speed.accel_step, 0.224);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = HighwayPlannerConfig::from_yaml_str("lanes:\n  lane_width: -1.0\n").unwrap_err();
        assert!(matches!(err, RoboticsError::InvalidParameter(_)));

        let err = HighwayPlannerConfig::from_yaml_str("lanes:\n  lane_count: 0\n").unwrap_err();
        assert!(matches!(err, RoboticsError::InvalidParameter(_)));
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/highway_planner.yaml");
        let config = HighwayPlannerConfig::from_yaml_file(path).unwrap();
        assert_eq!(config, HighwayPlannerConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = HighwayPlannerConfig::from_yaml_file("/nonexistent/planner.yaml").unwrap_err();
        assert!(matches!(err, RoboticsError::IoError(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = HighwayPlannerConfig::from_yaml_str("lanes: [").unwrap_err();
        assert!(matches!(err, RoboticsError::ConfigError(_)));
    }

    #[test]
    fn test_lane_geometry() {
        let lanes = LaneConfig::default();
        assert_eq!(lanes.lane_of(2.0), 0);
        assert_eq!(lanes.lane_of(6.0), 1);
        assert_eq!(lanes.lane_of(11.9), 2);
        assert_eq!(lanes.lane_of(-0.5), 0);
        assert_eq!(lanes.lane_of(13.0), 2);
        assert_eq!(lanes.lane_center(2), 10.0);
        assert!((lanes.lane_offset(6.5) - 0.5).abs() < 1e-12);
        assert!(lanes.contains(1, 5.0));
        assert!(!lanes.contains(1, 8.0));
    }

    #[test]
    fn test_occupied_lanes_while_straddling() {
        let lanes = LaneConfig::default();
        assert_eq!(lanes.occupied_lanes(6.0), vec![1]);
        assert_eq!(lanes.occupied_lanes(7.5), vec![1, 2]);
        assert_eq!(lanes.occupied_lanes(4.5), vec![1, 0]);
        // No lane beyond the road edges
        assert_eq!(lanes.occupied_lanes(0.5), vec![0]);
        assert_eq!(lanes.occupied_lanes(11.5), vec![2]);
    }

    #[test]
    fn test_to_mps() {
        let config = HighwayPlannerConfig::default();
        assert!((config.to_mps(22.4) - 10.0).abs() < 1e-12);
    }
}
