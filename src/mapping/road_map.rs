//! Road geometry model
//!
//! Holds the cyclic table of centre-line waypoints and converts between
//! planar `(x, y)` and road-relative Frenet `(s, d)` coordinates. `d` grows
//! to the right of the direction of travel, so lane 0 is the left-most lane.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::path::Path;

use crate::common::{normalize_angle, FrenetPoint, Path2D, Point2D, RoboticsError, RoboticsResult};
use crate::mapping::waypoints::{load_waypoints, Waypoint};

/// How `to_frenet` decides whether a point lies left (negative `d`) or
/// right (positive `d`) of the centre line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LateralSign {
    /// A fixed point on the left of the whole track (inside a loop driven
    /// counter-clockwise). Points closer to it than their projection onto
    /// the centre line are on the left.
    ReferencePoint(Point2D),
    /// Use the lateral unit normal stored with each waypoint
    WaypointNormal,
}

impl Default for LateralSign {
    fn default() -> Self {
        LateralSign::ReferencePoint(Point2D::new(1000.0, 2000.0))
    }
}

/// Road centre line with Frenet conversions
#[derive(Debug, Clone)]
pub struct RoadMap {
    waypoints: Vec<Waypoint>,
    track_length: f64,
    lateral_sign: LateralSign,
}

impl RoadMap {
    /// Build a road map; `track_length` is the `s` value at which the track wraps to 0
    pub fn new(waypoints: Vec<Waypoint>, track_length: f64) -> RoboticsResult<Self> {
        if waypoints.len() < 2 {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        if let Some(i) = waypoints.iter().position(|w| !w.is_finite()) {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "non-finite value in waypoint {}",
                i
            )));
        }
        if waypoints[0].s < 0.0 {
            return Err(RoboticsError::MalformedGeometryTable(
                "first waypoint has negative s".to_string(),
            ));
        }
        if let Some(i) = waypoints.windows(2).position(|w| w[1].s <= w[0].s) {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "s is not strictly increasing at waypoint {}",
                i + 1
            )));
        }
        let last_s = waypoints[waypoints.len() - 1].s;
        if !track_length.is_finite() || track_length <= last_s {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "track length {} must exceed last waypoint s {}",
                track_length, last_s
            )));
        }

        Ok(RoadMap {
            waypoints,
            track_length,
            lateral_sign: LateralSign::default(),
        })
    }

    /// Load the waypoint table from a map file
    pub fn from_file<P: AsRef<Path>>(path: P, track_length: f64) -> RoboticsResult<Self> {
        Self::new(load_waypoints(path)?, track_length)
    }

    /// Counter-clockwise circular track, handy for simulation and tests
    pub fn circular(center: Point2D, radius: f64, count: usize) -> RoboticsResult<Self> {
        if count < 3 || !(radius > 0.0) {
            return Err(RoboticsError::InvalidParameter(
                "circular track needs radius > 0 and at least 3 waypoints".to_string(),
            ));
        }
        let step = 2.0 * PI / count as f64;
        let chord = 2.0 * radius * (step / 2.0).sin();

        let waypoints = (0..count)
            .map(|i| {
                let theta = i as f64 * step;
                Waypoint::new(
                    center.x + radius * theta.cos(),
                    center.y + radius * theta.sin(),
                    i as f64 * chord,
                    theta.cos(),
                    theta.sin(),
                )
            })
            .collect();

        Ok(Self::new(waypoints, count as f64 * chord)?
            .with_lateral_sign(LateralSign::ReferencePoint(center)))
    }

    pub fn with_lateral_sign(mut self, lateral_sign: LateralSign) -> Self {
        self.lateral_sign = lateral_sign;
        self
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    /// Wrap `s` into `[0, track_length)`
    pub fn wrap_s(&self, s: f64) -> f64 {
        s.rem_euclid(self.track_length)
    }

    /// Shortest signed along-track distance from `from_s` to `to_s`;
    /// positive when `to_s` is ahead.
    pub fn signed_gap(&self, from_s: f64, to_s: f64) -> f64 {
        let gap = (to_s - from_s).rem_euclid(self.track_length);
        if gap > self.track_length / 2.0 {
            gap - self.track_length
        } else {
            gap
        }
    }

    /// Index of the waypoint closest to `p`
    pub fn closest_waypoint(&self, p: Point2D) -> usize {
        let mut closest = 0;
        let mut closest_dist = f64::INFINITY;
        for (i, wp) in self.waypoints.iter().enumerate() {
            let dist = p.distance(&wp.position());
            if dist < closest_dist {
                closest_dist = dist;
                closest = i;
            }
        }
        closest
    }

    /// Index of the next waypoint in the direction of travel
    pub fn next_waypoint(&self, p: Point2D, heading: f64) -> usize {
        let closest = self.closest_waypoint(p);
        let bearing = p.bearing_to(&self.waypoints[closest].position());
        let angle = normalize_angle(heading - bearing).abs();

        if angle > FRAC_PI_4 {
            (closest + 1) % self.waypoints.len()
        } else {
            closest
        }
    }

    /// Planar to Frenet coordinates
    pub fn to_frenet(&self, x: f64, y: f64, heading: f64) -> FrenetPoint {
        let p = Point2D::new(x, y);
        let next = self.next_waypoint(p, heading);
        let prev = if next == 0 { self.waypoints.len() - 1 } else { next - 1 };

        let a = self.waypoints[prev];
        let b = self.waypoints[next];
        let (n_x, n_y) = (b.x - a.x, b.y - a.y);
        let (x_x, x_y) = (x - a.x, y - a.y);

        let seg_len = (n_x * n_x + n_y * n_y).sqrt();
        let proj_norm = if seg_len > 0.0 {
            (x_x * n_x + x_y * n_y) / (seg_len * seg_len)
        } else {
            0.0
        };
        let (proj_x, proj_y) = (proj_norm * n_x, proj_norm * n_y);

        let mut d = (x_x - proj_x).hypot(x_y - proj_y);
        let on_left = match self.lateral_sign {
            LateralSign::ReferencePoint(center) => {
                let (c_x, c_y) = (center.x - a.x, center.y - a.y);
                let center_to_pos = (c_x - x_x).hypot(c_y - x_y);
                let center_to_ref = (c_x - proj_x).hypot(c_y - proj_y);
                center_to_pos <= center_to_ref
            }
            LateralSign::WaypointNormal => (x_x - proj_x) * a.dx + (x_y - proj_y) * a.dy < 0.0,
        };
        if on_left {
            d = -d;
        }

        FrenetPoint::new(self.wrap_s(a.s + proj_norm * seg_len), d)
    }

    /// Frenet to planar coordinates
    pub fn to_cartesian(&self, s: f64, d: f64) -> RoboticsResult<Point2D> {
        let s = self.wrap_s(s);
        let count = self.waypoints.partition_point(|wp| wp.s <= s);
        if count == 0 {
            return Err(RoboticsError::InsufficientWaypoints { s });
        }
        let prev = count - 1;
        let next = count % self.waypoints.len();

        let a = self.waypoints[prev];
        let heading = a.position().bearing_to(&self.waypoints[next].position());
        let seg_s = s - a.s;

        let seg_x = a.x + seg_s * heading.cos();
        let seg_y = a.y + seg_s * heading.sin();

        let perp_heading = heading - FRAC_PI_2;
        Ok(Point2D::new(
            seg_x + d * perp_heading.cos(),
            seg_y + d * perp_heading.sin(),
        ))
    }

    /// Polyline following the road at a constant lateral offset, one point every `ds` metres
    pub fn polyline_at_offset(&self, d: f64, ds: f64) -> RoboticsResult<Path2D> {
        if !(ds > 0.0) {
            return Err(RoboticsError::InvalidParameter("ds must be positive".to_string()));
        }
        let n = (self.track_length / ds).ceil() as usize;
        let mut path = Path2D::with_capacity(n + 1);
        for i in 0..=n {
            let s = (i as f64 * ds).min(self.track_length - 1e-9);
            path.push(self.to_cartesian(s, d)?);
        }
        Ok(path)
    }
}
