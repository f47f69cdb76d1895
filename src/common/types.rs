//! Common types used throughout rust_highway_planning

use nalgebra::{Isometry2, Point2, UnitComplex, Vector2};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Bearing from this point towards `other` [rad]
    pub fn bearing_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Point2<f64>> for Point2D {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Point2D> for Point2<f64> {
    fn from(p: Point2D) -> Self {
        Point2::new(p.x, p.y)
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Rigid transform taking points from this pose's local frame to the world frame
    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(Vector2::new(self.x, self.y), self.yaw)
    }

    /// Express a world point in the frame centred on this pose, x-axis along the heading
    pub fn to_local(&self, p: Point2D) -> Point2D {
        self.to_isometry().inverse_transform_point(&p.into()).into()
    }

    /// Inverse of [`Pose2D::to_local`]
    pub fn to_world(&self, p: Point2D) -> Point2D {
        self.to_isometry().transform_point(&p.into()).into()
    }
}

/// Frenet (road-relative) coordinates: along-track `s`, lateral offset `d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetPoint {
    pub s: f64,
    pub d: f64,
}

impl FrenetPoint {
    pub fn new(s: f64, d: f64) -> Self {
        Self { s, d }
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone, PartialEq)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn from_xy(x: &[f64], y: &[f64]) -> Self {
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&Point2D> {
        self.points.last()
    }

    /// Last two points, oldest first
    pub fn last_two(&self) -> Option<(Point2D, Point2D)> {
        match self.points.len() {
            n if n >= 2 => Some((self.points[n - 2], self.points[n - 1])),
            _ => None,
        }
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize angle to (-pi, pi]; constant time for any finite input
pub fn normalize_angle(angle: f64) -> f64 {
    UnitComplex::new(angle).angle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose_local_world_roundtrip() {
        let pose = Pose2D::new(10.0, -4.0, 0.7);
        let p = Point2D::new(13.5, 2.25);
        let back = pose.to_world(pose.to_local(p));
        assert!(back.distance(&p) < 1e-9);
    }

    #[test]
    fn test_pose_local_axis_follows_heading() {
        // Facing +y: a point straight ahead ends up on the local +x axis
        let pose = Pose2D::new(1.0, 1.0, FRAC_PI_2);
        let local = pose.to_local(Point2D::new(1.0, 6.0));
        assert!((local.x - 5.0).abs() < 1e-9);
        assert!(local.y.abs() < 1e-9);
    }

    #[test]
    fn test_path2d_total_length() {
        let path = Path2D::from_xy(&[0.0, 1.0, 1.0], &[0.0, 0.0, 1.0]);
        assert!((path.total_length() - 2.0).abs() < 1e-10);
        assert_eq!(path.last_two(), Some((Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0))));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-10);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-10);
        assert!((normalize_angle(0.3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_huge_angle_terminates() {
        for &angle in &[1e17, -1e17, 1e300, f64::MAX] {
            let a = normalize_angle(angle);
            assert!(a.is_finite());
            assert!(a.abs() <= PI + 1e-12);
        }
    }
}
