//! Road reference waypoints and the plain-text map table they are loaded from.
//!
//! One waypoint per line, five whitespace-separated columns:
//! `x y s dx dy` where `(dx, dy)` is the unit normal pointing to the right
//! of the direction of travel.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::common::{Point2D, RoboticsError, RoboticsResult};

/// Reference point on the road centre line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Along-track coordinate [m]
    pub s: f64,
    /// Lateral unit normal, x component
    pub dx: f64,
    /// Lateral unit normal, y component
    pub dy: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, s: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, s, dx, dy }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn normal(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }

    pub(crate) fn is_finite(&self) -> bool {
        [self.x, self.y, self.s, self.dx, self.dy].iter().all(|v| v.is_finite())
    }
}

/// Parse a waypoint table from any reader
pub fn parse_waypoints<R: Read>(reader: R) -> RoboticsResult<Vec<Waypoint>> {
    let mut waypoints = Vec::new();

    for (line_no, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let values = trimmed
            .split_whitespace()
            .map(|field| field.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| {
                RoboticsError::MalformedGeometryTable(format!("line {}: {}", line_no + 1, e))
            })?;

        if values.len() != 5 {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "line {}: expected 5 columns (x y s dx dy), found {}",
                line_no + 1,
                values.len()
            )));
        }

        let wp = Waypoint::new(values[0], values[1], values[2], values[3], values[4]);
        if !wp.is_finite() {
            return Err(RoboticsError::MalformedGeometryTable(format!(
                "line {}: non-finite value",
                line_no + 1
            )));
        }
        waypoints.push(wp);
    }

    Ok(waypoints)
}

/// Load a waypoint table from a file
pub fn load_waypoints<P: AsRef<Path>>(path: P) -> RoboticsResult<Vec<Waypoint>> {
    let file = File::open(path.as_ref())?;
    let waypoints = parse_waypoints(file)?;
    log::info!(
        "loaded {} waypoints from {}",
        waypoints.len(),
        path.as_ref().display()
    );
    Ok(waypoints)
}
