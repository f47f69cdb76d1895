//! Error types for rust_highway_planning

use std::fmt;

/// Main error type for the highway planner
#[derive(Debug)]
pub enum RoboticsError {
    /// Waypoint table cannot describe a road (too short, non-monotonic `s`, ...)
    MalformedGeometryTable(String),
    /// Along-track lookup fell outside every known segment
    InsufficientWaypoints { s: f64 },
    /// Interpolating curve could not be fitted through the anchors
    CurveFit(String),
    /// Input snapshot rejected before planning
    InvalidSnapshot(String),
    /// Invalid parameter
    InvalidParameter(String),
    /// I/O error
    IoError(std::io::Error),
    /// Configuration file could not be parsed
    ConfigError(serde_yaml::Error),
}

impl fmt::Display for RoboticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoboticsError::MalformedGeometryTable(msg) => write!(f, "Malformed geometry table: {}", msg),
            RoboticsError::InsufficientWaypoints { s } => {
                write!(f, "Insufficient waypoints: no segment contains s = {:.3}", s)
            }
            RoboticsError::CurveFit(msg) => write!(f, "Curve fit error: {}", msg),
            RoboticsError::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            RoboticsError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            RoboticsError::IoError(e) => write!(f, "I/O error: {}", e),
            RoboticsError::ConfigError(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for RoboticsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoboticsError::IoError(e) => Some(e),
            RoboticsError::ConfigError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RoboticsError {
    fn from(e: std::io::Error) -> Self {
        RoboticsError::IoError(e)
    }
}

impl From<serde_yaml::Error> for RoboticsError {
    fn from(e: serde_yaml::Error) -> Self {
        RoboticsError::ConfigError(e)
    }
}

/// Result type alias for planner operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoboticsError::CurveFit("x must be strictly increasing".to_string());
        assert_eq!(format!("{}", err), "Curve fit error: x must be strictly increasing");

        let err = RoboticsError::InsufficientWaypoints { s: 12.5 };
        assert_eq!(format!("{}", err), "Insufficient waypoints: no segment contains s = 12.500");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoboticsError = io_err.into();
        assert!(matches!(err, RoboticsError::IoError(_)));
    }

    #[test]
    fn test_error_from_yaml() {
        let yaml_err = serde_yaml::from_str::<Vec<f64>>("[1.0, oops").unwrap_err();
        let err: RoboticsError = yaml_err.into();
        assert!(matches!(err, RoboticsError::ConfigError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
