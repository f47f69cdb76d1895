//! Utility modules for rust_highway_planning

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
