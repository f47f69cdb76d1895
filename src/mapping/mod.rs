// Road geometry module

pub mod waypoints;
pub mod road_map;

pub use waypoints::*;
pub use road_map::*;
