// Path Planning algorithms module

pub mod cubic_spline;
pub mod highway;

pub use cubic_spline::*;
pub use highway::*;
