//! Common traits defining interfaces at the planner seams

use crate::common::error::RoboticsResult;
use crate::common::types::*;

/// A 1D curve `y = f(x)` passing through every sample it was fitted to.
///
/// The trajectory synthesizer only needs `fit` and `eval`, so the concrete
/// interpolation scheme can be swapped without touching its geometry.
pub trait InterpolatingCurve: Sized {
    /// Fit a curve through `(x[i], y[i])`; `x` must be strictly increasing.
    fn fit(x: &[f64], y: &[f64]) -> RoboticsResult<Self>;

    /// Evaluate the curve at `x`
    fn eval(&self, x: f64) -> f64;
}

/// Trait for per-tick trajectory planners
pub trait TrajectoryPlanner {
    /// Input for one planning tick
    type Input;

    /// Plan the next trajectory from one input snapshot
    fn plan_trajectory(&self, input: &Self::Input) -> RoboticsResult<Path2D>;
}
