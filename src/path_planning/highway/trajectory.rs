//! Trajectory synthesis
//!
//! Anchors are placed on the target lane centre ahead of a reference pose,
//! moved into the reference frame (x-axis along the heading, so the curve
//! is a function of x), fitted with an [`InterpolatingCurve`] and resampled
//! at one point per tick. The unconsumed tail of the previous trajectory is
//! kept verbatim in front of the new points.

use crate::common::{InterpolatingCurve, Path2D, Point2D, Pose2D, RoboticsResult};
use crate::path_planning::highway::config::HighwayPlannerConfig;
use crate::path_planning::highway::snapshot::{EgoState, PlanningContext};

const COINCIDENT_EPS: f64 = 1e-6;

/// Reference pose the new points grow from, plus a point just behind it
/// so the fitted curve leaves the pose along its heading
pub fn reference_frame(ego: &EgoState, pending: &Path2D, backprojection: f64) -> (Pose2D, Point2D) {
    let behind = |pose: Pose2D| {
        Point2D::new(
            pose.x - backprojection * pose.yaw.cos(),
            pose.y - backprojection * pose.yaw.sin(),
        )
    };

    match (pending.last_two(), pending.last()) {
        (Some((prev, last)), _) if prev.distance(&last) > COINCIDENT_EPS => {
            (Pose2D::new(last.x, last.y, prev.bearing_to(&last)), prev)
        }
        // Stopped, or a single point left: keep its position, borrow the ego heading
        (_, Some(last)) => {
            let pose = Pose2D::new(last.x, last.y, ego.yaw);
            (pose, behind(pose))
        }
        (_, None) => {
            let pose = ego.pose();
            (pose, behind(pose))
        }
    }
}

/// Anchor points in the reference frame, sorted by construction along local x
pub fn local_anchors(
    ctx: &PlanningContext,
    reference: &Pose2D,
    behind: Point2D,
    target_lane: usize,
    config: &HighwayPlannerConfig,
) -> RoboticsResult<(Vec<f64>, Vec<f64>)> {
    let traj = &config.trajectory;
    let lane_d = config.lanes.lane_center(target_lane);

    let mut world = Vec::with_capacity(traj.anchor_count + 2);
    world.push(behind);
    world.push(reference.position());
    for i in 1..=traj.anchor_count {
        let s = ctx.ego.s + i as f64 * traj.anchor_spacing;
        world.push(ctx.road.to_cartesian(s, lane_d)?);
    }

    let (xs, ys) = world.into_iter().map(|p| reference.to_local(p)).map(|p| (p.x, p.y)).unzip();
    Ok((xs, ys))
}

/// Build the next trajectory: pending tail first, then freshly sampled points
pub fn synthesize<C: InterpolatingCurve>(
    ctx: &PlanningContext,
    pending: &Path2D,
    target_lane: usize,
    target_speed: f64,
    config: &HighwayPlannerConfig,
) -> RoboticsResult<Path2D> {
    let traj = &config.trajectory;
    let (reference, behind) = reference_frame(&ctx.ego, pending, traj.backprojection_distance);
    let (xs, ys) = local_anchors(ctx, &reference, behind, target_lane, config)?;
    let curve = C::fit(&xs, &ys)?;

    let mut trajectory = Path2D::with_capacity(traj.horizon_points.max(pending.len()));
    trajectory.points.extend_from_slice(&pending.points);

    // Pace along local x so consecutive points are one tick apart at the
    // target speed, measured on the chord to the pacing offset
    let offset = traj.pacing_offset;
    let target_distance = offset.hypot(curve.eval(offset));
    let step = offset * traj.tick_duration * config.to_mps(target_speed) / target_distance;

    let mut x = 0.0;
    for _ in pending.len()..traj.horizon_points {
        x += step;
        trajectory.push(reference.to_world(Point2D::new(x, curve.eval(x))));
    }

    log::trace!(
        "trajectory: {} reused + {} new points, step {:.3} m",
        pending.len(),
        trajectory.len() - pending.len(),
        step
    );
    Ok(trajectory)
}
