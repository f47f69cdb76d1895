// Highway driving simulation
//
// Closed loop on a circular three-lane track with random traffic. The
// controller consumes a few trajectory points per planning cycle and feeds
// the rest back as the pending tail, like a simulator with planning latency.
//
// Usage: highway_simulation [config.yaml]
use std::error::Error;

use itertools::Itertools;
use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::style::LineStyle;
use plotlib::view::ContinuousView;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use rust_highway_planning::common::{Path2D, Point2D, Pose2D};
use rust_highway_planning::mapping::RoadMap;
use rust_highway_planning::path_planning::highway::{
    EgoState, HighwayPlanner, HighwayPlannerConfig, LaneConfig, Snapshot, TrackedVehicle,
};
use rust_highway_planning::utils::{colors, PathStyle, Visualizer};

const TRACK_RADIUS: f64 = 1000.0;
const TRACK_WAYPOINTS: usize = 250;
const TRAFFIC_COUNT: usize = 12;
const POINTS_PER_CYCLE: usize = 5;
const CYCLES: usize = 1500;

struct Traffic {
    id: u64,
    s: f64,
    d: f64,
    speed: f64,
}

impl Traffic {
    fn step(&mut self, road: &RoadMap, dt: f64) {
        self.s = road.wrap_s(self.s + self.speed * dt);
    }

    fn observe(&self, road: &RoadMap) -> Result<TrackedVehicle, Box<dyn Error>> {
        let p = road.to_cartesian(self.s, self.d)?;
        let ahead = road.to_cartesian(self.s + 1.0, self.d)?;
        let heading = p.bearing_to(&ahead);
        Ok(TrackedVehicle::new(self.s, self.d, self.speed * heading.cos(), self.speed * heading.sin())
            .with_id(self.id)
            .with_position(p.x, p.y))
    }
}

fn spawn_traffic(road: &RoadMap, lanes: &LaneConfig) -> Result<Vec<Traffic>, Box<dyn Error>> {
    let mut rng = rand::thread_rng();
    // m/s, a little below the ego cruise speed of about 22 m/s
    let speeds = Normal::new(18.0, 2.5)?;

    Ok((0..TRAFFIC_COUNT)
        .map(|i| Traffic {
            id: i as u64,
            s: rng.gen_range(60.0..road.track_length() - 60.0),
            d: lanes.lane_center(rng.gen_range(0..lanes.lane_count)),
            speed: speeds.sample(&mut rng).max(8.0),
        })
        .collect())
}

fn load_config() -> Result<HighwayPlannerConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(HighwayPlannerConfig::from_yaml_file(path)?),
        None => Ok(HighwayPlannerConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let lanes = config.lanes.clone();
    let dt = config.trajectory.tick_duration;
    let unit = config.speed.speed_unit_per_mps;

    let road = RoadMap::circular(Point2D::origin(), TRACK_RADIUS, TRACK_WAYPOINTS)?;
    let planner = HighwayPlanner::new(road.clone(), config)?;
    let mut traffic = spawn_traffic(&road, &lanes)?;

    let start = road.to_cartesian(0.0, lanes.lane_center(1))?;
    let start_ahead = road.to_cartesian(1.0, lanes.lane_center(1))?;
    let mut ego = EgoState::new(start.x, start.y, 0.0, lanes.lane_center(1), start.bearing_to(&start_ahead), 0.0);
    let mut pending = Path2D::new();
    let mut driven = Path2D::new();
    let mut changing_ticks = 0;

    for cycle in 0..CYCLES {
        let vehicles = traffic.iter().map(|t| t.observe(&road)).collect::<Result<Vec<_>, _>>()?;
        let mut snapshot = Snapshot::new(ego).with_pending(pending.clone()).with_vehicles(vehicles);
        if let Some((prev, last)) = pending.last_two() {
            snapshot = snapshot.with_end_path_s(road.to_frenet(last.x, last.y, prev.bearing_to(&last)).s);
        }

        let report = match planner.plan(&snapshot) {
            Ok(report) => report,
            Err(err) => {
                log::error!("cycle {}: {}", cycle, err);
                break;
            }
        };
        if report.target_lane != lanes.lane_of(ego.d) {
            changing_ticks += 1;
        }

        // Drive along the first points, hand the rest back next cycle
        let consumed = POINTS_PER_CYCLE.min(report.trajectory.len());
        let (done, rest) = report.trajectory.points.split_at(consumed);
        let mut prev = driven.last().copied().unwrap_or_else(|| ego.position());
        for &p in done {
            let heading = if p.distance(&prev) > 1e-6 { prev.bearing_to(&p) } else { ego.yaw };
            let frenet = road.to_frenet(p.x, p.y, heading);
            let speed = p.distance(&prev) / dt * unit;
            ego = EgoState::new(p.x, p.y, frenet.s, frenet.d, heading, speed);
            driven.push(p);
            prev = p;
        }
        pending = Path2D::from_points(rest.to_vec());

        for t in traffic.iter_mut() {
            t.step(&road, dt * consumed as f64);
        }

        if cycle % 100 == 0 {
            log::info!(
                "cycle {:4}: s = {:7.1} d = {:5.2} speed = {:5.2} mph, {}",
                cycle,
                ego.s,
                ego.d,
                ego.speed,
                report.behavior
            );
        }
    }

    let speeds: Vec<(f64, f64)> = driven
        .points
        .iter()
        .tuple_windows()
        .enumerate()
        .map(|(i, (a, b))| ((i + 1) as f64 * dt, a.distance(b) / dt * unit))
        .collect();
    let max_speed = speeds.iter().map(|&(_, v)| v).fold(0.0, f64::max);
    log::info!(
        "drove {:.1} m, max speed {:.2} mph, {} ticks steering for another lane",
        driven.total_length(),
        max_speed,
        changing_ticks
    );

    std::fs::create_dir_all("./img")?;

    let profile = Plot::new(speeds).line_style(LineStyle::new().colour(colors::EGO).width(1.5));
    let view = ContinuousView::new()
        .add(profile)
        .x_label("t [s]")
        .y_label("speed [mph]");
    Page::single(&view)
        .save("./img/highway_speed.svg")
        .map_err(|e| e.to_string())?;

    let mut vis = Visualizer::new();
    vis.set_title("Highway planning");
    vis.plot_road(&road, &lanes, 5.0)?;
    vis.plot_path(&driven, &PathStyle::new(colors::DRIVEN, "Driven").with_line_width(1.0));
    vis.plot_path(&pending, &PathStyle::default());
    let traffic_positions = traffic
        .iter()
        .map(|t| road.to_cartesian(t.s, t.d))
        .collect::<Result<Vec<_>, _>>()?;
    vis.plot_vehicles(&traffic_positions);
    vis.plot_ego(&Pose2D::new(ego.x, ego.y, ego.yaw), 1.0);
    vis.focus(ego.position(), 80.0);
    vis.save_png("./img/highway_simulation.png", 800, 800)?;

    Ok(())
}
