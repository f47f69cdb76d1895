//! Visualization utilities for rust_highway_planning
//!
//! Plots the road, traffic and planned trajectories with gnuplot. Series
//! are collected first and drawn into a single set of axes on output.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Path2D, Point2D, Pose2D, RoboticsError, RoboticsResult};
use crate::mapping::RoadMap;
use crate::path_planning::highway::config::LaneConfig;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const ROAD_EDGE: &str = BLACK;
    pub const LANE_MARKING: &str = GRAY;
    pub const TRAJECTORY: &str = RED;
    pub const EGO: &str = "#35C788";
    pub const VEHICLE: &str = BLUE;
    pub const DRIVEN: &str = ORANGE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::TRAJECTORY, "Trajectory")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Main visualizer struct
pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Zoom onto a square window around `center`
    pub fn focus(&mut self, center: Point2D, half_width: f64) -> &mut Self {
        self.set_x_range(center.x - half_width, center.x + half_width)
            .set_y_range(center.y - half_width, center.y + half_width)
    }

    /// Number of series queued for drawing
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: path.x_coords(),
            y: path.y_coords(),
            style: style.clone(),
        });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Road edges and lane markings, sampled every `ds` metres
    pub fn plot_road(&mut self, road: &RoadMap, lanes: &LaneConfig, ds: f64) -> RoboticsResult<&mut Self> {
        for boundary in 0..=lanes.lane_count {
            let d = boundary as f64 * lanes.lane_width;
            let line = road.polyline_at_offset(d, ds)?;
            let style = if boundary == 0 || boundary == lanes.lane_count {
                PathStyle::new(colors::ROAD_EDGE, "").with_line_width(1.5)
            } else {
                PathStyle::new(colors::LANE_MARKING, "").with_line_width(0.5)
            };
            self.plot_path(&line, &style);
        }
        Ok(self)
    }

    /// Tracked vehicles at their reported positions
    pub fn plot_vehicles(&mut self, positions: &[Point2D]) -> &mut Self {
        self.plot_points(
            positions,
            &PointStyle::new(colors::VEHICLE, "Traffic").with_symbol('S').with_size(1.2),
        )
    }

    /// Ego vehicle with a heading indicator
    pub fn plot_ego(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::EGO, "Ego").with_size(size));

        let arrow_len = size * 2.0;
        let tip = Point2D::new(pose.x + arrow_len * pose.yaw.cos(), pose.y + arrow_len * pose.yaw.sin());
        self.plot_path(
            &Path2D::from_points(vec![pose.position(), tip]),
            &PathStyle::new(colors::EGO, ""),
        )
    }

    pub fn show(&mut self) -> RoboticsResult<()> {
        let mut figure = self.render();
        figure.show().map_err(plot_error)?;
        Ok(())
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> RoboticsResult<()> {
        self.render().save_to_png(path, width, height).map_err(plot_error)
    }

    pub fn save_svg(&mut self, path: &str) -> RoboticsResult<()> {
        self.render().save_to_svg(path, 800, 600).map_err(plot_error)
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

fn plot_error<E: std::fmt::Display>(err: E) -> RoboticsError {
    RoboticsError::IoError(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
}
