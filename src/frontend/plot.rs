//! Plot rendering module using egui_plot
//!
//! Draws every plotted trace of a [`TraceSnapshot`] as one line, in the
//! trace's stable color, with a legend naming the value columns.
//!
//! # Features
//!
//! - **Follow mode**: Bounds track the data as it arrives
//! - **Free mode**: Zoom and pan without the view jumping back
//! - **Display thinning**: Long traces are decimated before drawing

use crate::buffer::{SeriesSnapshot, TraceSnapshot};
use crate::config::UiConfig;
use crate::types::Color;
use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoints};

/// Fraction of the value range added above and below the data
const Y_MARGIN: f64 = 0.05;

/// Plot view configuration and state
#[derive(Debug, Clone)]
pub struct PlotView {
    /// Whether to show the legend
    pub show_legend: bool,
    /// Whether to show grid lines
    pub show_grid: bool,
    /// Line width for all traces
    pub line_width: f32,
    /// Whether the bounds follow the data
    pub follow_latest: bool,
    /// Points drawn per trace
    pub max_render_points: usize,
}

impl Default for PlotView {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_grid: true,
            line_width: 1.5,
            follow_latest: true,
            max_render_points: crate::types::MAX_RENDER_POINTS,
        }
    }
}

impl PlotView {
    /// Create a new PlotView from UI configuration
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            show_legend: config.show_legend,
            show_grid: config.show_grid,
            line_width: config.line_width,
            max_render_points: config.max_render_points,
            ..Default::default()
        }
    }

    /// Render the snapshot
    pub fn render(&mut self, ui: &mut Ui, snapshot: &TraceSnapshot) {
        let x_label = snapshot
            .header
            .first()
            .cloned()
            .unwrap_or_else(|| "x".to_string());

        let mut plot = Plot::new("serial_plot")
            .allow_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .show_axes(true)
            .show_grid(self.show_grid)
            .x_axis_label(x_label)
            .y_axis_label("Value");

        if self.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }

        let follow = self.follow_latest;
        let bounds = data_bounds(snapshot);

        let response = plot.show(ui, |plot_ui| {
            if follow {
                if let Some((min, max)) = bounds {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
                }
            }

            for series in &snapshot.series {
                if series.points.is_empty() {
                    continue;
                }
                plot_ui.line(self.series_line(series));
            }
        });

        // Any manual navigation leaves follow mode; double-click re-enters it
        if response.response.double_clicked() {
            self.follow_latest = true;
        } else if response.response.dragged() || plot_was_scrolled(ui, &response.response) {
            self.follow_latest = false;
        }
    }

    fn series_line(&self, series: &SeriesSnapshot) -> Line<'static> {
        Line::new(series.name.clone(), PlotPoints::from(series.points.clone()))
            .color(to_color32(series.color))
            .width(self.line_width)
    }

    /// Return to following the data
    pub fn reset_view(&mut self) {
        self.follow_latest = true;
    }
}

fn plot_was_scrolled(ui: &Ui, response: &egui::Response) -> bool {
    response.hovered() && ui.input(|i| i.smooth_scroll_delta != egui::Vec2::ZERO)
}

/// Convert a trace color to an egui color
pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3])
}

/// Bounds enclosing every plotted point, with a small vertical margin
///
/// Returns `None` when nothing has been plotted yet.
pub fn data_bounds(snapshot: &TraceSnapshot) -> Option<([f64; 2], [f64; 2])> {
    let mut points = snapshot
        .series
        .iter()
        .flat_map(|s| s.points.iter())
        .filter(|p| p[0].is_finite() && p[1].is_finite());

    let first = points.next()?;
    let (mut x_min, mut x_max) = (first[0], first[0]);
    let (mut y_min, mut y_max) = (first[1], first[1]);
    for p in points {
        x_min = x_min.min(p[0]);
        x_max = x_max.max(p[0]);
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }

    if x_max <= x_min {
        x_min -= 0.5;
        x_max += 0.5;
    }
    let margin = if y_max > y_min {
        (y_max - y_min) * Y_MARGIN
    } else {
        1.0
    };

    Some(([x_min, y_min - margin], [x_max, y_max + margin]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, index: usize, points: Vec<[f64; 2]>) -> SeriesSnapshot {
        SeriesSnapshot {
            name: name.to_string(),
            index,
            color: crate::types::color_for(index),
            points,
        }
    }

    #[test]
    fn test_plot_view_default() {
        let view = PlotView::default();
        assert!(view.show_legend);
        assert!(view.show_grid);
        assert!(view.follow_latest);
        assert_eq!(view.max_render_points, crate::types::MAX_RENDER_POINTS);
    }

    #[test]
    fn test_from_config() {
        let config = UiConfig {
            show_grid: false,
            line_width: 3.0,
            max_render_points: 100,
            ..Default::default()
        };
        let view = PlotView::from_config(&config);
        assert!(!view.show_grid);
        assert_eq!(view.line_width, 3.0);
        assert_eq!(view.max_render_points, 100);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(data_bounds(&TraceSnapshot::default()).is_none());
    }

    #[test]
    fn test_bounds_span_all_series() {
        let snapshot = TraceSnapshot {
            generation: 1,
            header: vec!["t".into(), "a".into(), "b".into()],
            series: vec![
                series("a", 1, vec![[0.0, 1.0], [1.0, 3.0]]),
                series("b", 2, vec![[2.0, -1.0]]),
            ],
        };

        let (min, max) = data_bounds(&snapshot).unwrap();
        assert_eq!(min[0], 0.0);
        assert_eq!(max[0], 2.0);
        assert!((min[1] - -1.2).abs() < 1e-9);
        assert!((max[1] - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_single_point_are_not_degenerate() {
        let snapshot = TraceSnapshot {
            series: vec![series("a", 1, vec![[5.0, 2.0]])],
            ..Default::default()
        };

        let (min, max) = data_bounds(&snapshot).unwrap();
        assert!(max[0] > min[0]);
        assert!(max[1] > min[1]);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(
            to_color32([10, 20, 30, 255]),
            Color32::from_rgb(10, 20, 30)
        );
    }
}
