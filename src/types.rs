//! Core data types for serialplot-rs
//!
//! This module contains the data structures shared by the trace buffer,
//! the session and the renderer.
//!
//! # Main Types
//!
//! - [`Trace`] - A named, append-only series of `(x, y)` samples
//! - [`LegendEntry`] - Name/index/color triple for the plot legend
//! - [`ConnectionStatus`] - State of the serial link
//! - [`LinkStats`] - Counters describing what the link has delivered
//!
//! # Colors
//!
//! Trace colors come from [`color_for`], which depends only on the trace's
//! creation index. Reordering header columns therefore never recolors a trace.

/// Maximum number of points to render per line for performance
pub const MAX_RENDER_POINTS: usize = 5000;

/// RGBA color
pub type Color = [u8; 4];

/// A single named time series
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Column name as received in the header
    pub name: String,
    /// Creation index, stable for the lifetime of the buffer
    pub index: usize,
    /// Accumulated samples as `[x, y]`
    pub points: Vec<[f64; 2]>,
    /// Whether this trace has been seen at a value column (not the x column)
    pub plotted: bool,
}

impl Trace {
    /// Create an empty trace
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            points: Vec::new(),
            plotted: false,
        }
    }

    /// Append a sample
    pub fn push(&mut self, x: f64, y: f64) {
        self.points.push([x, y]);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Display color derived from the creation index
    pub fn color(&self) -> Color {
        color_for(self.index)
    }
}

/// Legend row for a plotted trace
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub index: usize,
    pub color: Color,
}

/// Generate a distinct color based on a trace index
///
/// Uses the golden ratio to spread hues evenly across the color wheel, with
/// medium saturation and value so traces stay visible on light and dark themes.
pub fn color_for(index: usize) -> Color {
    const GOLDEN_RATIO: f64 = 0.618033988749895;

    // Reduce first so large indices keep full precision
    let hue = ((index as f64 * GOLDEN_RATIO) % 1.0) as f32 * 360.0;

    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.85);
    [r, g, b, 255]
}

/// Convert HSV (hue 0-360, saturation 0-1, value 0-1) to RGB (u8, u8, u8)
fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Represents the connection status of the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No port open
    #[default]
    Disconnected,
    /// Opening or resetting the port
    Connecting,
    /// Port open and being polled
    Connected,
    /// Last open or read failed
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Statistics about what the serial link delivered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Complete lines taken off the link
    pub lines_received: u64,
    /// Lines classified as headers
    pub headers: u64,
    /// Lines classified as data rows and accepted
    pub data_rows: u64,
    /// Lines dropped by the classifier
    pub unusable_lines: u64,
    /// Data rows rejected for disagreeing with the header width
    pub shape_mismatches: u64,
    /// Lines that contained invalid UTF-8
    pub decode_replacements: u64,
    /// Lines discarded by framing for exceeding the length cap
    pub overlong_lines: u64,
    /// Failed reads from the port, transient or not
    pub read_errors: u64,
    /// Raw bytes read from the port
    pub bytes_read: u64,
}
