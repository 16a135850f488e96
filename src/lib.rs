//! # serialplot-rs: Real-time Serial Plotter
//!
//! Reads comma-separated telemetry lines from a serial port and plots every
//! numeric column against the first one. A line whose first field is not a
//! number names the columns; lines with fewer than five fields (boot
//! banners, debug prints) are ignored.
//!
//! ## Architecture
//!
//! - **Backend**: Serial transport ([`backend::LineSource`]) and line framing
//! - **Classifier**: Turns one decoded line into a header, a data row, or nothing
//! - **Buffer**: Named traces keyed by header column, with stable colors
//! - **Session**: Application context driven by [`session::SessionEvent`]s
//! - **Frontend**: eframe/egui UI with egui_plot for the graph
//!
//! ## Configuration
//!
//! Settings (last port, baud rate, plot preferences) are stored as TOML in the
//! platform config directory under `serialplot-rs`. Log files are written to
//! the matching data directory.
//!
//! ## Example
//!
//! ```ignore
//! use serialplot_rs::{classify, TraceBuffer};
//!
//! let mut buffer = TraceBuffer::new();
//! for line in ["Time,A,B,C,D", "0,1,2,3,4", "1,2,3,4,5"] {
//!     buffer.ingest(classify(line))?;
//! }
//! assert_eq!(buffer.get_series("D").unwrap(), &[[0.0, 4.0], [1.0, 5.0]]);
//! ```

pub mod app;
pub mod backend;
pub mod buffer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frontend;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use app::SerialPlotApp;
pub use backend::{LineAssembler, LineSource, SerialLineSource};
pub use buffer::{IngestOutcome, SharedTraceBuffer, TraceBuffer, TraceSnapshot};
pub use classifier::{classify, ClassifiedLine, UnusableReason};
pub use config::AppConfig;
pub use error::{Result, SerialPlotError};
pub use session::{Session, SessionEvent};
pub use types::{color_for, ConnectionStatus, LegendEntry, LinkStats, Trace};
