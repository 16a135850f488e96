//! Error handling for serialplot-rs
//!
//! This module defines the error type and Result alias shared by the
//! trace buffer, the serial transport and the configuration layer.
//!
//! Lines that cannot be classified are deliberately absent here: they are
//! reported as [`ClassifiedLine::Unusable`](crate::classifier::ClassifiedLine)
//! values and never surface as errors.

use thiserror::Error;

/// Main error type for serialplot-rs operations
#[derive(Error, Debug)]
pub enum SerialPlotError {
    /// A data row disagrees with the width of the active header
    #[error("Shape mismatch: header has {expected} columns but row has {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Data arrived while no header was set
    #[error("No header set; cannot accept data rows")]
    MissingHeader,

    /// Errors raised by the serial port driver
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// A read was attempted without an open port
    #[error("Serial port is not open")]
    NotConnected,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SerialPlotError>,
    },
}

impl SerialPlotError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SerialPlotError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a shape mismatch
    pub fn is_shape_mismatch(&self) -> bool {
        match self {
            SerialPlotError::ShapeMismatch { .. } => true,
            SerialPlotError::WithContext { source, .. } => source.is_shape_mismatch(),
            _ => false,
        }
    }

    /// Whether this error is a momentary transport hiccup worth retrying
    ///
    /// Interrupted, would-block and timed-out I/O leave the port usable.
    pub fn is_transient(&self) -> bool {
        match self {
            SerialPlotError::Io(e) => is_transient_io(e.kind()),
            SerialPlotError::Serial(e) => {
                matches!(e.kind, serialport::ErrorKind::Io(kind) if is_transient_io(kind))
            }
            SerialPlotError::WithContext { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

/// I/O error kinds after which a read can simply be retried
pub(crate) fn is_transient_io(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind;
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

/// Result type alias for serialplot-rs operations
pub type Result<T> = std::result::Result<T, SerialPlotError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serialport::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SerialPlotError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SerialPlotError::from(e).with_context(f()))
    }
}
