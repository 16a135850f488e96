//! LineSource trait for a unified transport interface
//!
//! This module provides a common trait for anything that delivers raw
//! telemetry bytes, enabling both real serial ports and synthetic devices
//! for testing.

use crate::error::Result;

/// Unified interface for byte transports
///
/// Implementations must be `Send` so a source can be moved onto a reader
/// thread. Reads never block: when nothing is pending they return `Ok(0)`.
///
/// # Example
///
/// ```ignore
/// fn drain(source: &mut dyn LineSource) -> Result<Vec<u8>> {
///     let mut buf = Vec::new();
///     while source.read_available(&mut buf)? > 0 {}
///     Ok(buf)
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait LineSource: Send {
    /// Open the given port, closing any handle that is already open
    fn open(&mut self, port: &str, baud_rate: u32) -> Result<()>;

    /// Close the port; a no-op when nothing is open
    fn close(&mut self);

    /// Check if a port is currently open
    fn is_open(&self) -> bool;

    /// Append whatever bytes are pending to `buf` without blocking
    ///
    /// Returns the number of bytes appended.
    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize>;

    /// Reset the attached device and reopen the port
    ///
    /// The default implementation simply reopens the port.
    fn pulse_reset(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        self.close();
        self.open(port, baud_rate)
    }

    /// Human-readable description of the source
    fn description(&self) -> String;
}
