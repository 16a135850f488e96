//! Session: the application context that ties transport, parser and plot model together
//!
//! A [`Session`] owns everything the polling loop touches: the
//! [`LineSource`], the [`LineAssembler`], the [`SharedTraceBuffer`], the raw
//! line log, link statistics, and the selected port and baud rate. The
//! frontend never mutates any of it directly; it sends [`SessionEvent`]s to
//! [`Session::handle_event`].
//!
//! # Poll Step
//!
//! Each [`SessionEvent::Tick`] runs one [`Session::poll_step`]:
//!
//! 1. If no complete line is buffered, read whatever bytes are pending
//! 2. Take at most one complete line
//! 3. Decode it tolerantly, record it in the log, classify it
//! 4. Feed the result into the trace buffer
//!
//! Transport failures and bad lines are counted and logged, never raised.
//!
//! # Reconnecting
//!
//! Changing port or baud rate closes the current handle before opening the
//! new one and discards partially received bytes. The trace buffer is kept:
//! history survives a reconnect.

pub mod log;

pub use log::{LogEntry, RawLog};

use crate::backend::{LineAssembler, LineSource, SerialLineSource};
use crate::buffer::{IngestOutcome, SharedTraceBuffer};
use crate::classifier::{self, ClassifiedLine};
use crate::config::SerialConfig;
use crate::types::{ConnectionStatus, LinkStats};
use std::time::Duration;

/// Inputs to the session, produced by UI widgets and the frame timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A port was selected
    PortChanged(String),
    /// A baud rate was selected
    BaudRateChanged(u32),
    /// Pulse the device's reset lines and reopen the port
    ResetDevice,
    /// Close the port
    Disconnect,
    /// Poll timer fired
    Tick,
}

/// Application context for one serial plotting session
pub struct Session {
    /// Transport
    source: Box<dyn LineSource>,
    /// Reassembles lines from the byte stream
    assembler: LineAssembler,
    /// Plot model
    buffer: SharedTraceBuffer,
    /// Recent lines for the log panel
    log: RawLog,
    /// Selected port
    port: Option<String>,
    /// Selected baud rate
    baud_rate: u32,
    /// Timeout for newly created serial sources
    #[cfg_attr(not(feature = "mock-serial"), allow(dead_code))]
    read_timeout: Duration,
    /// Current connection status
    status: ConnectionStatus,
    /// A device reset was requested and runs on the next poll
    reset_pending: bool,
    /// Link statistics
    stats: LinkStats,
    /// Most recent error, for the status bar
    last_error: Option<String>,
    /// Read buffer reused across polls
    scratch: Vec<u8>,
    /// Whether the mock device is the active source
    #[cfg(feature = "mock-serial")]
    using_mock: bool,
}

impl Session {
    /// Create a session backed by a real serial port
    pub fn new(config: &SerialConfig, log_capacity: usize) -> Self {
        let source = Box::new(SerialLineSource::new(config.read_timeout()));
        Self::with_source(source, config, log_capacity)
    }

    /// Create a session with an explicit transport
    pub fn with_source(
        source: Box<dyn LineSource>,
        config: &SerialConfig,
        log_capacity: usize,
    ) -> Self {
        Self {
            source,
            assembler: LineAssembler::new(),
            buffer: SharedTraceBuffer::new(),
            log: RawLog::new(log_capacity),
            port: config.port.clone(),
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout(),
            status: ConnectionStatus::Disconnected,
            reset_pending: false,
            stats: LinkStats::default(),
            last_error: None,
            scratch: Vec::with_capacity(1024),
            #[cfg(feature = "mock-serial")]
            using_mock: false,
        }
    }

    /// Open the configured port, if any
    pub fn connect_configured(&mut self) {
        if self.port.is_some() {
            self.reconnect();
        }
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::PortChanged(port) => {
                self.port = Some(port);
                self.reconnect();
            }
            SessionEvent::BaudRateChanged(baud_rate) => {
                self.baud_rate = baud_rate;
                if self.port.is_some() {
                    self.reconnect();
                }
            }
            SessionEvent::ResetDevice => self.request_reset(),
            SessionEvent::Disconnect => self.disconnect(),
            SessionEvent::Tick => {
                self.poll_step();
            }
        }
    }

    /// Read, classify and ingest at most one line
    ///
    /// Returns the classification of the line taken, or `None` when no
    /// complete line was available.
    pub fn poll_step(&mut self) -> Option<ClassifiedLine> {
        if self.reset_pending {
            self.reset_device();
            return None;
        }

        if !self.assembler.has_line() {
            self.read_pending();
        }

        let raw = self.assembler.next_line()?;
        self.stats.lines_received += 1;

        let decoded = classifier::decode_line(&raw);
        if decoded.replaced {
            self.stats.decode_replacements += 1;
            tracing::debug!("Replaced invalid UTF-8 in line: {:?}", decoded.text);
        }

        self.log.push(decoded.text.clone());

        let classified = classifier::classify(&decoded.text);
        match self.buffer.ingest(classified.clone()) {
            Ok(IngestOutcome::HeaderSet { new_traces }) => {
                self.stats.headers += 1;
                if new_traces > 0 {
                    tracing::info!("Header received, {} new traces", new_traces);
                }
            }
            Ok(IngestOutcome::RowAppended { .. }) => {
                self.stats.data_rows += 1;
            }
            Ok(IngestOutcome::Skipped(reason)) => {
                self.stats.unusable_lines += 1;
                tracing::trace!("Dropped line ({}): {:?}", reason, decoded.text);
            }
            Err(e) => {
                if e.is_shape_mismatch() {
                    self.stats.shape_mismatches += 1;
                }
                tracing::warn!("Rejected row {:?}: {}", decoded.text, e);
                self.last_error = Some(e.to_string());
            }
        }

        Some(classified)
    }

    fn read_pending(&mut self) {
        if !self.source.is_open() {
            return;
        }

        self.scratch.clear();
        match self.source.read_available(&mut self.scratch) {
            Ok(0) => {}
            Ok(n) => {
                self.stats.bytes_read += n as u64;
                let discarded = self.assembler.discarded_lines();
                self.assembler.push(&self.scratch);
                self.stats.overlong_lines += self.assembler.discarded_lines() - discarded;
            }
            Err(e) if e.is_transient() => {
                self.stats.read_errors += 1;
                tracing::debug!("Transient read error on {}: {}", self.source.description(), e);
            }
            Err(e) => {
                self.stats.read_errors += 1;
                tracing::error!("Read from {} failed: {}", self.source.description(), e);
                self.source.close();
                self.status = ConnectionStatus::Error;
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn reconnect(&mut self) {
        let Some(port) = self.port.clone() else {
            return;
        };

        self.select_source(&port);
        self.source.close();
        self.assembler.clear();
        self.reset_pending = false;

        match self.source.open(&port, self.baud_rate) {
            Ok(()) => {
                self.status = ConnectionStatus::Connected;
                self.last_error = None;
                tracing::info!("Connected: {}", self.source.description());
            }
            Err(e) => {
                self.status = ConnectionStatus::Error;
                tracing::error!("Failed to connect to {}: {}", port, e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Show the reset as in progress; the pulse itself runs on the next poll
    fn request_reset(&mut self) {
        if self.port.is_none() {
            tracing::warn!("Reset requested with no port selected");
            return;
        }
        self.reset_pending = true;
        self.status = ConnectionStatus::Connecting;
    }

    fn reset_device(&mut self) {
        self.reset_pending = false;
        let Some(port) = self.port.clone() else {
            return;
        };

        self.select_source(&port);
        self.assembler.clear();

        match self.source.pulse_reset(&port, self.baud_rate) {
            Ok(()) => {
                self.status = ConnectionStatus::Connected;
                self.last_error = None;
                tracing::info!("Device reset on {}", port);
            }
            Err(e) => {
                self.status = ConnectionStatus::Error;
                tracing::error!("Failed to reset device on {}: {}", port, e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn disconnect(&mut self) {
        self.source.close();
        self.assembler.clear();
        self.reset_pending = false;
        self.status = ConnectionStatus::Disconnected;
    }

    #[cfg(feature = "mock-serial")]
    fn select_source(&mut self, port: &str) {
        use crate::backend::{MockSerialDevice, MOCK_PORT_NAME};

        let wants_mock = port == MOCK_PORT_NAME;
        if wants_mock == self.using_mock {
            return;
        }

        self.source.close();
        self.source = if wants_mock {
            tracing::info!("Switched to mock device");
            Box::new(MockSerialDevice::new())
        } else {
            tracing::info!("Switched to serial port");
            Box::new(SerialLineSource::new(self.read_timeout))
        };
        self.using_mock = wants_mock;
    }

    #[cfg(not(feature = "mock-serial"))]
    fn select_source(&mut self, _port: &str) {}

    // ==================== Accessors ====================

    /// Handle to the plot model
    pub fn buffer(&self) -> &SharedTraceBuffer {
        &self.buffer
    }

    pub fn log(&self) -> &RawLog {
        &self.log
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn source_description(&self) -> String {
        self.source.description()
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_open()
    }
}
