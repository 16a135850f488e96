//! Serial port transport built on the `serialport` crate
//!
//! Ports are opened 8N1 without flow control, with DTR and RTS deasserted so
//! that opening the port does not reset boards that wire DTR to their reset
//! line. [`SerialLineSource::pulse_reset`] does the opposite on purpose.

use crate::backend::line_source::LineSource;
use crate::error::{is_transient_io, Result, ResultExt, SerialPlotError};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;
use std::time::Duration;

/// How long DTR/RTS stay asserted during a device reset
const RESET_PULSE: Duration = Duration::from_millis(50);

/// Serial port backed [`LineSource`]
pub struct SerialLineSource {
    /// Open port handle
    port: Option<Box<dyn SerialPort>>,
    /// Name of the open port
    port_name: Option<String>,
    /// Baud rate of the open port
    baud_rate: u32,
    /// Read timeout passed to the driver
    read_timeout: Duration,
}

impl SerialLineSource {
    /// Create a closed source
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            port: None,
            port_name: None,
            baud_rate: 0,
            read_timeout,
        }
    }

    fn open_port(
        &self,
        port: &str,
        baud_rate: u32,
        assert_control_lines: bool,
    ) -> Result<Box<dyn SerialPort>> {
        let mut handle = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.read_timeout)
            .open()
            .with_context(|| format!("Failed to open {} at {} baud", port, baud_rate))?;

        handle.write_data_terminal_ready(assert_control_lines)?;
        handle.write_request_to_send(assert_control_lines)?;
        Ok(handle)
    }
}

impl LineSource for SerialLineSource {
    fn open(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        self.close();

        let handle = self.open_port(port, baud_rate, false)?;
        self.port = Some(handle);
        self.port_name = Some(port.to_string());
        self.baud_rate = baud_rate;

        tracing::info!("Opened {} at {} baud", port, baud_rate);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!(
                "Closed {}",
                self.port_name.as_deref().unwrap_or("serial port")
            );
        }
        self.port_name = None;
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let port = self.port.as_mut().ok_or(SerialPlotError::NotConnected)?;

        let pending = port.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(0);
        }

        let start = buf.len();
        buf.resize(start + pending, 0);
        match port.read(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                Ok(n)
            }
            Err(e) if is_transient_io(e.kind()) => {
                buf.truncate(start);
                Ok(0)
            }
            Err(e) => {
                buf.truncate(start);
                Err(e.into())
            }
        }
    }

    fn pulse_reset(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        self.close();

        tracing::info!("Resetting device on {}", port);
        let pulse = self
            .open_port(port, baud_rate, true)
            .context("Failed to assert reset lines")?;
        std::thread::sleep(RESET_PULSE);
        drop(pulse);

        self.open(port, baud_rate)
    }

    fn description(&self) -> String {
        match &self.port_name {
            Some(name) => format!("{} @ {} baud", name, self.baud_rate),
            None => "Serial (closed)".to_string(),
        }
    }
}

/// List the names of serial ports present on this machine
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}
