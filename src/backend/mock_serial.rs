//! Mock serial device for running without hardware
//!
//! [`MockSerialDevice`] behaves like a microcontroller printing CSV telemetry:
//! a colored boot banner, a header line, then one data row per sample
//! period. Each value column follows its own [`MockSignal`].
//!
//! # Enabling
//!
//! The mock device is only available when the `mock-serial` feature is enabled,
//! and appears in the port list as [`MOCK_PORT_NAME`]:
//!
//! ```bash
//! cargo run --features mock-serial
//! ```

use crate::backend::line_source::LineSource;
use crate::error::{Result, SerialPlotError};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Port name under which the mock device is offered
pub const MOCK_PORT_NAME: &str = "mock";

/// Waveform for one mock column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockSignal {
    /// Sine wave
    Sine { frequency: f64, amplitude: f64 },
    /// Cosine wave
    Cosine { frequency: f64, amplitude: f64 },
    /// Sawtooth wave
    Sawtooth { period: f64, amplitude: f64 },
    /// Square wave
    Square { period: f64, amplitude: f64 },
}

impl MockSignal {
    /// Value of the signal at time `t` (seconds)
    pub fn sample(&self, t: f64) -> f64 {
        let tau = 2.0 * std::f64::consts::PI;
        match *self {
            MockSignal::Sine {
                frequency,
                amplitude,
            } => amplitude * (tau * frequency * t).sin(),
            MockSignal::Cosine {
                frequency,
                amplitude,
            } => amplitude * (tau * frequency * t).cos(),
            MockSignal::Sawtooth { period, amplitude } => amplitude * ((t % period) / period),
            MockSignal::Square { period, amplitude } => {
                if (t % period) < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        }
    }
}

/// Synthetic CSV device
pub struct MockSerialDevice {
    signals: Vec<(String, MockSignal)>,
    sample_period: Duration,
    opened_at: Option<Instant>,
    samples_emitted: u64,
    banner_sent: bool,
    baud_rate: u32,
}

impl Default for MockSerialDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSerialDevice {
    /// Four columns sampled at 50 Hz
    pub fn new() -> Self {
        Self {
            signals: vec![
                (
                    "Sine".to_string(),
                    MockSignal::Sine {
                        frequency: 0.5,
                        amplitude: 1.0,
                    },
                ),
                (
                    "Cosine".to_string(),
                    MockSignal::Cosine {
                        frequency: 0.5,
                        amplitude: 1.0,
                    },
                ),
                (
                    "Sawtooth".to_string(),
                    MockSignal::Sawtooth {
                        period: 2.0,
                        amplitude: 2.0,
                    },
                ),
                (
                    "Square".to_string(),
                    MockSignal::Square {
                        period: 1.0,
                        amplitude: 0.5,
                    },
                ),
            ],
            sample_period: Duration::from_millis(20),
            opened_at: None,
            samples_emitted: 0,
            banner_sent: false,
            baud_rate: 0,
        }
    }

    /// Set the interval between data rows
    pub fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period.max(Duration::from_millis(1));
        self
    }

    fn header_line(&self) -> String {
        let mut line = String::from("Time");
        for (name, _) in &self.signals {
            line.push(',');
            line.push_str(name);
        }
        line.push_str("\r\n");
        line
    }

    fn row_line(&self, t: f64) -> String {
        let mut line = format!("{:.3}", t);
        for (_, signal) in &self.signals {
            let _ = write!(line, ",{:.4}", signal.sample(t));
        }
        line.push_str("\r\n");
        line
    }
}

impl LineSource for MockSerialDevice {
    fn open(&mut self, _port: &str, baud_rate: u32) -> Result<()> {
        self.opened_at = Some(Instant::now());
        self.samples_emitted = 0;
        self.banner_sent = false;
        self.baud_rate = baud_rate;
        tracing::info!("Opened mock device ({} columns)", self.signals.len());
        Ok(())
    }

    fn close(&mut self) {
        self.opened_at = None;
    }

    fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let opened_at = self.opened_at.ok_or(SerialPlotError::NotConnected)?;
        let start = buf.len();

        if !self.banner_sent {
            buf.extend_from_slice(b"\x1b[32m[boot]\x1b[0m mock device ready\r\n");
            buf.extend_from_slice(self.header_line().as_bytes());
            self.banner_sent = true;
        }

        let due = (opened_at.elapsed().as_secs_f64() / self.sample_period.as_secs_f64()) as u64;
        while self.samples_emitted < due {
            let t = self.samples_emitted as f64 * self.sample_period.as_secs_f64();
            buf.extend_from_slice(self.row_line(t).as_bytes());
            self.samples_emitted += 1;
        }

        Ok(buf.len() - start)
    }

    fn description(&self) -> String {
        format!("Mock device @ {} baud", self.baud_rate)
    }
}
