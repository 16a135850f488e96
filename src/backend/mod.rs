//! Backend module: the byte transport feeding the parser
//!
//! Everything below the line classifier lives here. The session polls a
//! [`LineSource`] for pending bytes and frames them into lines with a
//! [`LineAssembler`].
//!
//! # Components
//!
//! - [`LineSource`] - Trait over anything that yields raw telemetry bytes
//! - [`SerialLineSource`] - Real serial port via the `serialport` crate
//! - [`MockSerialDevice`] - Synthetic CSV device (feature-gated)
//! - [`LineAssembler`] - Splits the byte stream into complete lines
//!
//! # Example
//!
//! ```ignore
//! use serialplot_rs::backend::{LineAssembler, LineSource, SerialLineSource};
//!
//! let mut source = SerialLineSource::new(Duration::from_millis(10));
//! source.open("/dev/ttyUSB0", 115_200)?;
//!
//! let mut assembler = LineAssembler::new();
//! let mut buf = Vec::new();
//! source.read_available(&mut buf)?;
//! assembler.push(&buf);
//! while let Some(line) = assembler.next_line() {
//!     // classify line
//! }
//! ```

pub mod framing;
pub mod line_source;
#[cfg(feature = "mock-serial")]
pub mod mock_serial;
pub mod serial;

pub use framing::{LineAssembler, MAX_LINE_BYTES};
pub use line_source::LineSource;
#[cfg(feature = "mock-serial")]
pub use mock_serial::{MockSerialDevice, MockSignal, MOCK_PORT_NAME};
pub use serial::{list_ports, SerialLineSource};

/// Port names offered to the user, including the mock device when enabled
pub fn available_ports() -> Vec<String> {
    #[allow(unused_mut)]
    let mut ports = list_ports();
    #[cfg(feature = "mock-serial")]
    ports.push(MOCK_PORT_NAME.to_string());
    ports
}
