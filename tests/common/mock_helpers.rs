//! Mock construction helpers

use serialplot_rs::config::SerialConfig;
use serialplot_rs::error::{Result, SerialPlotError};
use serialplot_rs::session::Session;
use serialplot_rs::LineSource;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

/// Observable state behind a [`ScriptedSource`]
#[derive(Debug, Default)]
pub struct ScriptState {
    /// Chunks handed out by successive reads
    pub chunks: VecDeque<Vec<u8>>,
    /// Fail the next read with this kind and message
    pub fail_next_read: Option<(ErrorKind, String)>,
    /// Fail every open
    pub refuse_open: bool,
    pub open: bool,
    /// Every successful open as (port, baud)
    pub opens: Vec<(String, u32)>,
    pub closes: usize,
    pub resets: usize,
}

/// In-memory [`LineSource`] driven by a shared script
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pub state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for a later read
    pub fn feed(&self, bytes: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().chunks.push_back(bytes.into());
    }

    /// Fail the next read as if the device went away
    pub fn fail_next_read(&self, message: &str) {
        self.fail_next_read_with(ErrorKind::BrokenPipe, message);
    }

    pub fn fail_next_read_with(&self, kind: ErrorKind, message: &str) {
        self.state.lock().unwrap().fail_next_read = Some((kind, message.to_string()));
    }

    pub fn refuse_open(&self, refuse: bool) {
        self.state.lock().unwrap().refuse_open = refuse;
    }

    pub fn opens(&self) -> Vec<(String, u32)> {
        self.state.lock().unwrap().opens.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn resets(&self) -> usize {
        self.state.lock().unwrap().resets
    }
}

impl LineSource for ScriptedSource {
    fn open(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_open {
            return Err(SerialPlotError::Config(format!("{} refused", port)));
        }
        state.open = true;
        state.opens.push((port.to_string(), baud_rate));
        Ok(())
    }

    fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.open {
            state.closes += 1;
        }
        state.open = false;
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        if !state.open {
            return Err(SerialPlotError::NotConnected);
        }
        if let Some((kind, message)) = state.fail_next_read.take() {
            return Err(SerialPlotError::Io(std::io::Error::new(kind, message)));
        }
        match state.chunks.pop_front() {
            Some(chunk) => {
                buf.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }

    fn pulse_reset(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        self.state.lock().unwrap().resets += 1;
        self.close();
        self.open(port, baud_rate)
    }

    fn description(&self) -> String {
        "scripted".to_string()
    }
}

/// Session over a scripted source, with a handle to drive it
pub fn scripted_session(port: Option<&str>) -> (Session, ScriptedSource) {
    let source = ScriptedSource::new();
    let config = SerialConfig {
        port: port.map(str::to_string),
        ..Default::default()
    };
    let session = Session::with_source(Box::new(source.clone()), &config, 100);
    (session, source)
}

/// Run poll steps until one returns nothing
pub fn drain(session: &mut Session) -> usize {
    let mut steps = 0;
    while session.poll_step().is_some() {
        steps += 1;
    }
    steps
}
