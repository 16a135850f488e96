//! Trace buffer: the plot model fed by classified lines
//!
//! The buffer owns every named trace seen so far, the active header and the
//! accumulated `(x, y)` samples. It is the only stateful part of the
//! parsing core.
//!
//! # States
//!
//! - **Unheadered**: no header yet. [`TraceBuffer::update_data`] fails with
//!   [`SerialPlotError::MissingHeader`]; [`TraceBuffer::ingest`] synthesizes a
//!   `Time, Signal_1, ...` header sized to the first data row instead.
//! - **Headered**: rows must match the header width exactly, otherwise the
//!   whole batch is rejected with [`SerialPlotError::ShapeMismatch`].
//!
//! Traces are never evicted or reset. A trace keeps its creation index (and
//! therefore its color) even when a later header moves or drops its column.
//!
//! # Sharing
//!
//! [`SharedTraceBuffer`] wraps the buffer in a mutex for designs where the
//! reader runs on its own thread. Readers take a [`TraceSnapshot`], a copy
//! made under the lock, so a render never sees a half-applied batch.

use crate::classifier::{ClassifiedLine, UnusableReason};
use crate::error::{Result, SerialPlotError};
use crate::types::{self, Color, LegendEntry, Trace};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Name of the x column in a synthesized header
pub const SYNTHETIC_X_NAME: &str = "Time";

/// Prefix of value columns in a synthesized header
pub const SYNTHETIC_SIGNAL_PREFIX: &str = "Signal_";

/// What [`TraceBuffer::ingest`] did with a line
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// A header was applied, creating this many new traces
    HeaderSet { new_traces: usize },
    /// A data row was appended
    RowAppended { synthesized_header: bool },
    /// The line was unusable and ignored
    Skipped(UnusableReason),
}

/// Named traces, the active header, and their samples
#[derive(Debug, Default)]
pub struct TraceBuffer {
    /// Traces in creation order; position equals `Trace::index`
    traces: Vec<Trace>,
    by_name: HashMap<String, usize>,
    header: Option<Vec<String>>,
    generation: u64,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header used when data arrives before any header: `Time, Signal_1, ..., Signal_{len-1}`
    pub fn synthesize_header(len: usize) -> Vec<String> {
        (0..len)
            .map(|i| {
                if i == 0 {
                    SYNTHETIC_X_NAME.to_string()
                } else {
                    format!("{}{}", SYNTHETIC_SIGNAL_PREFIX, i)
                }
            })
            .collect()
    }

    /// Replace the active header, creating traces for unseen names.
    ///
    /// Existing traces keep their samples and index. Returns the number of
    /// traces created.
    pub fn set_header<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let before = self.traces.len();

        for (position, name) in names.iter().enumerate() {
            let slot = self.ensure_trace(name.as_ref());
            if position > 0 {
                self.traces[slot].plotted = true;
            }
        }

        self.header = Some(names.iter().map(|n| n.as_ref().to_string()).collect());
        self.generation += 1;

        let created = self.traces.len() - before;
        tracing::debug!(
            "Header set ({} columns, {} new traces)",
            names.len(),
            created
        );
        created
    }

    /// Append rows against the active header.
    ///
    /// Every row is checked before any sample is appended, so a bad row
    /// leaves the buffer untouched.
    pub fn update_data(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let header = self.header.as_ref().ok_or(SerialPlotError::MissingHeader)?;
        let expected = header.len();

        if let Some(bad) = rows.iter().find(|row| row.len() != expected) {
            return Err(SerialPlotError::ShapeMismatch {
                expected,
                found: bad.len(),
            });
        }

        if rows.is_empty() || expected == 0 {
            return Ok(());
        }

        let value_names: Vec<String> = header[1..].to_vec();
        let slots: Vec<usize> = value_names
            .iter()
            .map(|name| self.ensure_trace(name))
            .collect();

        for row in rows {
            let x = row[0];
            for (column, &slot) in slots.iter().enumerate() {
                let trace = &mut self.traces[slot];
                trace.plotted = true;
                trace.push(x, row[column + 1]);
            }
        }

        self.generation += 1;
        Ok(())
    }

    /// Feed one classified line into the buffer.
    pub fn ingest(&mut self, line: ClassifiedLine) -> Result<IngestOutcome> {
        match line {
            ClassifiedLine::Header(names) => {
                let new_traces = self.set_header(&names);
                Ok(IngestOutcome::HeaderSet { new_traces })
            }
            ClassifiedLine::DataRow(values) => {
                let synthesized_header = self.header.is_none();
                if synthesized_header {
                    let header = Self::synthesize_header(values.len());
                    tracing::info!(
                        "No header received, using synthetic header with {} columns",
                        header.len()
                    );
                    self.set_header(&header);
                }
                self.update_data(std::slice::from_ref(&values))?;
                Ok(IngestOutcome::RowAppended { synthesized_header })
            }
            ClassifiedLine::Unusable(reason) => Ok(IngestOutcome::Skipped(reason)),
        }
    }

    /// Accumulated series for a trace, if it exists
    pub fn get_series(&self, name: &str) -> Option<&[[f64; 2]]> {
        self.trace(name).map(|t| t.points.as_slice())
    }

    /// Color for a trace index
    pub fn color_for(&self, index: usize) -> Color {
        types::color_for(index)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn is_headered(&self) -> bool {
        self.header.is_some()
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.by_name.get(name).map(|&slot| &self.traces[slot])
    }

    /// All traces in creation order
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Plotted traces in creation order with their colors
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.traces
            .iter()
            .filter(|t| t.plotted)
            .map(|t| LegendEntry {
                name: t.name.clone(),
                index: t.index,
                color: t.color(),
            })
            .collect()
    }

    /// Total number of samples across all traces
    pub fn total_samples(&self) -> usize {
        self.traces.iter().map(Trace::len).sum()
    }

    /// Mutation counter, bumped on every header change or appended batch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Copy the plotted series, optionally thinned to `max_points` per trace
    pub fn snapshot(&self, max_points: Option<usize>) -> TraceSnapshot {
        let series = self
            .traces
            .iter()
            .filter(|t| t.plotted)
            .map(|t| SeriesSnapshot {
                name: t.name.clone(),
                index: t.index,
                color: t.color(),
                points: match max_points {
                    Some(max) => decimate(&t.points, max),
                    None => t.points.clone(),
                },
            })
            .collect();

        TraceSnapshot {
            generation: self.generation,
            header: self.header.clone().unwrap_or_default(),
            series,
        }
    }

    fn ensure_trace(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.by_name.get(name) {
            return slot;
        }
        let index = self.traces.len();
        self.traces.push(Trace::new(name, index));
        self.by_name.insert(name.to_string(), index);
        index
    }
}

/// Thin a series to at most `max_points`, always keeping the newest sample.
pub fn decimate(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if max_points == 0 {
        return Vec::new();
    }
    if points.len() <= max_points {
        return points.to_vec();
    }

    let stride = points.len().div_ceil(max_points);
    let mut out: Vec<[f64; 2]> = points.iter().step_by(stride).copied().collect();
    if out.len() >= max_points {
        out.truncate(max_points - 1);
    }
    if let Some(&last) = points.last() {
        out.push(last);
    }
    out
}

/// One plotted trace as copied out of the buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub name: String,
    pub index: usize,
    pub color: Color,
    pub points: Vec<[f64; 2]>,
}

/// Consistent copy of the buffer for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceSnapshot {
    /// Buffer generation the copy was taken at
    pub generation: u64,
    /// Active header (empty when Unheadered)
    pub header: Vec<String>,
    /// Plotted traces in creation order
    pub series: Vec<SeriesSnapshot>,
}

impl TraceSnapshot {
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.series
            .iter()
            .map(|s| LegendEntry {
                name: s.name.clone(),
                index: s.index,
                color: s.color,
            })
            .collect()
    }

    pub fn series(&self, name: &str) -> Option<&SeriesSnapshot> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Thread-safe handle to a [`TraceBuffer`]
#[derive(Debug, Clone, Default)]
pub struct SharedTraceBuffer {
    inner: Arc<Mutex<TraceBuffer>>,
}

impl SharedTraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TraceBuffer> {
        // Rows are validated before any append, so a poisoned buffer is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_header<S: AsRef<str>>(&self, names: &[S]) -> usize {
        self.lock().set_header(names)
    }

    pub fn update_data(&self, rows: &[Vec<f64>]) -> Result<()> {
        self.lock().update_data(rows)
    }

    pub fn ingest(&self, line: ClassifiedLine) -> Result<IngestOutcome> {
        self.lock().ingest(line)
    }

    /// Copy of a trace's series
    pub fn get_series(&self, name: &str) -> Option<Vec<[f64; 2]>> {
        self.lock().get_series(name).map(<[[f64; 2]]>::to_vec)
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation()
    }

    /// Run a closure with read access under the lock
    pub fn with<R>(&self, f: impl FnOnce(&TraceBuffer) -> R) -> R {
        let buffer = self.lock();
        f(&*buffer)
    }

    pub fn snapshot(&self, max_points: Option<usize>) -> TraceSnapshot {
        self.lock().snapshot(max_points)
    }

    /// Snapshot only if the buffer changed since generation `seen`
    pub fn snapshot_if_newer(&self, seen: u64, max_points: Option<usize>) -> Option<TraceSnapshot> {
        let buffer = self.lock();
        (buffer.generation() != seen).then(|| buffer.snapshot(max_points))
    }
}
