//! Bounded history of received lines for the raw log panel

use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::ops::Range;

use crate::classifier;

/// One received line as decoded, escape sequences included
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub received_at: DateTime<Local>,
    pub text: String,
}

impl LogEntry {
    /// The text with ANSI escapes removed
    pub fn plain(&self) -> Cow<'_, str> {
        classifier::strip_ansi(&self.text)
    }
}

/// Ring buffer of the most recent lines
#[derive(Debug, Clone)]
pub struct RawLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl RawLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Record a line, evicting the oldest when full
    pub fn push(&mut self, text: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            received_at: Local::now(),
            text: text.into(),
        });
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries in `rows` (oldest is row 0), clamped to what is stored
    pub fn rows(&self, rows: Range<usize>) -> impl Iterator<Item = &LogEntry> {
        let end = rows.end.min(self.entries.len());
        let start = rows.start.min(end);
        self.entries.range(start..end)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
