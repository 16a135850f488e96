//! Line classification for incoming telemetry
//!
//! Every decoded line from the serial link is classified into one of three
//! shapes before it reaches the trace buffer:
//!
//! - [`ClassifiedLine::Header`] - column names, first field is not a number
//! - [`ClassifiedLine::DataRow`] - every field parses as a float
//! - [`ClassifiedLine::Unusable`] - too short, or a numeric row with junk in it
//!
//! Classification is a pure function. Unusable lines are values, not errors,
//! so a noisy link can never take the polling loop down.

use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Minimum number of comma-separated fields for a line to be considered telemetry
pub const MIN_FIELDS: usize = 5;

/// Field delimiter
pub const DELIMITER: char = ',';

/// CSI/OSC style escape sequences plus 8-bit C1 introducers
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x1B[@-_]|[\x{80}-\x{9F}])[0-?]*[ -/]*[@-~]")
        .expect("escape sequence pattern is valid")
});

/// Why a line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusableReason {
    /// Fewer than [`MIN_FIELDS`] fields after splitting
    InsufficientFields { found: usize },
    /// First field was numeric but a later one was not
    MalformedNumericRow { column: usize },
}

impl fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnusableReason::InsufficientFields { .. } => write!(f, "insufficient-fields"),
            UnusableReason::MalformedNumericRow { .. } => write!(f, "malformed-numeric-row"),
        }
    }
}

/// Result of classifying a single line
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedLine {
    /// Column names, used verbatim
    Header(Vec<String>),
    /// Numeric samples; position 0 is the shared x value
    DataRow(Vec<f64>),
    /// Line could not be used
    Unusable(UnusableReason),
}

impl ClassifiedLine {
    pub fn is_unusable(&self) -> bool {
        matches!(self, ClassifiedLine::Unusable(_))
    }
}

/// A line after tolerant UTF-8 decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    /// Decoded text without the line terminator
    pub text: String,
    /// Whether invalid byte sequences were replaced with U+FFFD
    pub replaced: bool,
}

/// Decode raw line bytes, replacing invalid UTF-8 instead of failing.
pub fn decode_line(bytes: &[u8]) -> DecodedLine {
    let decoded = String::from_utf8_lossy(bytes);
    let replaced = matches!(decoded, Cow::Owned(_));
    let text = decoded.trim_end_matches(['\r', '\n']).to_string();
    DecodedLine { text, replaced }
}

/// Remove terminal color/control escape sequences.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

/// A run of a line: either printable text or one escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiPiece<'a> {
    Text(&'a str),
    Escape(&'a str),
}

/// Split a line into text runs and the escape sequences between them.
pub fn ansi_pieces(line: &str) -> Vec<AnsiPiece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in ANSI_ESCAPE.find_iter(line) {
        if m.start() > last {
            pieces.push(AnsiPiece::Text(&line[last..m.start()]));
        }
        pieces.push(AnsiPiece::Escape(m.as_str()));
        last = m.end();
    }
    if last < line.len() {
        pieces.push(AnsiPiece::Text(&line[last..]));
    }
    pieces
}

/// Classify a raw decoded line.
///
/// Escape sequences are stripped and the line trimmed before it is split
/// on [`DELIMITER`].
pub fn classify(raw_line: &str) -> ClassifiedLine {
    let stripped = strip_ansi(raw_line);
    let line = stripped.trim();
    let fields: Vec<&str> = line.split(DELIMITER).collect();

    if fields.len() < MIN_FIELDS {
        return ClassifiedLine::Unusable(UnusableReason::InsufficientFields {
            found: fields.len(),
        });
    }

    if parse_field(fields[0]).is_none() {
        return ClassifiedLine::Header(fields.iter().map(|f| f.to_string()).collect());
    }

    let mut values = Vec::with_capacity(fields.len());
    for (column, field) in fields.iter().enumerate() {
        match parse_field(field) {
            Some(v) => values.push(v),
            None => {
                return ClassifiedLine::Unusable(UnusableReason::MalformedNumericRow { column })
            }
        }
    }

    ClassifiedLine::DataRow(values)
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}
