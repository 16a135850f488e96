//! Line framing for the raw serial byte stream
//!
//! Serial reads return arbitrary slices of the stream: half a line, three
//! lines, or a line split across many reads. [`LineAssembler`] buffers the
//! bytes and hands out complete `\n`-terminated lines one at a time.

use std::collections::VecDeque;

/// Longest partial line kept while waiting for a terminator
pub const MAX_LINE_BYTES: usize = 4096;

/// Reassembles newline-terminated lines from arbitrary byte chunks
///
/// A line longer than [`MAX_LINE_BYTES`] is dropped whole: the assembler
/// skips everything up to the next `\n`, however the bytes are chunked.
#[derive(Debug, Default)]
pub struct LineAssembler {
    /// Bytes of the line currently being received
    pending: Vec<u8>,
    /// Complete lines, oldest first, without the `\n`
    ready: VecDeque<Vec<u8>>,
    /// Skipping the rest of an overlong line
    discarding: bool,
    /// Lines dropped for exceeding [`MAX_LINE_BYTES`]
    discarded: u64,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes read from the transport
    pub fn push(&mut self, bytes: &[u8]) {
        for segment in bytes.split_inclusive(|&b| b == b'\n') {
            let terminated = segment.last() == Some(&b'\n');
            let body = if terminated {
                &segment[..segment.len() - 1]
            } else {
                segment
            };

            if self.discarding {
                self.discarding = !terminated;
                continue;
            }

            if self.pending.len() + body.len() > MAX_LINE_BYTES {
                tracing::warn!(
                    "Discarding line longer than {} bytes",
                    MAX_LINE_BYTES
                );
                self.pending.clear();
                self.discarded += 1;
                self.discarding = !terminated;
                continue;
            }

            self.pending.extend_from_slice(body);
            if terminated {
                self.ready.push_back(std::mem::take(&mut self.pending));
            }
        }
    }

    /// Take the oldest complete line
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    /// Whether a complete line is waiting
    pub fn has_line(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Bytes of the unterminated line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total lines dropped for length since creation
    pub fn discarded_lines(&self) -> u64 {
        self.discarded
    }

    /// Drop everything buffered, e.g. after switching ports
    pub fn clear(&mut self) {
        self.pending.clear();
        self.ready.clear();
        self.discarding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_split_across_reads() {
        let mut assembler = LineAssembler::new();
        assembler.push(b"1,2,");
        assert!(!assembler.has_line());
        assert_eq!(assembler.pending_len(), 4);

        assembler.push(b"3,4,5\r\n6,7");
        assert_eq!(assembler.next_line(), Some(b"1,2,3,4,5\r".to_vec()));
        assert!(assembler.next_line().is_none());
        assert_eq!(assembler.pending_len(), 3);
    }

    #[test]
    fn test_multiple_lines_in_one_read() {
        let mut assembler = LineAssembler::new();
        assembler.push(b"a\nb\n\nc\n");
        assert_eq!(assembler.next_line(), Some(b"a".to_vec()));
        assert_eq!(assembler.next_line(), Some(b"b".to_vec()));
        assert_eq!(assembler.next_line(), Some(Vec::new()));
        assert_eq!(assembler.next_line(), Some(b"c".to_vec()));
        assert_eq!(assembler.pending_len(), 0);
    }

    #[test]
    fn test_overlong_partial_line_is_discarded_to_terminator() {
        let mut assembler = LineAssembler::new();
        assembler.push(&vec![b'x'; MAX_LINE_BYTES + 1]);
        assert_eq!(assembler.pending_len(), 0);
        assert_eq!(assembler.discarded_lines(), 1);

        // The rest of the same line must not surface as a line of its own
        assembler.push(b"x,y,z,w,v\n0,1,2,3,4\n");
        assert_eq!(assembler.next_line(), Some(b"0,1,2,3,4".to_vec()));
        assert!(assembler.next_line().is_none());
        assert_eq!(assembler.discarded_lines(), 1);
    }

    #[test]
    fn test_overlong_line_terminated_in_same_push() {
        let mut line = vec![b'x'; MAX_LINE_BYTES + 10];
        line.extend_from_slice(b",y,z,w,v\nnext\n");

        let mut assembler = LineAssembler::new();
        assembler.push(&line);
        assert_eq!(assembler.next_line(), Some(b"next".to_vec()));
        assert!(assembler.next_line().is_none());
        assert_eq!(assembler.discarded_lines(), 1);
    }

    #[test]
    fn test_overlong_line_across_small_chunks() {
        let mut stream = b"DUMP ".to_vec();
        stream.extend(std::iter::repeat(b'x').take(5000));
        stream.extend_from_slice(b",y,z,w,v\nTime,A,B,C,D\n");

        let mut assembler = LineAssembler::new();
        for chunk in stream.chunks(1024) {
            assembler.push(chunk);
        }
        assert_eq!(assembler.next_line(), Some(b"Time,A,B,C,D".to_vec()));
        assert!(assembler.next_line().is_none());
        assert_eq!(assembler.discarded_lines(), 1);
    }

    #[test]
    fn test_line_at_cap_is_kept() {
        let mut line = vec![b'7'; MAX_LINE_BYTES];
        line.push(b'\n');

        let mut assembler = LineAssembler::new();
        for chunk in line.chunks(100) {
            assembler.push(chunk);
        }
        assert_eq!(assembler.next_line().map(|l| l.len()), Some(MAX_LINE_BYTES));
        assert_eq!(assembler.discarded_lines(), 0);
    }

    #[test]
    fn test_clear_drops_buffered_bytes() {
        let mut assembler = LineAssembler::new();
        assembler.push(b"done\npartial");
        assembler.clear();
        assert!(!assembler.has_line());
        assert_eq!(assembler.pending_len(), 0);

        // A clear also ends skipping of an overlong line
        assembler.push(&vec![b'x'; MAX_LINE_BYTES + 1]);
        assembler.clear();
        assembler.push(b"fresh\n");
        assert_eq!(assembler.next_line(), Some(b"fresh".to_vec()));
        assert!(!assembler.has_line());
        assert_eq!(assembler.pending_len(), 0);
    }
}
