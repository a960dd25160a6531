//! Streaming separator scanner.
//!
//! Reads an mbox line by line with a reusable buffer and yields every
//! `From ` separator it finds. Never loads the entire file into memory:
//! at most `max_line_length` bytes of any line are buffered.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::parser::{envelope, is_from};

/// Size of the internal read buffer (1 MB for fast sequential reads on modern SSDs).
const READ_BUFFER_SIZE: usize = 1024 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A separator line found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    /// 1-based line number.
    pub line_number: u64,
    /// Byte offset of the separator line.
    pub offset: u64,
    /// Envelope sender, truncated to the configured capacity
    /// (never in the middle of a UTF-8 character).
    pub sender: String,
    /// Delivery time in seconds since the Unix epoch (UTC).
    pub timestamp: i64,
    /// Whether the previous line was blank (always true for the first line).
    pub preceded_by_blank: bool,
}

impl Separator {
    /// Delivery time as a UTC date.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Iterator over the separators of an mbox stream.
///
/// Tolerant of:
///
/// - Mixed `\n` and `\r\n` line endings
/// - `From ` lines not preceded by a blank line (logs a warning)
/// - UTF-8 BOM at the start of the stream
/// - Non-UTF-8 bytes anywhere
/// - Overlong lines (only the first `max_line_length` bytes are kept, logs a warning)
pub struct Scanner<R> {
    reader: R,
    path: Option<PathBuf>,
    config: ScanConfig,
    line_buf: Vec<u8>,
    sender_buf: Vec<u8>,
    offset: u64,
    line_number: u64,
    prev_line_was_empty: bool,
    done: bool,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R, config: &ScanConfig) -> Self {
        Self {
            reader,
            path: None,
            config: config.clone(),
            line_buf: Vec::with_capacity(4096),
            sender_buf: vec![0; config.sender_capacity],
            offset: 0,
            line_number: 0,
            prev_line_was_empty: true,
            done: false,
        }
    }

    /// Read one line into `line_buf`, keeping at most `max_line_length` bytes.
    ///
    /// Returns the full length of the line in the stream, skipped bytes included.
    fn read_line(&mut self) -> std::io::Result<u64> {
        self.line_buf.clear();
        let limit = (self.config.max_line_length as u64).max(1);
        let kept = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.line_buf)? as u64;
        if kept < limit || self.line_buf.last() == Some(&b'\n') {
            return Ok(kept);
        }

        // Discard the rest of the overlong line
        let mut skipped: u64 = 0;
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                break; // EOF
            }
            let (consume_len, found_newline) = match memchr_newline(buf) {
                Some(pos) => (pos + 1, true),
                None => (buf.len(), false),
            };
            self.reader.consume(consume_len);
            skipped += consume_len as u64;
            if found_newline {
                break;
            }
        }
        if skipped > 0 {
            warn!(
                offset = self.offset,
                max_line_length = limit,
                "Line exceeds maximum length, truncating"
            );
        }
        Ok(kept + skipped)
    }

    fn io_error(&self, source: std::io::Error) -> ScanError {
        match &self.path {
            Some(path) => ScanError::io(path, source),
            None => source.into(),
        }
    }
}

/// Open an mbox file for scanning.
pub fn scan_path(path: impl AsRef<Path>, config: &ScanConfig) -> Result<Scanner<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::FileNotFound(path.to_path_buf())
        } else {
            ScanError::io(path, e)
        }
    })?;
    let mut scanner = Scanner::new(BufReader::with_capacity(READ_BUFFER_SIZE, file), config);
    scanner.path = Some(path.to_path_buf());
    Ok(scanner)
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Separator>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let line_len = match self.read_line() {
                Ok(0) => {
                    self.done = true;
                    break; // EOF
                }
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(self.io_error(e)));
                }
            };

            let line_offset = self.offset;
            let first_line = self.line_number == 0;
            self.offset += line_len;
            self.line_number += 1;

            let mut line = self.line_buf.as_slice();
            if first_line && self.config.strip_bom {
                line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
            }

            let preceded_by_blank = self.prev_line_was_empty;
            self.prev_line_was_empty = is_blank_line(line);

            let mut timestamp = 0i64;
            if !is_from(line, Some(&mut self.sender_buf), Some(&mut timestamp)) {
                continue;
            }

            if !preceded_by_blank {
                if self.config.require_blank_line {
                    debug!(
                        line = self.line_number,
                        offset = line_offset,
                        "Skipping 'From ' separator without preceding blank line"
                    );
                    continue;
                }
                warn!(
                    line = self.line_number,
                    offset = line_offset,
                    "Found 'From ' separator without preceding blank line"
                );
            }

            let mut sender_bytes = envelope::terminated(&self.sender_buf);
            if sender_bytes.len() + 1 == self.sender_buf.len() {
                // Possibly cut short by the buffer capacity
                sender_bytes = envelope::trim_partial_utf8(sender_bytes);
            }
            let sender = envelope::decode_sender(sender_bytes).into_owned();
            return Some(Ok(Separator {
                line_number: self.line_number,
                offset: line_offset,
                sender,
                timestamp,
                preceded_by_blank,
            }));
        }
        None
    }
}

/// Fast newline search (equivalent to memchr for `\n`).
#[inline]
fn memchr_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

/// Check whether a line is blank (empty or only whitespace / CR / LF).
fn is_blank_line(line: &[u8]) -> bool {
    line.iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b' ' || b == b'\t')
}
