//! Recognition of mbox `From ` separator lines.
//!
//! [`is_from`] answers "does this line start a message?" and optionally
//! fills in the envelope sender and the delivery time. [`FromLine`] gives
//! the same information as a borrowed, structured view.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use super::date::{self, CalendarRecord};
use super::envelope;
use super::grammar::{self, CaptureSet};

/// Check whether `line` is an mbox separator.
///
/// When the line is recognized:
/// - `path` receives the envelope sender, truncated to fit and
///   NUL-terminated (see [`envelope::copy_bounded`]); an empty buffer is
///   left untouched.
/// - `time` receives the delivery time in seconds since the Unix epoch,
///   with the date fields read as UTC.
///
/// When the line is not recognized, neither output is touched.
pub fn is_from(line: &[u8], path: Option<&mut [u8]>, time: Option<&mut i64>) -> bool {
    let Some(from) = FromLine::parse(line) else {
        return false;
    };

    if let Some(buf) = path {
        envelope::copy_bounded(from.sender_bytes(), buf);
    }

    if let Some(slot) = time {
        // The grammar caps the year at four digits, so conversion always succeeds.
        if let Some(ts) = from.timestamp() {
            *slot = ts.timestamp();
        }
    }

    true
}

/// A recognized separator line, borrowing the text it was parsed from.
#[derive(Debug, Clone, Copy)]
pub struct FromLine<'a> {
    line: &'a [u8],
    captures: CaptureSet,
}

impl<'a> FromLine<'a> {
    /// Parse `line`, returning `None` if it is not a separator.
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let captures = grammar::capture(line)?;
        Some(Self { line, captures })
    }

    /// Raw envelope-sender bytes; empty when the line has no sender.
    pub fn sender_bytes(&self) -> &'a [u8] {
        self.captures
            .sender
            .map(|span| span.slice(self.line))
            .unwrap_or_default()
    }

    /// Envelope sender as text (UTF-8, or Windows-1252 as a fallback).
    pub fn sender(&self) -> Cow<'a, str> {
        envelope::decode_sender(self.sender_bytes())
    }

    /// Broken-down delivery date.
    pub fn calendar(&self) -> CalendarRecord {
        date::assemble(self.line, &self.captures)
    }

    /// Delivery time, with the date fields read as UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.calendar().to_utc()
    }

    /// Capture spans of the matched fields, as offsets into [`line`](Self::line).
    pub fn captures(&self) -> &CaptureSet {
        &self.captures
    }

    /// The full input line.
    pub fn line(&self) -> &'a [u8] {
        self.line
    }
}
