//! The `From ` separator grammar.
//!
//! A separator line looks like
//!
//! ```text
//! From <envelope-sender> <weekday> <month> <day> <time> [<zone>...] <year> [<trailer>...]
//! ```
//!
//! MTAs disagree on the details, so whitespace runs may be any mix of
//! spaces and tabs, the sender may be missing, the seconds may be missing,
//! and zone names such as `CET DST` or `+0000` may sit between the time and
//! the year. The grammar is compiled once and shared by every caller.

use std::sync::OnceLock;

use regex::bytes::Regex;

/// Lazily compiled separator grammar. Never mutated after initialization.
static FROM_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn from_line_regex() -> &'static Regex {
    FROM_LINE_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?x-u)
            ^From\x20[\x20\t]*
            (?: (?P<sender> "[^"]*"\S* | \S+ ) [\x20\t]+ )?
            (?i: mon|tue|wed|thu|fri|sat|sun ) [\x20\t]+
            (?P<month> (?i: jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec ) ) [\x20\t]+
            (?P<day> [0-9]{1,2} ) [\x20\t]+
            (?P<time> [0-9]{1,2} : [0-9]{2} (?: : [0-9]{2} )? ) [\x20\t]+
            (?: (?: [A-Za-z]{1,5} | [+-][0-9]{4} ) [\x20\t]+ )*
            (?P<year> [0-9]{4} | [0-9]{2} ) (?: [\x20\t\r\n] | $ )
            "#,
        )
        .expect("Invalid From_ line regex")
    })
}

/// A `(start, length)` region of the separator line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    /// The bytes this span covers in `line`.
    ///
    /// Returns an empty slice when the span does not fit, so a span taken
    /// from one line can never index out of bounds of another.
    pub fn slice<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        self.start
            .checked_add(self.len)
            .and_then(|end| line.get(self.start..end))
            .unwrap_or_default()
    }

    fn from_match(m: regex::bytes::Match<'_>) -> Self {
        Self {
            start: m.start(),
            len: m.len(),
        }
    }
}

/// Capture spans of a recognized separator line.
///
/// Month, day, time and year are mandatory in the grammar, so they are
/// always present once a line has matched. The sender is `None` when the
/// line carries no envelope sender or only the `-` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSet {
    pub whole: Span,
    pub sender: Option<Span>,
    pub month: Span,
    pub day: Span,
    pub time: Span,
    pub year: Span,
}

/// Match `line` against the separator grammar.
///
/// Returns `None` when the line is not a separator. This is the normal
/// negative result, not an error.
pub fn capture(line: &[u8]) -> Option<CaptureSet> {
    let caps = from_line_regex().captures(line)?;

    let sender = caps
        .name("sender")
        .filter(|m| m.as_bytes() != b"-")
        .map(Span::from_match);

    Some(CaptureSet {
        whole: Span::from_match(caps.get(0)?),
        sender,
        month: Span::from_match(caps.name("month")?),
        day: Span::from_match(caps.name("day")?),
        time: Span::from_match(caps.name("time")?),
        year: Span::from_match(caps.name("year")?),
    })
}
