//! `From ` separator parsing: grammar matching, envelope-sender extraction, and date assembly.

pub mod date;
pub mod envelope;
pub mod from_line;
pub mod grammar;

pub use date::{CalendarRecord, REFERENCE_YEAR};
pub use from_line::{is_from, FromLine};
