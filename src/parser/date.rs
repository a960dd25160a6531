//! Delivery date assembly for separator lines.
//!
//! The separator carries an asctime(3)-style date with no reliable zone
//! information, so the fields are always read as UTC. This keeps dates
//! taken from the same mailbox comparable across machines.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use serde::Serialize;

use super::grammar::CaptureSet;

/// Years in a [`CalendarRecord`] are stored as an offset from this year.
pub const REFERENCE_YEAR: i32 = 1900;

/// Two-digit years at or above this value belong to the 1900s, the rest to the 2000s.
const TWO_DIGIT_YEAR_PIVOT: u32 = 70;

const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// Broken-down calendar fields of a separator date.
///
/// Fields are not range-checked; [`CalendarRecord::to_utc`] normalizes
/// out-of-range values by carrying them into the next unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CalendarRecord {
    /// Zero-based month (January is 0).
    pub month: u32,
    /// Day of the month, starting at 1.
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Years since [`REFERENCE_YEAR`] (1998 is stored as 98, 2024 as 124).
    pub year: i32,
    /// Daylight-saving flag. `None` lets the converter decide; UTC has no DST.
    pub dst: Option<bool>,
}

impl CalendarRecord {
    /// The full Gregorian year.
    pub fn full_year(&self) -> i32 {
        REFERENCE_YEAR.saturating_add(self.year)
    }

    /// Convert to an absolute time, reading every field as UTC.
    ///
    /// Returns `None` only when the result is outside chrono's range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let year = REFERENCE_YEAR.checked_add(self.year)?;
        let date = NaiveDate::from_ymd_opt(year, 1, 1)?.checked_add_months(Months::new(self.month))?;
        let offset = TimeDelta::try_days(i64::from(self.day) - 1)?
            .checked_add(&TimeDelta::try_hours(i64::from(self.hour))?)?
            .checked_add(&TimeDelta::try_minutes(i64::from(self.minute))?)?
            .checked_add(&TimeDelta::try_seconds(i64::from(self.second))?)?;
        let ndt = date.and_hms_opt(0, 0, 0)?.checked_add_signed(offset)?;
        Some(Utc.from_utc_datetime(&ndt))
    }

    /// Break an absolute time into calendar fields.
    pub fn from_utc(dt: &DateTime<Utc>) -> Self {
        Self {
            month: dt.month0(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            year: dt.year() - REFERENCE_YEAR,
            dst: None,
        }
    }
}

/// A run of ASCII digits found at the start of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DigitRun<'a> {
    value: u32,
    digits: usize,
    rest: &'a [u8],
}

/// Parse the leading run of digits in `bytes`, skipping leading blanks.
///
/// Returns `None` when there is no digit or the value overflows `u32`.
fn parse_digits(bytes: &[u8]) -> Option<DigitRun<'_>> {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let bytes = &bytes[start..];
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let value = bytes[..digits].iter().try_fold(0u32, |acc, &b| {
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })?;
    Some(DigitRun {
        value,
        digits,
        rest: &bytes[digits..],
    })
}

/// Zero-based month index for an English month abbreviation (ASCII case-insensitive).
pub fn month_index(text: &[u8]) -> Option<u32> {
    let abbr = text.get(..3)?;
    MONTHS
        .iter()
        .position(|m| m[..].eq_ignore_ascii_case(abbr))
        .and_then(|i| u32::try_from(i).ok())
}

/// Parse `HH:MM:SS`. Missing or unparsable subfields stay at zero.
fn parse_time(bytes: &[u8]) -> (u32, u32, u32) {
    let mut fields = [0u32; 3];
    let mut rest = bytes;
    for (i, slot) in fields.iter_mut().enumerate() {
        if i > 0 {
            match rest.strip_prefix(b":") {
                Some(r) => rest = r,
                None => break,
            }
        }
        match parse_digits(rest) {
            Some(run) => {
                *slot = run.value;
                rest = run.rest;
            }
            None => break,
        }
    }
    (fields[0], fields[1], fields[2])
}

/// Parse a 2- or 4-digit year into an offset from [`REFERENCE_YEAR`].
fn parse_year(bytes: &[u8]) -> Option<i32> {
    let run = parse_digits(bytes)?;
    let mut year = i32::try_from(run.value).ok()?;
    if run.digits <= 2 {
        year += if run.value >= TWO_DIGIT_YEAR_PIVOT { 1900 } else { 2000 };
    }
    Some(year - REFERENCE_YEAR)
}

/// Build the calendar record from the date captures of a matched line.
///
/// Never fails: a subfield that does not parse is left at zero.
pub fn assemble(line: &[u8], caps: &CaptureSet) -> CalendarRecord {
    let (hour, minute, second) = parse_time(caps.time.slice(line));
    CalendarRecord {
        month: month_index(caps.month.slice(line)).unwrap_or(0),
        day: parse_digits(caps.day.slice(line)).map_or(0, |run| run.value),
        hour,
        minute,
        second,
        year: parse_year(caps.year.slice(line)).unwrap_or(0),
        dst: None,
    }
}
