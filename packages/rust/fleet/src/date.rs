//! Date normalization for fleet tables.
//!
//! Fleet exports mix several date spellings in one column:
//! - `MM/DD/YYYY` (spreadsheet exports)
//! - `YYYY-MM-DD` (ISO)
//! - `YYYYMMDD` (packed integers from older tooling)
//! - `YYYY` (year only, taken as January 1)
//! - empty or `-1` (unknown)

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use cyclusgen_shared::{CyclusGenError, Result};
use regex::Regex;

/// Days past this in a month round the month up by one.
pub const HALF_MONTH_DAY: u32 = 16;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

static US_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("US date regex")
});

static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("ISO date regex")
});

static PACKED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("packed date regex")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("year regex"));

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a date cell into a calendar date, or `None` when the cell is unknown.
///
/// `field` names the column in the returned [`CyclusGenError::Format`].
pub fn parse_date(field: &str, raw: &str) -> Result<Option<NaiveDate>> {
    let s = raw.trim();
    if s.is_empty() || s == "-1" {
        return Ok(None);
    }

    let (year, month, day) = if let Some(caps) = US_RE.captures(s) {
        ymd_parts(&caps[3], &caps[1], &caps[2])
    } else if let Some(caps) = ISO_RE.captures(s) {
        ymd_parts(&caps[1], &caps[2], &caps[3])
    } else if let Some(caps) = PACKED_RE.captures(s) {
        ymd_parts(&caps[1], &caps[2], &caps[3])
    } else if let Some(caps) = YEAR_RE.captures(s) {
        ymd_parts(&caps[1], "1", "1")
    } else {
        return Err(CyclusGenError::format(
            field,
            format!("unrecognized date '{s}'"),
        ));
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| CyclusGenError::format(field, format!("no such calendar day '{s}'")))
}

/// Parse a date cell that must be present (e.g. a scenario start date).
pub fn parse_required_date(field: &str, raw: &str) -> Result<NaiveDate> {
    parse_date(field, raw)?
        .ok_or_else(|| CyclusGenError::format(field, "date is required but empty"))
}

/// Convert regex-captured digit groups; the patterns bound their length, so
/// parsing cannot overflow.
fn ymd_parts(year: &str, month: &str, day: &str) -> (i32, u32, u32) {
    (
        year.parse().unwrap_or_default(),
        month.parse().unwrap_or_default(),
        day.parse().unwrap_or_default(),
    )
}

// ---------------------------------------------------------------------------
// YearMonth
// ---------------------------------------------------------------------------

/// A calendar month, the granularity of simulation timesteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl YearMonth {
    /// Reduce a date to its month, rounding up when the day is past mid-month.
    ///
    /// December dates that round up carry into January of the next year.
    pub fn from_date(date: NaiveDate) -> Self {
        let (mut year, mut month) = (date.year(), date.month());
        if date.day() > HALF_MONTH_DAY {
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Self { year, month }
    }

    /// Months elapsed since year zero; differences give month offsets.
    pub fn ordinal(&self) -> i32 {
        self.year * 12 + self.month as i32
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
