//! Calendar dates with validation.
//!
//! `CalendarDate` is the only date type the rest of the crate accepts for
//! user-facing dates (due dates, report periods). Every constructor validates,
//! so an impossible date such as the 30th of February can never be observed.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earliest year a `CalendarDate` may carry.
pub const MIN_YEAR: i32 = 2000;
/// Latest year a `CalendarDate` may carry.
pub const MAX_YEAR: i32 = 2100;

/// A calendar date was rejected by validation or could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidDateError(pub String);

/// Gregorian leap year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. Months outside 1-12 yield 0.
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        1..=12 => 31,
        _ => 0,
    }
}

/// Check a day/month/year triple. Month is checked first, then the day against
/// the month length, then the year bound.
pub fn validate(day: u32, month: u32, year: i32) -> Result<(), InvalidDateError> {
    if !(1..=12).contains(&month) {
        return Err(InvalidDateError(format!(
            "month out of range: {month} (expected 1-12)"
        )));
    }
    let max = days_in_month(month, year);
    if day < 1 || day > max {
        return Err(InvalidDateError(format!(
            "day out of range: {day} (expected 1-{max} for month {month})"
        )));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(InvalidDateError(format!(
            "year out of range: {year} (expected {MIN_YEAR}-{MAX_YEAR})"
        )));
    }
    Ok(())
}

/// A validated calendar date between `MIN_YEAR` and `MAX_YEAR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self, InvalidDateError> {
        validate(day, month, year)?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(CalendarDate)
            .ok_or_else(|| InvalidDateError(format!("invalid date: {year}-{month}-{day}")))
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Strictly before `today`. The caller supplies the current date.
    pub fn is_before(&self, today: NaiveDate) -> bool {
        self.0 < today
    }
}

impl TryFrom<NaiveDate> for CalendarDate {
    type Error = InvalidDateError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        CalendarDate::new(date.day(), date.month(), date.year())
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = InvalidDateError;

    /// Parse an ISO `YYYY-MM-DD` string, reporting the validator's message
    /// for well-formed but impossible dates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognised = || InvalidDateError(format!("unrecognised date: {s}"));
        let mut parts = s.trim().splitn(3, '-');
        let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(unrecognised());
        };
        let year = y.parse::<i32>().map_err(|_| unrecognised())?;
        let month = m.parse::<u32>().map_err(|_| unrecognised())?;
        let day = d.parse::<u32>().map_err(|_| unrecognised())?;
        CalendarDate::new(day, month, year)
    }
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<CalendarDate, InvalidDateError> {
    let s = input.trim().to_lowercase();

    let relative = match s.as_str() {
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        _ => match s.strip_prefix("in ").and_then(parse_offset) {
            Some(offset) => {
                let date = offset.and_then(|d| today.checked_add_signed(d));
                Some(date.ok_or_else(|| InvalidDateError(format!("date offset out of range: {s}")))?)
            }
            None => None,
        },
    };

    match relative {
        Some(date) => CalendarDate::try_from(date),
        None => s.parse(),
    }
}

/// Parse the `Nd` / `Nw` part of "in Nd". The outer `None` means the text is
/// not an offset; the inner one means the offset overflows a `Duration`.
fn parse_offset(rest: &str) -> Option<Option<Duration>> {
    let rest = rest.trim();
    if let Some(n) = rest.strip_suffix('d') {
        let days = n.trim().parse::<i64>().ok()?;
        return Some(Duration::try_days(days));
    }
    if let Some(n) = rest.strip_suffix('w') {
        let weeks = n.trim().parse::<i64>().ok()?;
        return Some(Duration::try_weeks(weeks));
    }
    None
}
