//! Recurring month-day interval, applied independently within every year.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A month-day pair such as `10-01`. Ordering is (month, day), which matches
/// lexicographic order of the zero-padded `MM-DD` string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self> {
        // Validate against a leap year so 02-29 is accepted.
        NaiveDate::from_ymd_opt(2024, month, day)
            .with_context(|| format!("{:02}-{:02} is not a valid month-day", month, day))?;
        Ok(Self { month, day })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// The recurring window `[start, end]`, inclusive on both bounds.
///
/// The window never wraps across year-end: an interval with `start > end`
/// matches nothing, and `parse_interval` rejects that form up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarInterval {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl CalendarInterval {
    /// Inclusive containment of a date's month-day component.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let md = MonthDay::from_date(date);
        self.start <= md && md <= self.end
    }
}

impl fmt::Display for CalendarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_month_day(text: &str) -> Result<MonthDay> {
    let (month, day) = text
        .split_once('-')
        .with_context(|| format!("'{}' is not in MM-DD format", text))?;
    if month.len() != 2 || day.len() != 2 {
        anyhow::bail!("'{}' is not in MM-DD format (two digits each)", text);
    }
    let month: u32 = month
        .parse()
        .with_context(|| format!("'{}' has a non-numeric month", text))?;
    let day: u32 = day
        .parse()
        .with_context(|| format!("'{}' has a non-numeric day", text))?;
    MonthDay::new(month, day)
}

/// Parses `MM-DD,MM-DD` into a [`CalendarInterval`].
///
/// Pure validation only; re-prompting on failure is the caller's concern.
pub fn parse_interval(text: &str) -> Result<CalendarInterval> {
    let (start, end) = text
        .split_once(',')
        .context("expected 'MM-DD,MM-DD' (e.g. 10-01,10-15)")?;
    let start = parse_month_day(start.trim())?;
    let end = parse_month_day(end.trim())?;
    if start > end {
        anyhow::bail!("interval start {} is after end {}", start, end);
    }
    Ok(CalendarInterval { start, end })
}
