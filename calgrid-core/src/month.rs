//! Reference month for the grid, plus month-to-month navigation.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalGridError, CalGridResult};

/// A calendar month, always anchored on its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> CalGridResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Month { first })
            .ok_or_else(|| CalGridError::InvalidMonth(format!("{year}-{month:02}")))
    }

    /// The month a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Month {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The month of today's date in the local calendar.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// The day before the following month's first day.
    pub fn last_day(&self) -> NaiveDate {
        // Only the final month chrono can represent has no successor.
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Month::containing(date) == *self
    }

    /// One calendar month later, rolling over into the next year after December.
    pub fn next(&self) -> Self {
        // Past chrono's supported range there is nowhere to go; stay put.
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Month { first })
            .unwrap_or(*self)
    }

    /// One calendar month earlier, rolling back into the previous year before January.
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Month { first })
            .unwrap_or(*self)
    }

    /// Step `n` months forward (positive) or backward (negative).
    pub fn offset(&self, n: i32) -> Self {
        let step = |m: Month| if n >= 0 { m.next() } else { m.previous() };
        (0..n.unsigned_abs()).fold(*self, |m, _| step(m))
    }

    /// English month name, e.g. "March".
    pub fn name(&self) -> String {
        self.first.format("%B").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl FromStr for Month {
    type Err = CalGridError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| CalGridError::InvalidMonth(format!("'{s}'. Expected YYYY-MM")))?;
        Ok(Month { first })
    }
}
