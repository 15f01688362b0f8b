use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use thiserror::Error;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Any structural or range violation in a `MM-YYYY` token.
/// Callers only ever report "wrong format", so no sub-reason is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid date format (use MM-YYYY)")]
pub struct InvalidDateFormat;

/// A calendar month, normalized to its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }
    /// First day of the month at midnight, UTC
    pub fn midnight_utc(&self) -> DateTime<Utc> {
        self.0.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

impl From<MonthYear> for NaiveDate {
    fn from(value: MonthYear) -> Self {
        value.0
    }
}

impl FromStr for MonthYear {
    type Err = InvalidDateFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split('-');
        let (month, year) = match (parts.next(), parts.next(), parts.next()) {
            (Some(month), Some(year), None) => (month, year),
            _ => return Err(InvalidDateFormat),
        };

        let month: u32 = month.parse().map_err(|_| InvalidDateFormat)?;
        if !(1..=12).contains(&month) {
            return Err(InvalidDateFormat);
        }

        let year: i32 = year.parse().map_err(|_| InvalidDateFormat)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(InvalidDateFormat);
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(InvalidDateFormat)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%m-%Y"))
    }
}

/// Parse a `MM-YYYY` token into the first day of that month
pub fn parse_month_year(token: &str) -> Result<MonthYear, InvalidDateFormat> {
    token.parse()
}
