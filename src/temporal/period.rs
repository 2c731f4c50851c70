use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A calendar month (year + month) with no day granularity
///
/// Ordering is chronological, so periods can key ordered maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Create a period, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidInput(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(MonthPeriod { year, month })
    }

    /// The period containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        MonthPeriod {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following month
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            MonthPeriod {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthPeriod {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(&self, other: &MonthPeriod) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPeriod {
    type Err = Error;

    /// Parses the `YYYY-MM` form produced by `Display`
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::InvalidInput(format!("invalid month period: {:?}", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| Error::InvalidInput(format!("invalid year in period: {:?}", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| Error::InvalidInput(format!("invalid month in period: {:?}", s)))?;
        MonthPeriod::new(year, month)
    }
}
