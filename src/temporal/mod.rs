//! Calendar primitives for date-indexed series
//!
//! A small time-series toolkit: a daily series with optional values, the
//! "reindex to calendar" and "forward-fill gaps" primitives, and monthly
//! aggregation via [`Resample`].

mod date_range;
mod period;
mod resample;

use chrono::NaiveDate;

use crate::error::{Error, Result};

pub use self::date_range::date_range;
pub use self::period::MonthPeriod;
pub use self::resample::{median, Resample};

/// A series keyed by strictly increasing calendar days
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    /// Day index
    dates: Vec<NaiveDate>,

    /// Values, `None` where missing
    values: Vec<Option<f64>>,

    /// Series name
    name: Option<String>,
}

impl DailySeries {
    /// Create a daily series; dates must be strictly increasing
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>, name: Option<String>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(Error::DimensionMismatch(format!(
                "dates ({}) and values ({}) differ in length",
                dates.len(),
                values.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidInput(format!(
                "dates must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }

        Ok(DailySeries {
            dates,
            values,
            name,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Reindex onto a continuous daily calendar spanning the first and last date
    ///
    /// Days absent from the original index become missing.
    pub fn reindex_daily(&self) -> Self {
        let (start, end) = match (self.start(), self.end()) {
            (Some(start), Some(end)) => (start, end),
            _ => return self.clone(),
        };

        let calendar = date_range(start, end);
        let mut values = Vec::with_capacity(calendar.len());
        let mut source = self.dates.iter().zip(self.values.iter()).peekable();

        for day in &calendar {
            match source.peek() {
                Some((date, value)) if *date == day => {
                    values.push(**value);
                    source.next();
                }
                _ => values.push(None),
            }
        }

        DailySeries {
            dates: calendar,
            values,
            name: self.name.clone(),
        }
    }

    /// Replace each missing value with the last observed value before it
    ///
    /// Leading missing values stay missing.
    pub fn forward_fill(&self) -> Self {
        let mut last = None;
        let values = self
            .values
            .iter()
            .map(|value| {
                if value.is_some() {
                    last = *value;
                }
                last
            })
            .collect();

        DailySeries {
            dates: self.dates.clone(),
            values,
            name: self.name.clone(),
        }
    }

    /// Monthly resampling
    pub fn resample(&self) -> Resample<'_> {
        Resample::new(self)
    }
}
