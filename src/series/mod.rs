//! Canonical monthly series
//!
//! A [`CanonicalSeries`] is gap-free by construction: it stores the first
//! period and one value per consecutive month, so keys are strictly
//! increasing and never repeat.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::temporal::MonthPeriod;

/// Gap-free, strictly increasing monthly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSeries {
    /// First period, `None` only for an empty series
    start: Option<MonthPeriod>,

    /// One value per consecutive month starting at `start`
    values: Vec<f64>,

    /// Series name
    name: Option<String>,
}

impl CanonicalSeries {
    /// Create a series from a start period and consecutive monthly values
    pub fn new(start: MonthPeriod, values: Vec<f64>, name: Option<String>) -> Self {
        let start = if values.is_empty() { None } else { Some(start) };
        CanonicalSeries {
            start,
            values,
            name,
        }
    }

    /// Create an empty series
    pub fn empty(name: Option<String>) -> Self {
        CanonicalSeries {
            start: None,
            values: Vec::new(),
            name,
        }
    }

    /// Build from monthly aggregates
    ///
    /// Periods must be strictly increasing and consecutive. Missing values at
    /// either end are trimmed; a missing value between two observations is an
    /// error because it would leave a gap.
    pub fn from_monthly(points: Vec<(MonthPeriod, Option<f64>)>, name: Option<String>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[0].0.succ() != pair[1].0 {
                return Err(Error::Data(format!(
                    "monthly points are not consecutive: {} followed by {}",
                    pair[0].0, pair[1].0
                )));
            }
        }

        let first = points.iter().position(|(_, v)| v.is_some());
        let last = points.iter().rposition(|(_, v)| v.is_some());
        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(CanonicalSeries::empty(name)),
        };

        let mut values = Vec::with_capacity(last - first + 1);
        for (period, value) in &points[first..=last] {
            match value {
                Some(v) => values.push(*v),
                None => {
                    return Err(Error::Data(format!(
                        "series {} has no value for {}",
                        name.as_deref().unwrap_or("<unnamed>"),
                        period
                    )))
                }
            }
        }

        Ok(CanonicalSeries {
            start: Some(points[first].0),
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

    /// Rename the series
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn start(&self) -> Option<MonthPeriod> {
        self.start
    }

    pub fn end(&self) -> Option<MonthPeriod> {
        self.periods().last().copied()
    }

    /// The month index, in order
    pub fn periods(&self) -> Vec<MonthPeriod> {
        let mut periods = Vec::with_capacity(self.values.len());
        if let Some(mut period) = self.start {
            for _ in 0..self.values.len() {
                periods.push(period);
                period = period.succ();
            }
        }
        periods
    }

    /// Value for a period, if inside the index
    pub fn get(&self, period: &MonthPeriod) -> Option<f64> {
        let start = self.start?;
        let offset = start.months_until(period);
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied()
    }

    /// `(period, value)` pairs in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (MonthPeriod, f64)> + '_ {
        self.periods().into_iter().zip(self.values.iter().copied())
    }
}
