use std::collections::BTreeMap;

use crate::temporal::{DailySeries, MonthPeriod};

/// Monthly resampling of a daily series
#[derive(Debug)]
pub struct Resample<'a> {
    /// Source series
    series: &'a DailySeries,
}

impl<'a> Resample<'a> {
    pub fn new(series: &'a DailySeries) -> Self {
        Resample { series }
    }

    /// Median of the observed values in each month
    pub fn median(&self) -> Vec<(MonthPeriod, Option<f64>)> {
        self.aggregate(median)
    }

    /// Resample with a custom aggregator
    ///
    /// Every month between the first and last date appears in the output, in
    /// order. The aggregator receives only the non-missing values of a month
    /// and may return `None` (e.g. for an empty slice).
    pub fn aggregate<F>(&self, aggregator: F) -> Vec<(MonthPeriod, Option<f64>)>
    where
        F: Fn(&[f64]) -> Option<f64>,
    {
        let (first, last) = match (self.series.start(), self.series.end()) {
            (Some(first), Some(last)) => (MonthPeriod::from_date(first), MonthPeriod::from_date(last)),
            _ => return Vec::new(),
        };

        let mut groups: BTreeMap<MonthPeriod, Vec<f64>> = BTreeMap::new();
        for (date, value) in self.series.dates().iter().zip(self.series.values()) {
            let bucket = groups.entry(MonthPeriod::from_date(*date)).or_default();
            if let Some(v) = value {
                bucket.push(*v);
            }
        }

        let mut result = Vec::with_capacity(first.months_until(&last).max(0) as usize + 1);
        let mut period = first;
        while period <= last {
            let aggregated = groups
                .get(&period)
                .and_then(|values| aggregator(values.as_slice()));
            result.push((period, aggregated));
            period = period.succ();
        }
        result
    }
}

/// Median of a slice; the mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
