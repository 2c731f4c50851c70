//! Aligned panel of monthly series
//!
//! A [`Panel`] holds several named columns over one shared, strictly
//! increasing month index with no missing cells.

mod stationarity;

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::series::CanonicalSeries;
use crate::temporal::MonthPeriod;

pub use self::stationarity::{differ, StationaryPanel};

/// Named columns sharing one month index
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Month index
    index: Vec<MonthPeriod>,

    /// Column labels, in order
    columns: Vec<String>,

    /// Column-major cells; `data[c][i]` is column `c` at row `i`
    data: Vec<Vec<f64>>,
}

impl Panel {
    /// Create a panel, validating shape and index order
    pub fn new(index: Vec<MonthPeriod>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if let Some(pair) = index.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::Data(format!(
                "panel index must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }

        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != index.len() {
                return Err(Error::DimensionMismatch(format!(
                    "column '{}' has {} rows, index has {}",
                    name,
                    values.len(),
                    index.len()
                )));
            }
            if values.iter().any(|v| v.is_nan()) {
                return Err(Error::Data(format!("column '{}' contains missing cells", name)));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::Data(format!("duplicate column '{}'", name)));
            }
            names.push(name);
            data.push(values);
        }

        Ok(Panel {
            index,
            columns: names,
            data,
        })
    }

    /// Align keyed series on their month index, keeping only fully observed rows
    ///
    /// The union of all periods is walked in order and any period missing
    /// from at least one series is dropped, so the result has inner-join
    /// semantics.
    pub fn concat(series: Vec<(String, CanonicalSeries)>) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::Data("cannot build a panel from zero series".to_string()));
        }

        let all_periods: BTreeSet<MonthPeriod> = series
            .iter()
            .flat_map(|(_, s)| s.periods())
            .collect();

        let mut index = Vec::new();
        let mut data: Vec<Vec<f64>> = vec![Vec::new(); series.len()];
        let mut dropped = 0usize;

        for period in all_periods {
            let row: Option<Vec<f64>> = series.iter().map(|(_, s)| s.get(&period)).collect();
            match row {
                Some(row) => {
                    index.push(period);
                    for (column, value) in data.iter_mut().zip(row) {
                        column.push(value);
                    }
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::info!(
                "dropped {} months not covered by every series, {} remain",
                dropped,
                index.len()
            );
        }

        let columns = series
            .into_iter()
            .map(|(key, _)| key)
            .zip(data)
            .collect();
        Panel::new(index, columns)
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[MonthPeriod] {
        &self.index
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Values of a column
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.data[i].as_slice())
    }

    /// `(label, values)` pairs in column order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().map(Vec::as_slice))
    }

    /// One row across all columns
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.nrows() {
            return None;
        }
        Some(self.data.iter().map(|column| column[i]).collect())
    }

    /// Positionally replace every column label
    ///
    /// The label list must have exactly one entry per column.
    pub fn rename_columns(self, labels: &[String]) -> Result<Self> {
        if labels.len() != self.columns.len() {
            return Err(Error::Data(format!(
                "{} labels supplied for {} columns",
                labels.len(),
                self.columns.len()
            )));
        }
        let columns = labels.iter().cloned().zip(self.data).collect();
        Panel::new(self.index, columns)
    }

    /// Contiguous row slice, preserving column order
    pub fn slice_rows(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.nrows() {
            return Err(Error::InvalidInput(format!(
                "row range {:?} out of bounds for {} rows",
                range,
                self.nrows()
            )));
        }
        Ok(Panel {
            index: self.index[range.clone()].to_vec(),
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|column| column[range.clone()].to_vec())
                .collect(),
        })
    }

    /// Text table of the first `n` rows
    pub fn head(&self, n: usize) -> String {
        let mut out = String::new();
        let _ = write!(out, "{:<8}", "date");
        for name in &self.columns {
            let _ = write!(out, " {:>14}", truncate(name, 14));
        }
        out.push('\n');

        for i in 0..n.min(self.nrows()) {
            let _ = write!(out, "{:<8}", self.index[i]);
            for column in &self.data {
                let _ = write!(out, " {:>14.4}", column[i]);
            }
            out.push('\n');
        }
        out
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        s.chars().take(width).collect()
    }
}
