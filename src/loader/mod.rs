//! Series Loader
//!
//! Turns one raw delimited file into a [`CanonicalSeries`]:
//!
//! 1. read the file with the descriptor's separator, normalizing headers
//! 2. convert decimal-comma value text to floats
//! 3. rewrite localized month abbreviations when a locale is detected
//! 4. parse dates (explicit format or inference), counting failures
//! 5. drop duplicate dates (first wins) and sort
//! 6. reindex to a daily calendar and forward-fill gaps
//! 7. take the monthly median

pub mod dates;
pub mod locale;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::io::csv::{read_delimited, RawRecord};
use crate::series::CanonicalSeries;
use crate::temporal::DailySeries;

pub use self::dates::{parse_date, INFERRED_FORMATS};
pub use self::locale::{MonthLocale, ENGLISH_MONTHS};

/// Separator used when a descriptor does not name one
pub const DEFAULT_SEPARATOR: char = ';';

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

/// Where a raw series lives and how to read it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub path: PathBuf,
    pub date_column: String,
    pub value_column: String,
    #[serde(default = "default_separator")]
    pub separator: char,
    #[serde(default)]
    pub date_format: Option<String>,
}

impl DatasetDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        date_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Self {
        DatasetDescriptor {
            path: path.into(),
            date_column: date_column.into(),
            value_column: value_column.into(),
            separator: DEFAULT_SEPARATOR,
            date_format: None,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// `{file-stem}_{value_column}`, unique even when files share a value column name
    pub fn key(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}_{}", stem, self.value_column)
    }

    /// Same descriptor with its path resolved against `base`
    pub fn resolved(&self, base: &Path) -> Self {
        let mut descriptor = self.clone();
        if descriptor.path.is_relative() {
            descriptor.path = base.join(&descriptor.path);
        }
        descriptor
    }
}

/// What happened to the rows of one file while loading it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows in the file
    pub rows_read: usize,
    /// Rows dropped because the date did not parse
    pub unparseable_dates: usize,
    /// Rows dropped because their date was already seen
    pub duplicate_dates: usize,
    /// Rows that made it into the daily index
    pub rows_kept: usize,
    /// Rows whose value cell was empty
    pub missing_values: usize,
    /// Calendar days filled by carrying the previous value forward
    pub filled_days: usize,
    /// Locale applied to the date column, if any
    pub locale: Option<String>,
}

/// A loaded series together with its load report
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: CanonicalSeries,
    pub report: LoadReport,
}

/// Loader configured with the month locales it may apply
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    locales: Vec<MonthLocale>,
}

impl SeriesLoader {
    /// Loader that knows the given locales, tried in order
    pub fn new(locales: Vec<MonthLocale>) -> Self {
        SeriesLoader { locales }
    }

    /// Loader with the built-in Spanish table
    pub fn with_default_locales() -> Result<Self> {
        Ok(SeriesLoader::new(vec![MonthLocale::spanish()?]))
    }

    /// Add a locale after the existing ones
    pub fn with_locale(mut self, locale: MonthLocale) -> Self {
        self.locales.push(locale);
        self
    }

    pub fn locales(&self) -> &[MonthLocale] {
        &self.locales
    }

    /// Load one file into a canonical monthly series
    pub fn load(&self, descriptor: &DatasetDescriptor) -> Result<LoadedSeries> {
        let path = descriptor.path.as_path();
        let table = read_delimited(path, descriptor.separator)?;
        let records = table.records(&descriptor.date_column, &descriptor.value_column)?;

        let mut report = LoadReport {
            rows_read: records.len(),
            ..LoadReport::default()
        };

        let values = records
            .iter()
            .map(|record| parse_value(record, path, &descriptor.value_column))
            .collect::<Result<Vec<Option<f64>>>>()?;
        report.missing_values = values.iter().filter(|v| v.is_none()).count();

        let locale = self
            .locales
            .iter()
            .find(|locale| locale.detects(records.iter().map(|r| r.date.as_str())));
        report.locale = locale.map(|l| l.name().to_string());

        let format = descriptor.date_format.as_deref();
        let parsed: Vec<Option<NaiveDate>> = records
            .iter()
            .map(|record| {
                let text = locale
                    .and_then(|l| l.normalize(&record.date))
                    .unwrap_or_else(|| record.date.clone());
                parse_date(&text, format)
            })
            .collect();

        // first occurrence of each date wins
        let mut seen = HashSet::new();
        let mut rows: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(records.len());
        for (date, value) in parsed.into_iter().zip(values) {
            match date {
                None => report.unparseable_dates += 1,
                Some(date) if !seen.insert(date) => report.duplicate_dates += 1,
                Some(date) => rows.push((date, value)),
            }
        }
        rows.sort_by_key(|(date, _)| *date);
        report.rows_kept = rows.len();

        if report.unparseable_dates > 0 {
            log::warn!(
                "{}: dropped {} of {} rows with unparseable dates in column '{}'",
                path.display(),
                report.unparseable_dates,
                report.rows_read,
                descriptor.date_column
            );
        }
        if report.duplicate_dates > 0 {
            log::warn!(
                "{}: dropped {} rows with duplicate dates",
                path.display(),
                report.duplicate_dates
            );
        }
        if rows.is_empty() {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "no row of column '{}' holds a parseable date",
                    descriptor.date_column
                ),
            });
        }

        let (dates, values): (Vec<NaiveDate>, Vec<Option<f64>>) = rows.into_iter().unzip();
        let daily = DailySeries::new(dates, values, Some(descriptor.key()))?.reindex_daily();
        let filled = daily.forward_fill();
        report.filled_days = daily.missing_count() - filled.missing_count();

        let monthly = filled.resample().median();
        let series = CanonicalSeries::from_monthly(monthly, Some(descriptor.key()))?;

        match (series.start(), series.end()) {
            (Some(start), Some(end)) => log::info!(
                "loaded {} '{}': {} months from {} to {}",
                path.display(),
                descriptor.value_column,
                series.len(),
                start,
                end
            ),
            _ => log::warn!(
                "loaded {} '{}': no observed values",
                path.display(),
                descriptor.value_column
            ),
        }

        Ok(LoadedSeries { series, report })
    }
}

/// Load a file with the default locales and return only the series
pub fn load_series<P: AsRef<Path>>(
    path: P,
    date_column: &str,
    value_column: &str,
    separator: char,
    date_format: Option<&str>,
) -> Result<CanonicalSeries> {
    let mut descriptor =
        DatasetDescriptor::new(path.as_ref(), date_column, value_column).with_separator(separator);
    descriptor.date_format = date_format.map(str::to_string);
    Ok(SeriesLoader::with_default_locales()?.load(&descriptor)?.series)
}

/// Normalize decimal-comma text and parse it; empty cells are missing
fn parse_value(record: &RawRecord, path: &Path, column: &str) -> Result<Option<f64>> {
    let text = record.value.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::Conversion {
            path: path.to_path_buf(),
            column: column.to_string(),
            row: record.line as usize,
            value: record.value.clone(),
        })
}
