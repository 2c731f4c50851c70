use chrono::NaiveDate;

/// Every calendar day from `start` to `end`, both inclusive
///
/// Returns an empty vector when `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|day| *day <= end).collect()
}
