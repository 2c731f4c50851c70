use chrono::format::ParseErrorKind;
use chrono::NaiveDate;

/// Formats tried in order when no explicit format is configured
pub const INFERRED_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b-%y",
    "%b-%Y",
    "%Y-%m",
    "%m/%Y",
];

/// Parse a date with an explicit format, or by inference when `format` is `None`
///
/// Formats without a day field resolve to the first day of the month.
pub fn parse_date(text: &str, format: Option<&str>) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match format {
        Some(format) => parse_with_format(text, format),
        None => INFERRED_FORMATS
            .iter()
            .find_map(|format| parse_with_format(text, format)),
    }
}

fn parse_with_format(text: &str, format: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, format) {
        Ok(date) => Some(date),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            NaiveDate::parse_from_str(&format!("{}|1", text), &format!("{}|%d", format)).ok()
        }
        Err(_) => None,
    }
}
