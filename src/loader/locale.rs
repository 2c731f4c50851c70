use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Canonical English month abbreviations understood by `%b`
pub const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"^[[:alpha:]]+$").expect("static month token pattern");
}

/// Lookup table from localized month abbreviations to English ones
///
/// A locale only rewrites date text of the form `<token>-YY` (whitespace
/// around the dash tolerated, token case-insensitive). Anything else is left
/// alone so already-canonical dates are never touched.
#[derive(Debug, Clone)]
pub struct MonthLocale {
    name: String,
    /// Lower-case token -> English abbreviation
    months: BTreeMap<String, String>,
    pattern: Regex,
}

impl MonthLocale {
    /// Build a locale from `(token, English abbreviation)` pairs
    pub fn new<I, K, V>(name: impl Into<String>, months: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = name.into();
        let mut table = BTreeMap::new();

        for (token, english) in months {
            let token = token.as_ref().trim().to_lowercase();
            let english = english.as_ref().trim();
            if !TOKEN.is_match(&token) {
                return Err(Error::InvalidInput(format!(
                    "locale '{}': month token {:?} must be alphabetic",
                    name, token
                )));
            }
            let canonical = ENGLISH_MONTHS
                .iter()
                .find(|m| m.eq_ignore_ascii_case(english))
                .ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "locale '{}': {:?} is not an English month abbreviation",
                        name, english
                    ))
                })?;
            table.insert(token, canonical.to_string());
        }

        if table.is_empty() {
            return Err(Error::InvalidInput(format!("locale '{}' has no months", name)));
        }

        let alternatives = table
            .keys()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&format!(r"^\s*({})\s*-\s*(\d{{2}})\s*$", alternatives))
            .case_insensitive(true)
            .build()?;

        Ok(MonthLocale {
            name,
            months: table,
            pattern,
        })
    }

    /// Spanish abbreviations as used by Latin American statistics offices
    pub fn spanish() -> Result<Self> {
        MonthLocale::new(
            "es",
            [
                ("ene", "Jan"),
                ("feb", "Feb"),
                ("mar", "Mar"),
                ("abr", "Apr"),
                ("may", "May"),
                ("jun", "Jun"),
                ("jul", "Jul"),
                ("ago", "Aug"),
                ("sep", "Sep"),
                ("oct", "Oct"),
                ("nov", "Nov"),
                ("dic", "Dec"),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// English abbreviation for a localized token
    pub fn translate_token(&self, token: &str) -> Option<&str> {
        self.months.get(&token.to_lowercase()).map(String::as_str)
    }

    /// Whether any of the dates is written in this locale
    pub fn detects<'a, I>(&self, dates: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        dates.into_iter().any(|d| self.pattern.is_match(d))
    }

    /// Rewrite `<token>-YY` as `<English>-YY`, `None` if the text does not match
    pub fn normalize(&self, date: &str) -> Option<String> {
        let caps = self.pattern.captures(date)?;
        let english = self.translate_token(caps.get(1)?.as_str())?;
        Some(format!("{}-{}", english, caps.get(2)?.as_str()))
    }
}
