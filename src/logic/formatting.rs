//! Formatting and display logic
//!
//! Pure functions for formatting dates and sizes for human-readable display.

use chrono::{DateTime, FixedOffset, Locale, NaiveDate, NaiveDateTime, Timelike, Utc};
use thiserror::Error;

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_DATE_FORMAT: &str = "MMMM D, YYYY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateFormatError {
    #[error("expected a calendar date, a timestamp in milliseconds or a date string, got {0:?}")]
    InvalidDate(String),
}

/// Anything the formatter accepts as a date
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    /// Milliseconds since the Unix epoch
    Timestamp(i64),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        DateInput::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(dt: DateTime<Utc>) -> Self {
        DateInput::DateTime(dt.fixed_offset())
    }
}

impl From<i64> for DateInput {
    fn from(millis: i64) -> Self {
        DateInput::Timestamp(millis)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

fn utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

fn parse_text(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(text) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(utc(naive));
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0).map(utc);
        }
    }
    None
}

impl DateInput {
    /// Resolve to a concrete instant; naive values are taken as UTC
    pub fn resolve(&self) -> Result<DateTime<FixedOffset>, DateFormatError> {
        let resolved = match self {
            DateInput::Date(date) => date.and_hms_opt(0, 0, 0).map(utc),
            DateInput::DateTime(dt) => Some(*dt),
            DateInput::Timestamp(millis) => {
                DateTime::<Utc>::from_timestamp_millis(*millis).map(|dt| dt.fixed_offset())
            }
            DateInput::Text(text) => parse_text(text),
        };

        resolved.ok_or_else(|| {
            let shown = match self {
                DateInput::Text(text) => text.clone(),
                other => format!("{:?}", other),
            };
            DateFormatError::InvalidDate(shown)
        })
    }
}

/// Map a language tag such as `es`, `es-CL` or `fr_FR` to a chrono locale
pub fn resolve_locale(tag: &str) -> Locale {
    let normalized = tag.trim().replace('-', "_");
    if let Ok(locale) = Locale::try_from(normalized.as_str()) {
        return locale;
    }

    let language = normalized.split('_').next().unwrap_or("").to_lowercase();
    let regional = match language.as_str() {
        "es" => "es_ES",
        "fr" => "fr_FR",
        "de" => "de_DE",
        "it" => "it_IT",
        "pt" => "pt_PT",
        "nl" => "nl_NL",
        "ca" => "ca_ES",
        "ja" => "ja_JP",
        _ => "en_US",
    };
    Locale::try_from(regional).unwrap_or(Locale::en_US)
}

/// Token table for Day.js style templates, longest tokens first
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("d", "%w"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
    ("Z", "%:z"),
];

/// Translate a Day.js display template (`MMMM D, YYYY`, `[literal]`) to strftime
///
/// # Examples
/// ```
/// use spbrowse::logic::formatting::translate_template;
///
/// assert_eq!(translate_template("MMMM D, YYYY"), "%B %-d, %Y");
/// assert_eq!(translate_template("D [de] MMMM"), "%-d de %B");
/// assert_eq!(translate_template("YYYY-MM-DD"), "%Y-%m-%d");
/// ```
pub fn translate_template(template: &str) -> String {
    translate(template, None)
}

/// Template translation; with a `meridiem`, `A`/`a` become that literal text
fn translate(template: &str, meridiem: Option<&str>) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end].replace('%', "%%"));
                rest = &rest[end + 1..];
                continue;
            }
        }

        for (token, strftime) in TOKENS {
            if rest.starts_with(token) {
                match (*token, meridiem) {
                    ("A", Some(text)) => out.push_str(&text.replace('%', "%%")),
                    ("a", Some(text)) => out.push_str(&text.to_lowercase().replace('%', "%%")),
                    _ => out.push_str(strftime),
                }
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }

        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Format a date for display in the given locale and Day.js style template
///
/// Defaults to [`DEFAULT_LOCALE`] and [`DEFAULT_DATE_FORMAT`]. Fails with
/// [`DateFormatError::InvalidDate`] when the input is not a valid date.
///
/// # Examples
/// ```
/// use spbrowse::logic::formatting::format_date;
///
/// assert_eq!(format_date("2024-10-25", None, None).unwrap(), "October 25, 2024");
/// assert_eq!(
///     format_date("2024-10-25", Some("es"), Some("D [de] MMMM [de] YYYY")).unwrap(),
///     "25 de octubre de 2024"
/// );
/// assert!(format_date("not-a-date", None, None).is_err());
/// ```
pub fn format_date(
    input: impl Into<DateInput>,
    locale: Option<&str>,
    format: Option<&str>,
) -> Result<String, DateFormatError> {
    let instant = input.into().resolve()?;
    let locale = resolve_locale(locale.unwrap_or(DEFAULT_LOCALE));
    let marker = meridiem(&instant, locale);
    let pattern = translate(format.unwrap_or(DEFAULT_DATE_FORMAT), Some(&marker));

    Ok(instant.format_localized(&pattern, locale).to_string())
}

/// AM/PM marker in the locale, or the English one where the locale has none
fn meridiem(instant: &DateTime<FixedOffset>, locale: Locale) -> String {
    let localized = instant.format_localized("%p", locale).to_string();
    if !localized.trim().is_empty() {
        return localized;
    }
    let english = if instant.hour() < 12 { "AM" } else { "PM" };
    english.to_string()
}

/// Format bytes into human-readable string (e.g., "1.20 KB", "5.30 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
