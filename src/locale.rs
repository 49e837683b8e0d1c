//! Explicit locale used when rendering cell display text and date formats.
//!
//! There is no ambient culture: every read and write takes a `Locale` (or falls
//! back to [`Locale::invariant`]).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::{SheetError, SheetResult};

/// Fallback rendering when a locale pattern cannot format a value
const ISO_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Render `value` with a strftime `pattern`, or `None` when the pattern asks
/// for something a naive value does not carry (`%z`, `%Z`, ...)
pub fn try_format_datetime(value: &NaiveDateTime, pattern: &str) -> Option<String> {
    let mut text = String::new();
    write!(text, "{}", value.format(pattern)).ok()?;
    Some(text)
}

/// Check that `pattern` is a strftime pattern a naive date-time can be
/// rendered with
pub fn check_datetime_pattern(pattern: &str) -> Result<(), String> {
    let sample = NaiveDate::from_ymd_opt(2000, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap_or_default();
    if pattern.trim().is_empty() || try_format_datetime(&sample, pattern).is_none() {
        return Err(format!("invalid date format '{}'", pattern));
    }
    Ok(())
}

/// Culture settings for display text and date cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    /// Name of the locale, informational only ("en-US", "invariant", ...)
    pub name: String,
    /// Decimal separator used when a number is rendered as text
    pub decimal_separator: char,
    /// chrono pattern used to render date-only values
    pub date_format: String,
    /// chrono pattern used to render date-time values
    pub datetime_format: String,
    /// Excel number format written on date-only cells
    pub excel_date_format: String,
    /// Excel number format written on date-time cells
    pub excel_datetime_format: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Locale {
    pub fn invariant() -> Self {
        Self {
            name: "invariant".to_string(),
            decimal_separator: '.',
            date_format: "%m/%d/%Y".to_string(),
            datetime_format: "%m/%d/%Y %H:%M:%S".to_string(),
            excel_date_format: "mm/dd/yyyy".to_string(),
            excel_datetime_format: "mm/dd/yyyy hh:mm:ss".to_string(),
        }
    }

    pub fn en_us() -> Self {
        Self {
            name: "en-US".to_string(),
            date_format: "%-m/%-d/%Y".to_string(),
            datetime_format: "%-m/%-d/%Y %-I:%M:%S %p".to_string(),
            excel_date_format: "m/d/yyyy".to_string(),
            excel_datetime_format: "m/d/yyyy h:mm:ss AM/PM".to_string(),
            ..Self::invariant()
        }
    }

    pub fn de_de() -> Self {
        Self {
            name: "de-DE".to_string(),
            decimal_separator: ',',
            date_format: "%d.%m.%Y".to_string(),
            datetime_format: "%d.%m.%Y %H:%M:%S".to_string(),
            excel_date_format: "dd.mm.yyyy".to_string(),
            excel_datetime_format: "dd.mm.yyyy hh:mm:ss".to_string(),
        }
    }

    pub fn nl_nl() -> Self {
        Self {
            name: "nl-NL".to_string(),
            decimal_separator: ',',
            date_format: "%-d-%-m-%Y".to_string(),
            datetime_format: "%-d-%-m-%Y %H:%M:%S".to_string(),
            excel_date_format: "d-m-yyyy".to_string(),
            excel_datetime_format: "d-m-yyyy hh:mm:ss".to_string(),
        }
    }

    /// Render a number the way a cell shows it under this locale
    pub fn format_number(&self, value: f64) -> String {
        let text = if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{:.0}", value)
        } else {
            value.to_string()
        };

        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }

    /// Fail with a configuration error when a date pattern of this locale
    /// cannot render naive values
    pub fn validate(&self) -> SheetResult<()> {
        for (field, pattern) in [
            ("date_format", &self.date_format),
            ("datetime_format", &self.datetime_format),
        ] {
            check_datetime_pattern(pattern)
                .map_err(|message| SheetError::configuration("Locale", field, message))?;
        }
        Ok(())
    }

    /// Render a date-time; values at midnight are shown as dates only.
    /// Falls back to ISO 8601 when the locale pattern cannot render it.
    pub fn format_datetime(&self, value: &NaiveDateTime) -> String {
        let pattern = if value.time() == NaiveTime::MIN {
            &self.date_format
        } else {
            &self.datetime_format
        };
        try_format_datetime(value, pattern).unwrap_or_else(|| value.format(ISO_DATETIME).to_string())
    }

    /// Parse text rendered with this locale's date or date-time pattern, then ISO 8601
    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        NaiveDateTime::parse_from_str(text, &self.datetime_format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, &self.date_format)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok())
            .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    }
}
