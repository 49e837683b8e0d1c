//! Format specifiers applied to numeric and date fields on export.
//!
//! Numeric fields take a .NET-style standard specifier (`F2`, `N0`, `P1`,
//! `E3`, `D5`, `G`); date fields take a chrono strftime pattern. Output is
//! always culture-invariant.

use chrono::NaiveTime;
use regex::Regex;
use std::sync::OnceLock;

use super::value::{NativeValue, ScalarKind};
use crate::locale::{check_datetime_pattern, try_format_datetime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFormat {
    /// `F`: fixed point
    Fixed,
    /// `N`: fixed point with thousands separators
    Number,
    /// `P`: multiplied by 100, with a percent sign
    Percent,
    /// `E`/`e`: scientific
    Exponential { upper: bool },
    /// `D`: integer digits, zero padded
    Decimal,
    /// `G`: shortest round-trip text
    General,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormatSpec {
    Numeric {
        format: NumericFormat,
        precision: Option<usize>,
    },
    DateTime(String),
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([FfNnPpEeDdGg])(\d{1,2})?$").expect("static format pattern"))
}

impl FormatSpec {
    /// Parse `spec` for a field of `kind`. Kinds that take no format give
    /// `Ok(None)`.
    pub fn parse(spec: &str, kind: ScalarKind) -> Result<Option<Self>, String> {
        if kind.is_numeric() {
            let caps = numeric_pattern()
                .captures(spec.trim())
                .ok_or_else(|| format!("unsupported numeric format '{}'", spec))?;
            let letter = caps[1].chars().next().unwrap_or('G');
            let format = match letter {
                'F' | 'f' => NumericFormat::Fixed,
                'N' | 'n' => NumericFormat::Number,
                'P' | 'p' => NumericFormat::Percent,
                'E' => NumericFormat::Exponential { upper: true },
                'e' => NumericFormat::Exponential { upper: false },
                'D' | 'd' => {
                    if !kind.is_integer() {
                        return Err(format!("format '{}' needs an integer field", spec));
                    }
                    NumericFormat::Decimal
                }
                _ => NumericFormat::General,
            };
            let precision = caps.get(2).and_then(|m| m.as_str().parse().ok());
            return Ok(Some(FormatSpec::Numeric { format, precision }));
        }

        if kind.is_temporal() {
            check_datetime_pattern(spec)?;
            return Ok(Some(FormatSpec::DateTime(spec.to_string())));
        }

        Ok(None)
    }

    /// Render `value`, or `None` when it is not something this format applies to
    pub fn format(&self, value: &NativeValue) -> Option<String> {
        match self {
            FormatSpec::Numeric { format, precision } => format_numeric(*format, *precision, value),
            FormatSpec::DateTime(pattern) => {
                let timestamp = match value {
                    NativeValue::Date(date) => date.and_time(NaiveTime::MIN),
                    NativeValue::DateTime(dt) => *dt,
                    _ => return None,
                };
                try_format_datetime(&timestamp, pattern)
            }
        }
    }
}

fn format_numeric(format: NumericFormat, precision: Option<usize>, value: &NativeValue) -> Option<String> {
    let number = value.as_f64()?;
    Some(match format {
        NumericFormat::Fixed => fixed(number, precision.unwrap_or(2)),
        NumericFormat::Number => group_thousands(&fixed(number, precision.unwrap_or(2))),
        NumericFormat::Percent => format!("{} %", group_thousands(&fixed(number * 100.0, precision.unwrap_or(2)))),
        NumericFormat::Exponential { upper } => exponential(number, precision.unwrap_or(6), upper),
        NumericFormat::Decimal => {
            let whole = value.as_i128()?;
            let digits = format!("{:0width$}", whole.unsigned_abs(), width = precision.unwrap_or(1));
            if whole < 0 {
                format!("-{}", digits)
            } else {
                digits
            }
        }
        NumericFormat::General => match value.as_i128() {
            Some(whole) => whole.to_string(),
            None => general(number, precision),
        },
    })
}

fn fixed(number: f64, precision: usize) -> String {
    let text = format!("{:.*}", precision, number);
    // "-0.00" reads as zero
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn exponential(number: f64, precision: usize, upper: bool) -> String {
    let text = format!("{:.*e}", precision, number);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:03}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

fn general(number: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) if digits > 0 => {
            let rounded: f64 = format!("{:.*e}", digits - 1, number).parse().unwrap_or(number);
            rounded.to_string()
        }
        _ => number.to_string(),
    }
}
