//! Excel serial date numbers (1900 date system)
//!
//! Serial 1 is 1900-01-01. Excel treats 1900 as a leap year, so serial 60 is
//! the non-existent 1900-02-29 and every later serial is one day ahead.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn epoch(serial_day: i64) -> Option<NaiveDateTime> {
    let base = if serial_day < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    Some(base.and_time(NaiveTime::MIN))
}

/// Serial number → date-time, rounded to the millisecond
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let millis = ((serial - serial.trunc()) * MILLIS_PER_DAY).round() as i64;
    epoch(days)?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Date-time → serial number
pub fn datetime_to_serial(value: &NaiveDateTime) -> f64 {
    let modern = NaiveDate::from_ymd_opt(1899, 12, 30)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or_default();
    let elapsed = value.signed_duration_since(modern);
    let days = elapsed.num_days();
    let remainder = (elapsed - Duration::days(days)).num_milliseconds() as f64 / MILLIS_PER_DAY;

    // dates before 1900-03-01 sit one serial lower
    let days = if days < 61 { days - 1 } else { days };
    days as f64 + remainder
}
