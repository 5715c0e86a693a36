//! Calendar helpers for `YYYY-MM-DD` dates.
//!
//! Receipt dates are compared as strings, which orders correctly for
//! zero-padded ISO dates. These helpers only validate, shift by a year, and
//! read today's date from the system clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Parse `YYYY-MM-DD` into `(year, month, day)`, checking calendar ranges.
pub fn parse_iso_date(s: &str) -> Option<(i32, u32, u32)> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| -> Option<u32> {
        let part = &s[range];
        if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse().ok()
        } else {
            None
        }
    };

    let year = digits(0..4)? as i32;
    let month = digits(5..7)?;
    let day = digits(8..10)?;

    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }
    Some((year, month, day))
}

pub fn is_iso_date(s: &str) -> bool {
    parse_iso_date(s).is_some()
}

/// The same calendar day one year earlier. Feb 29 rolls forward to Mar 1.
pub fn one_year_before(date: &str) -> Option<String> {
    let (year, month, day) = parse_iso_date(date)?;
    let year = year - 1;
    if month == 2 && day == 29 && days_in_month(year, 2) == 28 {
        return Some(format!("{:04}-03-01", year));
    }
    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}

/// January 1st of the date's year.
pub fn year_start(date: &str) -> Option<String> {
    let (year, _, _) = parse_iso_date(date)?;
    Some(format!("{:04}-01-01", year))
}

/// Today's UTC date from the system clock.
pub fn today_utc() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}
