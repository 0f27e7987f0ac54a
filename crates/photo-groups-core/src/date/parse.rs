use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::zone::{parse_offset, Zone};
use crate::record::{DateValue, TimestampValue};

/// Epoch seconds of 3000-01-01. Numbers below it are seconds, the rest milliseconds.
pub const SECONDS_CUTOFF: f64 = 32_503_680_000.0;

/// Largest representable instant, in epoch milliseconds (±100,000,000 days).
const MAX_EPOCH_MILLIS: i64 = 8_640_000_000_000_000;

static EXIF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}):(\d{2}):(\d{2})\s+(\d{2}):(\d{2}):(\d{2})$").unwrap()
});

/// ISO date-time followed by `Z` or a numeric offset, seconds optional.
static ISO_OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?)\s*(z|[+-]\d{2}(?::?\d{2})?)$")
        .unwrap()
});

/// `YYYY` or `YYYY-MM`.
static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(?:-(\d{2}))?$").unwrap());

/// Date-times without an offset; read as wall-clock time in the caller's zone.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M:%S",
];

/// Dates without a time; read as local midnight.
const LOCAL_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%B %d %Y", "%d %B %Y"];

/// Normalize a loosely typed date value into an instant viewed in `zone`.
///
/// Numbers are epoch seconds when their magnitude is below [`SECONDS_CUTOFF`] and
/// epoch milliseconds otherwise. `{timestamp}` objects carry epoch seconds. Strings
/// in EXIF form (`YYYY:MM:DD HH:MM:SS`) and other offset-less strings are taken as
/// wall-clock fields in `zone`. An EXIF string with an out-of-range field
/// (`2021:13:15 ...`, `2021:02:30 ...`) is rejected rather than rolled over into
/// the next month. Zero, empty and unparseable values give `None`.
pub fn parse_date(value: &DateValue, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    match value {
        DateValue::Number(n) => parse_epoch(*n, zone),
        DateValue::Timestamp { timestamp } => parse_epoch_seconds(timestamp, zone),
        DateValue::Text(s) => parse_text(s, zone),
        DateValue::Other(_) => None,
    }
}

/// Normalize a modification time: numbers are always epoch milliseconds and
/// strings go through the general parser only.
pub fn parse_modified(value: &DateValue, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    match value {
        DateValue::Number(n) if *n != 0.0 && n.is_finite() => from_millis(n.trunc() as i64, zone),
        DateValue::Text(s) if !s.is_empty() => parse_general(s, zone),
        _ => None,
    }
}

/// Interpret a `timestamp` payload as epoch seconds.
pub fn parse_epoch_seconds(
    timestamp: &TimestampValue,
    zone: &Zone,
) -> Option<DateTime<FixedOffset>> {
    let seconds = match timestamp {
        TimestampValue::Text(s) => parse_leading_int(s)?,
        TimestampValue::Number(n) if *n != 0.0 && n.is_finite() => n.trunc() as i64,
        TimestampValue::Number(_) => return None,
    };
    from_millis(seconds.checked_mul(1000)?, zone)
}

fn parse_epoch(n: f64, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    let millis = if n.abs() < SECONDS_CUTOFF { n * 1000.0 } else { n };
    from_millis(millis.trunc() as i64, zone)
}

fn from_millis(millis: i64, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    if millis.unsigned_abs() > MAX_EPOCH_MILLIS as u64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| zone.view(&dt))
}

/// Integer prefix of `s` after leading whitespace: `"123abc"` is 123, `"abc"` is nothing.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let unsigned = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let sign_len = s.len() - unsigned.len();
    s[..sign_len + digits].parse().ok()
}

fn parse_text(s: &str, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = EXIF_RE.captures(s) {
        let field = |i: usize| caps[i].parse::<u32>().ok();
        let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, field(2)?, field(3)?)?;
        let naive = date.and_hms_opt(field(4)?, field(5)?, field(6)?)?;
        return zone.from_local(&naive);
    }

    parse_general(s, zone)
}

/// Calendar parsing for everything that is not EXIF text: RFC 3339, RFC 2822
/// (WebDAV `getlastmodified`), ISO-like date-times with or without an offset,
/// bare years and months, and English month-name dates.
fn parse_general(s: &str, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(zone.view(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(zone.view(&dt));
    }
    if let Some(caps) = ISO_OFFSET_RE.captures(s) {
        let offset = parse_offset(&caps[2])?;
        let naive = parse_local(&caps[1])?;
        let dt = offset.from_local_datetime(&naive).single()?;
        return Some(zone.view(&dt));
    }
    if let Some(naive) = parse_local(s) {
        return zone.from_local(&naive);
    }

    // ISO date-only forms are UTC midnight, other dates local midnight.
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(zone.view(&Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)));
    }
    if let Some(caps) = YEAR_MONTH_RE.captures(s) {
        let month = caps.get(2).map_or(Some(1), |m| m.as_str().parse().ok())?;
        let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, month, 1)?;
        return Some(zone.view(&Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?)));
    }
    for fmt in LOCAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return zone.from_local(&date.and_hms_opt(0, 0, 0)?);
        }
    }

    None
}

fn parse_local(s: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
