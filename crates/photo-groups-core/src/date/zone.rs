use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseZoneError;

static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(z)|([+-])(\d{2}):?(\d{2})?)$").unwrap());

/// The zone calendar fields are read and written in.
///
/// `Local` and `Named` zones apply the rule in force at each instant, so a
/// winter photo and a summer photo each get their own offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Zone {
    Fixed(FixedOffset),
    /// The system zone.
    Local,
    /// An IANA zone such as `Europe/Berlin`.
    Named(Tz),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Offset in force at a UTC wall-clock time.
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Zone::Fixed(offset) => *offset,
            Zone::Local => Local.offset_from_utc_datetime(utc).fix(),
            Zone::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    /// The same instant, expressed with this zone's offset at that instant.
    pub fn view<T: TimeZone>(&self, instant: &DateTime<T>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(&instant.naive_utc()))
    }

    /// Wall-clock fields read in this zone.
    ///
    /// A repeated hour resolves to its earlier occurrence. A skipped hour keeps
    /// the offset in force before the transition, which moves it forward.
    pub fn from_local(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let resolved = match self {
            Zone::Fixed(offset) => earliest(offset.from_local_datetime(naive)),
            Zone::Local => earliest(Local.from_local_datetime(naive)),
            Zone::Named(tz) => earliest(tz.from_local_datetime(naive)),
        };
        if resolved.is_some() {
            return resolved;
        }

        let day_before = naive.checked_sub_signed(Duration::days(1))?;
        let before = self.offset_at(&day_before);
        let utc = naive.checked_sub_signed(Duration::seconds(before.local_minus_utc().into()))?;
        Some(self.view(&Utc.from_utc_datetime(&utc)))
    }
}

fn earliest<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<DateTime<FixedOffset>> {
    match result {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        LocalResult::None => None,
    }
}

/// `Z`, `+02`, `+0200` or `+02:00`.
pub(crate) fn parse_offset(s: &str) -> Option<FixedOffset> {
    let caps = OFFSET_RE.captures(s)?;
    if caps.get(1).is_some() {
        return Some(Utc.fix());
    }
    let hours: i32 = caps[3].parse().ok()?;
    let minutes: i32 = caps.get(4).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if minutes >= 60 {
        return None;
    }
    let seconds = hours * 3600 + minutes * 60;
    FixedOffset::east_opt(if &caps[2] == "-" { -seconds } else { seconds })
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
            Zone::Local => f.write_str("local"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for Zone {
    type Err = ParseZoneError;

    /// `local`, `UTC`, a fixed offset like `+02:00`, or an IANA name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        if s.eq_ignore_ascii_case("utc") {
            return Ok(Zone::utc());
        }
        if let Some(offset) = parse_offset(s) {
            return Ok(Zone::Fixed(offset));
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| ParseZoneError(s.to_string()))
    }
}

impl TryFrom<String> for Zone {
    type Error = ParseZoneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn berlin() -> Zone {
        "Europe/Berlin".parse().unwrap()
    }

    fn naive(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!("local".parse::<Zone>(), Ok(Zone::Local));
        assert_eq!("utc".parse::<Zone>(), Ok(Zone::utc()));
        assert_eq!("Z".parse::<Zone>(), Ok(Zone::utc()));
        assert_eq!(
            "+05:30".parse::<Zone>(),
            Ok(Zone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap()))
        );
        assert_eq!("-08".parse::<Zone>(), Ok(Zone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap())));
        assert_eq!(berlin(), Zone::Named(chrono_tz::Europe::Berlin));
        assert!("Mars/Olympus".parse::<Zone>().is_err());
        assert_eq!(berlin().to_string(), "Europe/Berlin");
        assert_eq!(Zone::utc().to_string(), "UTC");
    }

    #[test]
    fn test_zone_serde() {
        let zone: Zone = serde_json::from_str(r#""Europe/Berlin""#).unwrap();
        assert_eq!(zone, berlin());
        assert_eq!(serde_json::to_string(&zone).unwrap(), r#""Europe/Berlin""#);
        assert!(serde_json::from_str::<Zone>(r#""nowhere""#).is_err());
    }

    #[test]
    fn test_offset_follows_daylight_saving() {
        let zone = berlin();
        let winter = Utc.with_ymd_and_hms(2026, 1, 10, 22, 30, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2026, 7, 10, 22, 30, 0).unwrap();

        let w = zone.view(&winter);
        assert_eq!(w.offset().local_minus_utc(), 3600);
        assert_eq!(w.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());

        let s = zone.view(&summer);
        assert_eq!(s.offset().local_minus_utc(), 7200);
        assert_eq!(s.date_naive(), NaiveDate::from_ymd_opt(2026, 7, 11).unwrap());
    }

    #[test]
    fn test_wall_clock_in_named_zone() {
        let zone = berlin();
        let winter = zone.from_local(&naive(2026, 1, 10, 23, 30)).unwrap();
        assert_eq!(winter.naive_utc(), naive(2026, 1, 10, 22, 30));

        let summer = zone.from_local(&naive(2026, 7, 10, 23, 30)).unwrap();
        assert_eq!(summer.naive_utc(), naive(2026, 7, 10, 21, 30));
    }

    #[test]
    fn test_transition_hours() {
        let zone = berlin();
        // 02:30 does not exist on 29 March 2026; it lands at 03:30 summer time.
        let skipped = zone.from_local(&naive(2026, 3, 29, 2, 30)).unwrap();
        assert_eq!(skipped.naive_utc(), naive(2026, 3, 29, 1, 30));
        assert_eq!(skipped.hour(), 3);

        // 02:30 happens twice on 25 October 2026; the first one wins.
        let repeated = zone.from_local(&naive(2026, 10, 25, 2, 30)).unwrap();
        assert_eq!(repeated.naive_utc(), naive(2026, 10, 25, 0, 30));
    }

    #[test]
    fn test_fixed_zone_is_constant() {
        let zone = Zone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let dt = zone.from_local(&naive(2026, 7, 1, 8, 0)).unwrap();
        assert_eq!(dt.naive_utc(), naive(2026, 6, 30, 23, 0));
        assert_eq!(zone.offset_at(&naive(2026, 1, 1, 0, 0)), zone.offset_at(&naive(2026, 7, 1, 0, 0)));
    }
}
