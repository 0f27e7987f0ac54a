use chrono::{Datelike, Duration, NaiveDate};

/// ISO-8601 week number (1..=53) of `date`.
pub fn iso_week(date: NaiveDate) -> u32 {
    iso_week_date(date).1
}

/// ISO-8601 `(week-year, week)` of `date`.
///
/// The week belongs to the year of its Thursday: shift the date to the Thursday
/// of its own Monday-based week, count the days since 1 January of that year and
/// take `ceil((days + 1) / 7)`. A date whose Thursday falls outside the calendar
/// range degrades to week 1 of its own year.
pub fn iso_week_date(date: NaiveDate) -> (i32, u32) {
    let weekday = date.weekday().number_from_monday() as i64;
    let Some(thursday) = date.checked_add_signed(Duration::days(4 - weekday)) else {
        return (date.year(), 1);
    };
    let Some(year_start) = NaiveDate::from_ymd_opt(thursday.year(), 1, 1) else {
        return (date.year(), 1);
    };
    let elapsed = (thursday - year_start).num_days();
    (thursday.year(), ((elapsed + 7) / 7) as u32)
}

/// Monday of ISO week `week` in week-year `year`.
///
/// Week 1 is the week holding 4 January, so its Monday is 4 January moved back
/// to Monday; later weeks follow in steps of seven days.
pub fn week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if week == 0 || week > 53 {
        return None;
    }
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let monday = jan4.checked_sub_signed(Duration::days(jan4.weekday().num_days_from_monday() as i64))?;
    monday.checked_add_signed(Duration::weeks(week as i64 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_boundaries() {
        // 2026 starts on a Thursday: 29 Dec 2025 opens week 1.
        assert_eq!(iso_week_date(date(2025, 12, 29)), (2026, 1));
        assert_eq!(iso_week_date(date(2026, 1, 1)), (2026, 1));
        assert_eq!(iso_week_date(date(2026, 1, 4)), (2026, 1));
        assert_eq!(iso_week_date(date(2026, 1, 5)), (2026, 2));
        // 2021 starts on a Friday: 1-3 Jan belong to week 53 of 2020.
        assert_eq!(iso_week_date(date(2021, 1, 1)), (2020, 53));
        assert_eq!(iso_week_date(date(2021, 1, 3)), (2020, 53));
        assert_eq!(iso_week_date(date(2021, 1, 4)), (2021, 1));
        // 2024-12-30 is a Monday in week 1 of 2025.
        assert_eq!(iso_week_date(date(2024, 12, 30)), (2025, 1));
        assert_eq!(iso_week(date(2026, 1, 10)), 2);
    }

    #[test]
    fn test_matches_chrono_iso_week() {
        let mut day = date(1999, 12, 1);
        let end = date(2031, 1, 31);
        while day <= end {
            let iso = day.iso_week();
            assert_eq!(iso_week_date(day), (iso.year(), iso.week()), "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_start_round_trip() {
        let mut day = date(2019, 12, 1);
        let end = date(2028, 1, 31);
        while day <= end {
            let (year, week) = iso_week_date(day);
            let monday = week_start(year, week).unwrap();
            let offset = (day - monday).num_days();
            assert!((0..7).contains(&offset), "{day} -> {year}-W{week:02}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_week_start_known_values() {
        assert_eq!(week_start(2026, 1), Some(date(2025, 12, 29)));
        assert_eq!(week_start(2026, 2), Some(date(2026, 1, 5)));
        assert_eq!(week_start(2027, 1), Some(date(2027, 1, 4)));
        assert_eq!(week_start(2026, 0), None);
        assert_eq!(week_start(2026, 54), None);
    }

    #[test]
    fn test_degenerate_range_falls_back_to_week_one() {
        // The Thursday of the last representable week lies beyond NaiveDate::MAX.
        let last = NaiveDate::MAX;
        if last.weekday().number_from_monday() < 4 {
            assert_eq!(iso_week_date(last), (last.year(), 1));
        }
    }
}
