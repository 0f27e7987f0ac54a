use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::{week_start, TimeContext};
use crate::error::ParseLocaleError;
use crate::group::GroupMode;

/// Display language for group labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
    Fr,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::De, Locale::Fr, Locale::Es];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
            Locale::Fr => "fr",
            Locale::Es => "es",
        }
    }

    /// Locale for a language tag such as `de-AT` or `fr_FR.UTF-8`, English if unsupported.
    pub fn detect(tag: &str) -> Locale {
        tag.parse().unwrap_or_default()
    }

    fn names(&self) -> &'static Names {
        match self {
            Locale::En => &EN,
            Locale::De => &DE,
            Locale::Fr => &FR,
            Locale::Es => &ES,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s.trim().split(|c: char| matches!(c, '-' | '_' | '.')).next().unwrap_or("");
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str().eq_ignore_ascii_case(language))
            .ok_or_else(|| ParseLocaleError(s.to_string()))
    }
}

struct Names {
    today: &'static str,
    yesterday: &'static str,
    months: [&'static str; 12],
    short_months: [&'static str; 12],
    /// Monday first.
    weekdays: [&'static str; 7],
}

static EN: Names = Names {
    today: "Today",
    yesterday: "Yesterday",
    months: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],
    short_months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
};

static DE: Names = Names {
    today: "Heute",
    yesterday: "Gestern",
    months: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    short_months: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    weekdays: ["Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag"],
};

static FR: Names = Names {
    today: "Aujourd'hui",
    yesterday: "Hier",
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    short_months: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
        "déc.",
    ],
    weekdays: ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"],
};

static ES: Names = Names {
    today: "Hoy",
    yesterday: "Ayer",
    months: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    short_months: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    weekdays: ["lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo"],
};

/// Everything label formatting depends on, passed in rather than read from globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelContext {
    pub locale: Locale,
    pub today: NaiveDate,
}

impl LabelContext {
    pub fn new(locale: Locale, today: NaiveDate) -> Self {
        Self { locale, today }
    }

    pub fn from_time(locale: Locale, ctx: &TimeContext) -> Self {
        Self::new(locale, ctx.today())
    }
}

/// Human label for a group key. Keys that do not parse are returned unchanged.
pub fn format_group_key(key: &str, mode: GroupMode, ctx: &LabelContext) -> String {
    let label = match mode {
        GroupMode::Year => None,
        GroupMode::Month => parse_month_key(key).map(|(y, m)| month_label(y, m, ctx.locale)),
        GroupMode::Week => parse_week_key(key)
            .and_then(|(y, w)| week_start(y, w))
            .map(|monday| week_label(monday, ctx.locale)),
        GroupMode::Day => NaiveDate::parse_from_str(key, "%Y-%m-%d")
            .ok()
            .map(|date| day_label(date, ctx)),
    };
    label.unwrap_or_else(|| key.to_string())
}

fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year.parse().ok()?, month))
}

fn parse_week_key(key: &str) -> Option<(i32, u32)> {
    let (year, week) = key.split_once("-W")?;
    Some((year.parse().ok()?, week.parse().ok()?))
}

fn day_label(date: NaiveDate, ctx: &LabelContext) -> String {
    let names = ctx.locale.names();
    if date == ctx.today {
        return names.today.to_string();
    }
    if Some(date) == ctx.today.pred_opt() {
        return names.yesterday.to_string();
    }

    let weekday = names.weekdays[date.weekday().num_days_from_monday() as usize];
    let month = names.months[date.month0() as usize];
    let (d, y) = (date.day(), date.year());
    match ctx.locale {
        Locale::En => format!("{weekday}, {month} {d}, {y}"),
        Locale::De => format!("{weekday}, {d}. {month} {y}"),
        Locale::Fr => format!("{weekday} {d} {month} {y}"),
        Locale::Es => format!("{weekday}, {d} de {month} de {y}"),
    }
}

fn month_label(year: i32, month: u32, locale: Locale) -> String {
    let name = locale.names().months[month as usize - 1];
    match locale {
        Locale::Es => format!("{name} de {year}"),
        _ => format!("{name} {year}"),
    }
}

/// `<Monday> - <Sunday, year>`; only the end carries the year.
fn week_label(monday: NaiveDate, locale: Locale) -> String {
    let sunday = monday + Duration::days(6);
    let short = |date: NaiveDate| locale.names().short_months[date.month0() as usize];
    match locale {
        Locale::En => format!(
            "{} {} - {} {}, {}",
            short(monday),
            monday.day(),
            short(sunday),
            sunday.day(),
            sunday.year()
        ),
        Locale::De => format!(
            "{}. {} - {}. {} {}",
            monday.day(),
            short(monday),
            sunday.day(),
            short(sunday),
            sunday.year()
        ),
        Locale::Fr | Locale::Es => format!(
            "{} {} - {} {} {}",
            monday.day(),
            short(monday),
            sunday.day(),
            short(sunday),
            sunday.year()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(locale: Locale) -> LabelContext {
        LabelContext::new(locale, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap())
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("de".parse::<Locale>(), Ok(Locale::De));
        assert_eq!("fr-CA".parse::<Locale>(), Ok(Locale::Fr));
        assert_eq!("es_ES.UTF-8".parse::<Locale>(), Ok(Locale::Es));
        assert!("ja".parse::<Locale>().is_err());
        assert_eq!(Locale::detect("ja-JP"), Locale::En);
        assert_eq!(Locale::detect("de-AT"), Locale::De);
    }

    #[test]
    fn test_day_labels() {
        let en = labels(Locale::En);
        assert_eq!(format_group_key("2026-01-10", GroupMode::Day, &en), "Today");
        assert_eq!(format_group_key("2026-01-09", GroupMode::Day, &en), "Yesterday");
        assert_eq!(
            format_group_key("2026-01-08", GroupMode::Day, &en),
            "Thursday, January 8, 2026"
        );
        assert_eq!(format_group_key("2026-01-09", GroupMode::Day, &labels(Locale::De)), "Gestern");
        assert_eq!(
            format_group_key("2025-12-24", GroupMode::Day, &labels(Locale::De)),
            "Mittwoch, 24. Dezember 2025"
        );
        assert_eq!(
            format_group_key("2025-12-24", GroupMode::Day, &labels(Locale::Fr)),
            "mercredi 24 décembre 2025"
        );
        assert_eq!(
            format_group_key("2025-12-24", GroupMode::Day, &labels(Locale::Es)),
            "miércoles, 24 de diciembre de 2025"
        );
    }

    #[test]
    fn test_week_labels() {
        let en = labels(Locale::En);
        assert_eq!(format_group_key("2026-W02", GroupMode::Week, &en), "Jan 5 - Jan 11, 2026");
        assert_eq!(format_group_key("2026-W01", GroupMode::Week, &en), "Dec 29 - Jan 4, 2026");
        // 2027 starts on a Friday; week 1 opens on 4 January.
        assert_eq!(format_group_key("2027-W01", GroupMode::Week, &en), "Jan 4 - Jan 10, 2027");
        assert_eq!(format_group_key("2020-W53", GroupMode::Week, &en), "Dec 28 - Jan 3, 2021");
        assert_eq!(
            format_group_key("2026-W02", GroupMode::Week, &labels(Locale::De)),
            "5. Jan. - 11. Jan. 2026"
        );
    }

    #[test]
    fn test_month_and_year_labels() {
        assert_eq!(format_group_key("2026-03", GroupMode::Month, &labels(Locale::En)), "March 2026");
        assert_eq!(format_group_key("2026-03", GroupMode::Month, &labels(Locale::De)), "März 2026");
        assert_eq!(format_group_key("2026-03", GroupMode::Month, &labels(Locale::Es)), "marzo de 2026");
        assert_eq!(format_group_key("2026", GroupMode::Year, &labels(Locale::Fr)), "2026");
    }

    #[test]
    fn test_invalid_keys_pass_through() {
        let en = labels(Locale::En);
        assert_eq!(format_group_key("2026-13", GroupMode::Month, &en), "2026-13");
        assert_eq!(format_group_key("2026-W60", GroupMode::Week, &en), "2026-W60");
        assert_eq!(format_group_key("someday", GroupMode::Day, &en), "someday");
    }
}
