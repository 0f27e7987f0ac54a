pub mod parse;
pub mod week;
pub mod zone;

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::record::{DateValue, PhotoRecord};
use crate::sidecar::SidecarRecord;

pub use parse::{parse_date, parse_modified};
pub use week::{iso_week, iso_week_date, week_start};
pub use zone::Zone;

/// The zone and the "now" every resolution and grouping call works against.
///
/// Offset-less date strings are read as wall-clock time in `zone`, every
/// resolved instant carries the offset `zone` applies at that instant, and
/// `now` is the last-resort capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeContext {
    pub zone: Zone,
    pub now: DateTime<Utc>,
}

impl TimeContext {
    pub fn new(zone: impl Into<Zone>, now: DateTime<Utc>) -> Self {
        Self {
            zone: zone.into(),
            now,
        }
    }

    pub fn utc() -> Self {
        Self::new(Zone::utc(), Utc::now())
    }

    /// System zone and clock.
    pub fn local() -> Self {
        Self::new(Zone::Local, Utc::now())
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.zone.view(&self.now)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Where a resolved capture time came from, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// `photo.takenDateTime`
    Primary,
    /// A historical property, named by its path on the record.
    Legacy(&'static str),
    SidecarTaken,
    SidecarCreated,
    Modified,
    Now,
}

impl DateSource {
    /// Whether the time was recorded by the camera rather than guessed from the file.
    pub fn is_capture_metadata(&self) -> bool {
        !matches!(self, DateSource::Modified | DateSource::Now)
    }
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::Primary => f.write_str("photo.takenDateTime"),
            DateSource::Legacy(field) => f.write_str(field),
            DateSource::SidecarTaken => f.write_str("sidecar.photoTakenTime"),
            DateSource::SidecarCreated => f.write_str("sidecar.creationTime"),
            DateSource::Modified => f.write_str("mdate"),
            DateSource::Now => f.write_str("now"),
        }
    }
}

/// Result of capture-time resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedCaptureTime {
    pub instant: DateTime<FixedOffset>,
    pub source: DateSource,
}

type Probe = fn(&PhotoRecord) -> Option<&DateValue>;

/// Historical capture-time properties, in the order they are trusted.
static LEGACY_PROBES: &[(&str, Probe)] = &[
    ("exifDateTimeOriginal", |p| p.legacy.exif_date_time_original.as_ref()),
    ("exifDate", |p| p.legacy.exif_date.as_ref()),
    ("dateTaken", |p| p.legacy.date_taken.as_ref()),
    ("photoTakenTime", |p| p.legacy.photo_taken_time.as_ref()),
    ("dateTimeOriginal", |p| p.legacy.date_time_original.as_ref()),
    ("metadata.exifDateTimeOriginal", |p| {
        p.legacy.metadata.as_ref()?.exif_date_time_original.as_ref()
    }),
    ("metadata.dateTaken", |p| p.legacy.metadata.as_ref()?.date_taken.as_ref()),
    ("metadata.photoTakenTime", |p| p.legacy.metadata.as_ref()?.photo_taken_time.as_ref()),
    ("metadata.dateTimeOriginal", |p| {
        p.legacy.metadata.as_ref()?.date_time_original.as_ref()
    }),
    ("oc:exif-date", |p| p.legacy.oc_exif_date.as_ref()),
    ("oc:date-taken", |p| p.legacy.oc_date_taken.as_ref()),
    ("oc:photo-taken-time", |p| p.legacy.oc_photo_taken_time.as_ref()),
    ("additionalData.exifDate", |p| p.legacy.additional_data.as_ref()?.exif_date.as_ref()),
    ("additionalData.dateTaken", |p| p.legacy.additional_data.as_ref()?.date_taken.as_ref()),
    ("exif.DateTimeOriginal", |p| p.legacy.exif.as_ref()?.date_time_original.as_ref()),
    ("exif.DateTime", |p| p.legacy.exif.as_ref()?.date_time.as_ref()),
];

/// Best capture time recorded in the photo's own metadata, if any.
///
/// Tries `photo.takenDateTime` and then every legacy property; a value that is
/// present but unparseable is skipped, not fatal.
pub fn metadata_capture_time(photo: &PhotoRecord, ctx: &TimeContext) -> Option<ResolvedCaptureTime> {
    if let Some(instant) = photo.taken_date_time().and_then(|v| parse_date(v, &ctx.zone)) {
        return Some(ResolvedCaptureTime {
            instant,
            source: DateSource::Primary,
        });
    }

    LEGACY_PROBES.iter().find_map(|&(field, probe)| {
        let instant = parse_date(probe(photo)?, &ctx.zone)?;
        Some(ResolvedCaptureTime {
            instant,
            source: DateSource::Legacy(field),
        })
    })
}

/// Resolve the one authoritative capture time of `photo`.
///
/// Priority: record metadata, then the matched sidecar's taken and creation
/// times, then the file modification time, then `ctx.now`. Never fails.
pub fn resolve_capture_time(
    photo: &PhotoRecord,
    sidecar: Option<&SidecarRecord>,
    ctx: &TimeContext,
) -> ResolvedCaptureTime {
    if let Some(resolved) = metadata_capture_time(photo, ctx) {
        return resolved;
    }

    if let Some(sidecar) = sidecar {
        if let Some(instant) = sidecar.taken_at(&ctx.zone) {
            return ResolvedCaptureTime {
                instant,
                source: DateSource::SidecarTaken,
            };
        }
        if let Some(instant) = sidecar.created_at(&ctx.zone) {
            return ResolvedCaptureTime {
                instant,
                source: DateSource::SidecarCreated,
            };
        }
    }

    if let Some(instant) = photo.mdate.as_ref().and_then(|v| parse_modified(v, &ctx.zone)) {
        return ResolvedCaptureTime {
            instant,
            source: DateSource::Modified,
        };
    }

    ResolvedCaptureTime {
        instant: ctx.now(),
        source: DateSource::Now,
    }
}
