use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::{iso_week_date, resolve_capture_time, TimeContext};
use crate::enrich::{enrich_photos, EnrichedPhoto};
use crate::error::ParseGroupModeError;
use crate::label::{format_group_key, LabelContext};
use crate::record::PhotoRecord;
use crate::sidecar::{SidecarIndex, SidecarRecord};

/// Calendar granularity of a grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl GroupMode {
    pub const ALL: [GroupMode; 4] = [GroupMode::Day, GroupMode::Week, GroupMode::Month, GroupMode::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::Day => "day",
            GroupMode::Week => "week",
            GroupMode::Month => "month",
            GroupMode::Year => "year",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupMode {
    type Err = ParseGroupModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseGroupModeError(s.to_string()))
    }
}

/// Group key of an instant, taken from its calendar fields in its own offset.
///
/// `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `YYYY-Www` (ISO week-year and week). All
/// parts are zero-padded, so comparing keys as strings orders them in time.
pub fn date_key(instant: &DateTime<FixedOffset>, mode: GroupMode) -> String {
    let date = instant.date_naive();
    match mode {
        GroupMode::Year => format!("{:04}", date.year()),
        GroupMode::Month => format!("{:04}-{:02}", date.year(), date.month()),
        GroupMode::Day => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        GroupMode::Week => {
            let (year, week) = iso_week_date(date);
            format!("{:04}-W{:02}", year, week)
        }
    }
}

/// Group key of a photo after resolving its capture time.
pub fn group_key(
    photo: &PhotoRecord,
    mode: GroupMode,
    sidecar: Option<&SidecarRecord>,
    ctx: &TimeContext,
) -> String {
    date_key(&resolve_capture_time(photo, sidecar, ctx).instant, mode)
}

/// Photos sharing one date key, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    pub key: String,
    pub photos: Vec<EnrichedPhoto>,
}

impl DateGroup {
    pub fn with_label(self, mode: GroupMode, labels: &LabelContext) -> LabeledGroup {
        LabeledGroup {
            label: format_group_key(&self.key, mode, labels),
            key: self.key,
            photos: self.photos,
        }
    }
}

/// A [`DateGroup`] with its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledGroup {
    pub key: String,
    pub label: String,
    pub photos: Vec<EnrichedPhoto>,
}

/// Partition photos into date groups.
///
/// Groups come out newest key first. Inside a group photos are ordered by
/// capture time, newest first; equal times keep their input order. Every
/// input photo lands in exactly one group.
pub fn group_by_date(
    photos: &[PhotoRecord],
    mode: GroupMode,
    sidecars: Option<&SidecarIndex>,
    ctx: &TimeContext,
) -> Vec<DateGroup> {
    let enriched = enrich_photos(photos, sidecars, ctx);

    let mut buckets: HashMap<String, Vec<EnrichedPhoto>> = HashMap::new();
    for photo in enriched {
        buckets
            .entry(date_key(&photo.captured.instant, mode))
            .or_default()
            .push(photo);
    }

    let mut groups: Vec<DateGroup> = buckets
        .into_iter()
        .map(|(key, mut photos)| {
            // Stable: ties keep arrival order.
            photos.sort_by(|a, b| b.captured.instant.cmp(&a.captured.instant));
            DateGroup { key, photos }
        })
        .collect();
    groups.sort_by(|a, b| b.key.cmp(&a.key));

    debug!("group_by_date({}): {} photos -> {} groups", mode, photos.len(), groups.len());
    groups
}

/// [`group_by_date`] plus display labels.
pub fn group_by_date_labeled(
    photos: &[PhotoRecord],
    mode: GroupMode,
    sidecars: Option<&SidecarIndex>,
    ctx: &TimeContext,
    labels: &LabelContext,
) -> Vec<LabeledGroup> {
    group_by_date(photos, mode, sidecars, ctx)
        .into_iter()
        .map(|group| group.with_label(mode, labels))
        .collect()
}

/// Number of photos per date key.
pub fn photo_counts_by_date(
    photos: &[PhotoRecord],
    mode: GroupMode,
    sidecars: Option<&SidecarIndex>,
    ctx: &TimeContext,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for photo in photos {
        let sidecar = sidecars.and_then(|index| index.get_for(photo));
        *counts.entry(group_key(photo, mode, sidecar, ctx)).or_insert(0) += 1;
    }
    counts
}
