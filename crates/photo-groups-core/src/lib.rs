pub mod classify;
pub mod date;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod group;
pub mod label;
pub mod record;
pub mod sidecar;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use classify::{filter_photos, has_exif_tag, is_image, IMAGE_EXTENSIONS};
pub use date::{parse_date, resolve_capture_time, DateSource, ResolvedCaptureTime, TimeContext, Zone};
pub use enrich::{enrich_photos, EnrichedPhoto};
pub use error::{ParseGroupModeError, ParseLocaleError, ParseZoneError, SidecarError};
pub use geo::{cluster_points, distance_meters, photo_location, GeoCluster};
pub use group::{group_by_date, group_by_date_labeled, group_key, DateGroup, GroupMode, LabeledGroup};
pub use label::{format_group_key, LabelContext, Locale};
pub use record::{DateValue, GeoPoint, PhotoRecord};
pub use sidecar::{
    build_sidecar_index, image_name_from_sidecar, is_sidecar, parse_sidecar_content, SidecarFile,
    SidecarIndex, SidecarRecord,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineOptions {
    #[serde(default)]
    pub mode: GroupMode,
    #[serde(default)]
    pub locale: Locale,
    /// Bucket in UTC instead of the system zone.
    #[serde(default)]
    pub utc: bool,
    /// Explicit zone; wins over `utc`.
    #[serde(default)]
    pub timezone: Option<Zone>,
}

impl TimelineOptions {
    pub fn zone(&self) -> Zone {
        match self.timezone {
            Some(zone) => zone,
            None if self.utc => Zone::utc(),
            None => Zone::Local,
        }
    }

    pub fn time_context(&self) -> TimeContext {
        TimeContext::new(self.zone(), chrono::Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub mode: GroupMode,
    pub groups: Vec<LabeledGroup>,
    pub total_records: usize,
    pub photo_count: usize,
    pub sidecar_count: usize,
}

impl Timeline {
    /// Every grouped photo that carries a position, newest group first.
    pub fn geotagged(&self) -> impl Iterator<Item = (&EnrichedPhoto, GeoPoint)> {
        self.groups
            .iter()
            .flat_map(|g| g.photos.iter())
            .filter_map(|p| p.location.map(|loc| (p, loc)))
    }
}

/// Run the whole pipeline: keep the photos, index the sidecars, resolve
/// capture times and group by date with labels.
pub fn build_timeline(
    records: &[PhotoRecord],
    sidecar_files: &[SidecarFile],
    options: &TimelineOptions,
    ctx: &TimeContext,
) -> Timeline {
    let photos = filter_photos(records);
    let index = build_sidecar_index(sidecar_files);
    let labels = LabelContext::from_time(options.locale, ctx);

    let sidecars = (!index.is_empty()).then_some(&index);
    let groups = group_by_date_labeled(&photos, options.mode, sidecars, ctx, &labels);
    debug!(
        "Timeline: {} records, {} photos, {} sidecars, {} groups",
        records.len(),
        photos.len(),
        index.len(),
        groups.len()
    );

    Timeline {
        mode: options.mode,
        groups,
        total_records: records.len(),
        photo_count: photos.len(),
        sidecar_count: index.len(),
    }
}
