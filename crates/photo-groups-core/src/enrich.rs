use rayon::prelude::*;
use serde::Serialize;

use crate::date::{resolve_capture_time, ResolvedCaptureTime, TimeContext};
use crate::geo::photo_location;
use crate::record::{GeoPoint, PhotoRecord};
use crate::sidecar::SidecarIndex;

/// A photo together with the values derived for it in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPhoto {
    pub record: PhotoRecord,
    pub captured: ResolvedCaptureTime,
    pub location: Option<GeoPoint>,
    /// A sidecar file was matched to this photo.
    pub has_sidecar: bool,
}

pub fn enrich_photo(
    photo: &PhotoRecord,
    sidecars: Option<&SidecarIndex>,
    ctx: &TimeContext,
) -> EnrichedPhoto {
    let sidecar = sidecars.and_then(|index| index.get_for(photo));
    EnrichedPhoto {
        record: photo.clone(),
        captured: resolve_capture_time(photo, sidecar, ctx),
        location: photo_location(photo, sidecar),
        has_sidecar: sidecar.is_some(),
    }
}

/// Enrich every photo, resolving in parallel. Output order matches input order.
pub fn enrich_photos(
    photos: &[PhotoRecord],
    sidecars: Option<&SidecarIndex>,
    ctx: &TimeContext,
) -> Vec<EnrichedPhoto> {
    photos
        .par_iter()
        .map(|photo| enrich_photo(photo, sidecars, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateSource;
    use crate::sidecar::{build_sidecar_index, SidecarFile};
    use chrono::{Offset, TimeZone, Utc};

    #[test]
    fn test_enrich_keeps_order_and_matches_sidecars() {
        let ctx = TimeContext::new(Utc.fix(), Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        let index = build_sidecar_index(&[SidecarFile::new(
            "p7.jpg.supplemental-metadata.json",
            r#"{"photoTakenTime": {"timestamp": "1609459200"}, "geoData": {"latitude": 48.1, "longitude": 11.5}}"#,
        )]);
        let photos: Vec<PhotoRecord> = (0..50)
            .map(|i| PhotoRecord::new(format!("{i}"), format!("p{i}.jpg")))
            .collect();

        let enriched = enrich_photos(&photos, Some(&index), &ctx);
        assert_eq!(enriched.len(), 50);
        for (i, e) in enriched.iter().enumerate() {
            assert_eq!(e.record.id, i.to_string());
            assert_eq!(e.has_sidecar, i == 7);
        }
        assert_eq!(enriched[7].captured.source, DateSource::SidecarTaken);
        assert_eq!(enriched[7].location, Some(GeoPoint::new(48.1, 11.5)));
        assert_eq!(enriched[0].captured.source, DateSource::Now);
        assert_eq!(enriched[0].location, None);
    }
}
