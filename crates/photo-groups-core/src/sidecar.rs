use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::date::parse::parse_epoch_seconds;
use crate::date::Zone;
use crate::error::SidecarError;
use crate::record::{lenient, GeoPoint, PhotoRecord, TimestampValue};

/// Media extensions Google Takeout writes sidecars for.
const SIDECAR_MEDIA_EXTENSIONS: &str = "jpg|jpeg|png|gif|webp|heic|heif|mp4|mov";

/// Suffixes after the media name, in match order.
const SIDECAR_SUFFIXES: [&str; 3] = [".json", ".supplemental-metadata.json", ".suppl.json"];

static SIDECAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SIDECAR_SUFFIXES
        .iter()
        .map(|suffix| {
            Regex::new(&format!(
                r"(?i)^(.+\.(?:{SIDECAR_MEDIA_EXTENSIONS})){}$",
                regex::escape(suffix)
            ))
            .unwrap()
        })
        .collect()
});

/// A `{timestamp, formatted}` pair from a Takeout sidecar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarTime {
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<TimestampValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted: Option<String>,
}

/// Parsed content of a Google Photos JSON sidecar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub photo_taken_time: Option<SidecarTime>,
    #[serde(default, deserialize_with = "lenient")]
    pub creation_time: Option<SidecarTime>,
    #[serde(default, deserialize_with = "lenient")]
    pub geo_data: Option<GeoPoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub geo_data_exif: Option<GeoPoint>,
}

impl SidecarRecord {
    /// `photoTakenTime.timestamp` as epoch seconds.
    pub fn taken_at(&self, zone: &Zone) -> Option<DateTime<FixedOffset>> {
        let timestamp = self.photo_taken_time.as_ref()?.timestamp.as_ref()?;
        parse_epoch_seconds(timestamp, zone)
    }

    /// `creationTime.timestamp` as epoch seconds.
    pub fn created_at(&self, zone: &Zone) -> Option<DateTime<FixedOffset>> {
        let timestamp = self.creation_time.as_ref()?.timestamp.as_ref()?;
        parse_epoch_seconds(timestamp, zone)
    }

    /// Position of the photo, preferring the EXIF-derived block over the
    /// device-derived one.
    ///
    /// A zeroed block counts as missing, so a present but zeroed `geoDataExif`
    /// falls through to `geoData` instead of hiding it. Takeout writes zeroed
    /// EXIF blocks for photos whose position came from the device.
    pub fn location(&self) -> Option<GeoPoint> {
        [self.geo_data_exif, self.geo_data]
            .into_iter()
            .flatten()
            .find(GeoPoint::has_position)
    }
}

/// A raw sidecar file as listed by the caller: bare or path-qualified name plus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarFile {
    pub name: String,
    pub content: String,
}

impl SidecarFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Last path component; both separators are accepted.
fn base_name(name: &str) -> &str {
    name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name)
}

/// Check if a filename follows one of the sidecar naming conventions
pub fn is_sidecar(filename: &str) -> bool {
    let name = base_name(filename);
    SIDECAR_PATTERNS.iter().any(|re| re.is_match(name))
}

/// Image filename a sidecar belongs to, e.g. `IMG_1.jpg` for `IMG_1.jpg.suppl.json`.
pub fn image_name_from_sidecar(filename: &str) -> Option<&str> {
    let name = base_name(filename);
    SIDECAR_PATTERNS
        .iter()
        .find_map(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Candidate sidecar filenames for an image, in the order Takeout produces them.
pub fn sidecar_names_for(image_filename: &str) -> [String; 3] {
    SIDECAR_SUFFIXES.map(|suffix| format!("{image_filename}{suffix}"))
}

/// Parse sidecar JSON, keeping the error.
pub fn try_parse_sidecar(content: &str) -> Result<SidecarRecord, SidecarError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse sidecar JSON; malformed content means "no sidecar metadata".
pub fn parse_sidecar_content(content: &str) -> Option<SidecarRecord> {
    match try_parse_sidecar(content) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Ignoring sidecar: {}", e);
            None
        }
    }
}

/// Lookup key for an image name: bare filename, NFC, lower case.
fn index_key(image_name: &str) -> String {
    base_name(image_name).nfc().collect::<String>().to_lowercase()
}

/// Image name -> parsed sidecar.
///
/// Keys are bare filenames, so same-named images in different folders share
/// one entry; the sidecar listed last wins.
#[derive(Debug, Clone, Default)]
pub struct SidecarIndex {
    entries: HashMap<String, SidecarRecord>,
}

impl SidecarIndex {
    pub fn get(&self, image_name: &str) -> Option<&SidecarRecord> {
        self.entries.get(&index_key(image_name))
    }

    pub fn get_for(&self, photo: &PhotoRecord) -> Option<&SidecarRecord> {
        self.get(&photo.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SidecarRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, image_name: &str, record: SidecarRecord) -> Option<SidecarRecord> {
        self.entries.insert(index_key(image_name), record)
    }
}

/// Build the image -> sidecar index from raw sidecar files.
///
/// Files that do not follow a sidecar naming convention are skipped, as are
/// files whose JSON does not parse.
pub fn build_sidecar_index(files: &[SidecarFile]) -> SidecarIndex {
    let mut index = SidecarIndex::default();

    for file in files {
        let Some(image_name) = image_name_from_sidecar(&file.name) else {
            continue;
        };
        let record = match try_parse_sidecar(&file.content) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring sidecar {}: {}", file.name, e);
                continue;
            }
        };
        if index.insert(image_name, record).is_some() {
            warn!(
                "Sidecar {} replaces an earlier sidecar for {}; same-named images share one entry",
                file.name, image_name
            );
        }
    }

    debug!("Sidecar index: {} of {} files matched", index.len(), files.len());
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAKEOUT_JSON: &str = r#"{
        "title": "IMG_0001.jpg",
        "description": "",
        "photoTakenTime": { "timestamp": "1609459200", "formatted": "Jan 1, 2021, 12:00:00 AM UTC" },
        "creationTime": { "timestamp": "1609545600", "formatted": "Jan 2, 2021, 12:00:00 AM UTC" },
        "geoData": { "latitude": 48.1, "longitude": 11.5, "altitude": 520.0, "latitudeSpan": 0.0 },
        "geoDataExif": { "latitude": 0.0, "longitude": 0.0, "altitude": 0.0 }
    }"#;

    #[test]
    fn test_sidecar_patterns() {
        assert!(is_sidecar("IMG_0001.jpg.json"));
        assert!(is_sidecar("IMG_0001.JPG.json"));
        assert!(is_sidecar("IMG_0001.jpg.supplemental-metadata.json"));
        assert!(is_sidecar("IMG_0001.heic.suppl.json"));
        assert!(is_sidecar("VID_0001.mp4.json"));
        assert!(is_sidecar("Takeout/Photos from 2021/IMG_0001.jpg.json"));
        assert!(!is_sidecar("IMG_0001.json"));
        assert!(!is_sidecar("IMG_0001.jpg"));
        assert!(!is_sidecar("metadata.json"));
        assert!(!is_sidecar("IMG_0001.jpg.json.bak"));
    }

    #[test]
    fn test_image_name_from_sidecar() {
        assert_eq!(image_name_from_sidecar("IMG_0001.jpg.json"), Some("IMG_0001.jpg"));
        assert_eq!(
            image_name_from_sidecar("IMG_0001.jpg.supplemental-metadata.json"),
            Some("IMG_0001.jpg")
        );
        assert_eq!(image_name_from_sidecar("IMG_0001.PNG.suppl.json"), Some("IMG_0001.PNG"));
        assert_eq!(image_name_from_sidecar("dir/sub/a.b.jpeg.json"), Some("a.b.jpeg"));
        assert_eq!(image_name_from_sidecar("IMG_0001.json"), None);
    }

    #[test]
    fn test_sidecar_names_for() {
        assert_eq!(
            sidecar_names_for("a.jpg"),
            [
                "a.jpg.json".to_string(),
                "a.jpg.supplemental-metadata.json".to_string(),
                "a.jpg.suppl.json".to_string()
            ]
        );
        for name in sidecar_names_for("a.jpg") {
            assert_eq!(image_name_from_sidecar(&name), Some("a.jpg"));
        }
    }

    #[test]
    fn test_parse_takeout_json() {
        let record = parse_sidecar_content(TAKEOUT_JSON).unwrap();
        let utc = Zone::utc();
        assert_eq!(record.title.as_deref(), Some("IMG_0001.jpg"));
        assert_eq!(record.taken_at(&utc).unwrap().timestamp(), 1_609_459_200);
        assert_eq!(record.created_at(&utc).unwrap().timestamp(), 1_609_545_600);
        // geoDataExif is zeroed, so the device block is used.
        let location = record.location().unwrap();
        assert_eq!(location.latitude, 48.1);
        assert_eq!(location.altitude, Some(520.0));
    }

    #[test]
    fn test_location_prefers_exif_block() {
        let record = parse_sidecar_content(
            r#"{"geoData": {"latitude": 1.5, "longitude": 2.5}, "geoDataExif": {"latitude": 3.5, "longitude": 4.5}}"#,
        )
        .unwrap();
        assert_eq!(record.location(), Some(GeoPoint::new(3.5, 4.5)));
        assert_eq!(parse_sidecar_content("{}").unwrap().location(), None);
    }

    #[test]
    fn test_malformed_json_is_none() {
        assert!(parse_sidecar_content("{not json").is_none());
        assert!(parse_sidecar_content("").is_none());
        assert!(try_parse_sidecar("[1,").is_err());
        // Wrong member shapes are tolerated.
        let odd = parse_sidecar_content(r#"{"photoTakenTime": "yesterday", "geoData": 5}"#).unwrap();
        assert_eq!(odd.photo_taken_time, None);
        assert_eq!(odd.geo_data, None);
    }

    #[test]
    fn test_build_sidecar_index() {
        let files = vec![
            SidecarFile::new("IMG_0001.JPG.json", TAKEOUT_JSON),
            SidecarFile::new("IMG_0002.jpg.supplemental-metadata.json", "{}"),
            SidecarFile::new("broken.jpg.json", "{oops"),
            SidecarFile::new("notes.json", "{}"),
        ];
        let index = build_sidecar_index(&files);
        assert_eq!(index.len(), 2);
        assert!(index.get("img_0001.jpg").is_some());
        assert!(index.get("IMG_0001.jpg").is_some());
        assert!(index.get_for(&PhotoRecord::new("x", "IMG_0002.JPG")).is_some());
        assert!(index.get("broken.jpg").is_none());
    }

    #[test]
    fn test_index_collision_keeps_last() {
        let files = vec![
            SidecarFile::new("2020/a.jpg.json", r#"{"title": "first"}"#),
            SidecarFile::new("2021/a.jpg.json", r#"{"title": "second"}"#),
        ];
        let index = build_sidecar_index(&files);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a.jpg").unwrap().title.as_deref(), Some("second"));
    }

    #[test]
    fn test_index_key_normalizes_unicode() {
        // "é" decomposed (e + combining acute) must find the composed key.
        let files = vec![SidecarFile::new("caf\u{e9}.jpg.json", "{}")];
        let index = build_sidecar_index(&files);
        assert!(index.get("cafe\u{301}.jpg").is_some());
        assert!(index.get("CAF\u{c9}.JPG").is_some());
    }

    #[test]
    fn test_empty_index() {
        let index = build_sidecar_index(&[]);
        assert!(index.is_empty());
        assert!(index.get("a.jpg").is_none());
    }
}
