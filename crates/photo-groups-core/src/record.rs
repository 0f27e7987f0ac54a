use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A date-like value as upstream extractors hand it over.
///
/// Variants are tried in order when deserializing, so a JSON number is always
/// `Number`, a string is `Text`, an object with a `timestamp` member is
/// `Timestamp`, and everything else lands in `Other` (which never parses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Number(f64),
    Text(String),
    Timestamp { timestamp: TimestampValue },
    Other(serde_json::Value),
}

/// Payload of a `{ "timestamp": ... }` object: epoch seconds, usually a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    Text(String),
    Number(f64),
}

impl From<&str> for DateValue {
    fn from(s: &str) -> Self {
        DateValue::Text(s.to_string())
    }
}

impl From<f64> for DateValue {
    fn from(n: f64) -> Self {
        DateValue::Number(n)
    }
}

impl From<i64> for DateValue {
    fn from(n: i64) -> Self {
        DateValue::Number(n as f64)
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    /// Google writes 0.0 for both axes when a photo carries no position, so a
    /// zero on either axis means "unknown".
    pub fn has_position(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// Partial coordinates as reported by the server's photo facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl GeoCoordinates {
    pub fn to_point(&self) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: self.latitude?,
            longitude: self.longitude?,
            altitude: self.altitude,
        })
    }
}

/// Structured photo metadata indexed by the server (`photo.*`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFacet {
    #[serde(default)]
    pub taken_date_time: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<GeoCoordinates>,
}

/// `tags` is either a list or a comma separated string depending on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMetadata {
    #[serde(default)]
    pub exif_date_time_original: Option<DateValue>,
    #[serde(default)]
    pub date_taken: Option<DateValue>,
    #[serde(default)]
    pub photo_taken_time: Option<DateValue>,
    #[serde(default)]
    pub date_time_original: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalData {
    #[serde(default)]
    pub exif_date: Option<DateValue>,
    #[serde(default)]
    pub date_taken: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifFields {
    #[serde(default, rename = "DateTimeOriginal")]
    pub date_time_original: Option<DateValue>,
    #[serde(default, rename = "DateTime")]
    pub date_time: Option<DateValue>,
}

/// Historical property names and locations that older extractors used for the
/// capture time. All optional; a record usually carries none of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDates {
    #[serde(default)]
    pub exif_date_time_original: Option<DateValue>,
    #[serde(default)]
    pub exif_date: Option<DateValue>,
    #[serde(default)]
    pub date_taken: Option<DateValue>,
    #[serde(default)]
    pub photo_taken_time: Option<DateValue>,
    #[serde(default)]
    pub date_time_original: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<LegacyMetadata>,
    #[serde(default, rename = "oc:exif-date")]
    pub oc_exif_date: Option<DateValue>,
    #[serde(default, rename = "oc:date-taken")]
    pub oc_date_taken: Option<DateValue>,
    #[serde(default, rename = "oc:photo-taken-time")]
    pub oc_photo_taken_time: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub additional_data: Option<AdditionalData>,
    #[serde(default, deserialize_with = "lenient")]
    pub exif: Option<ExifFields>,
}

/// One file the resource listing believes may be an image.
///
/// Records are read-only inputs: resolution and grouping derive new values
/// next to them and never write back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_folder: Option<bool>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub photo: Option<PhotoFacet>,
    /// Filesystem modification time (epoch milliseconds or a date string).
    #[serde(default)]
    pub mdate: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Tags>,
    #[serde(flatten)]
    pub legacy: LegacyDates,
}

impl PhotoRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn with_taken(mut self, value: impl Into<DateValue>) -> Self {
        self.photo.get_or_insert_with(PhotoFacet::default).taken_date_time = Some(value.into());
        self
    }

    pub fn with_mdate(mut self, value: impl Into<DateValue>) -> Self {
        self.mdate = Some(value.into());
        self
    }

    pub fn with_location(mut self, point: GeoPoint) -> Self {
        self.photo.get_or_insert_with(PhotoFacet::default).location = Some(GeoCoordinates {
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
            altitude: point.altitude,
        });
        self
    }

    /// Primary capture time (`photo.takenDateTime`).
    pub fn taken_date_time(&self) -> Option<&DateValue> {
        self.photo.as_ref()?.taken_date_time.as_ref()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.photo.as_ref()?.location.as_ref()?.to_point()
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder.unwrap_or(false) || self.kind.as_deref() == Some("folder")
    }
}

/// Deserialize an optional field, treating a value of the wrong shape as absent
/// instead of failing the whole record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
