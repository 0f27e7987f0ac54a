use tracing::debug;

use crate::record::{PhotoRecord, Tags};

/// Photo formats accepted when a record carries no MIME type.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "tiff", "tif",
];

/// Name fragments that mark metadata files, whatever their extension or MIME type.
const METADATA_MARKERS: &[&str] = &[".json", ".xml", ".txt"];

/// MIME fragments of image types that are not photographs.
const NON_PHOTO_MIME: &[&str] = &["svg", "icon"];

/// Tag the EXIF importer leaves on records it has processed.
const EXIF_IMPORTED_TAG: &str = "exifimported";

/// Check if a resource record is a photo.
///
/// Folders and names containing `.json`, `.xml` or `.txt` are rejected first.
/// A non-empty MIME type decides on its own (`image/*` but not SVG or
/// icons); otherwise the extension must be in [`IMAGE_EXTENSIONS`].
pub fn is_image(record: &PhotoRecord) -> bool {
    if record.is_folder() {
        return false;
    }

    let name = record.name.to_lowercase();
    if METADATA_MARKERS.iter().any(|marker| name.contains(marker)) {
        return false;
    }

    if let Some(mime) = record.mime_type.as_deref().filter(|m| !m.trim().is_empty()) {
        let mime = mime.to_lowercase();
        return mime.starts_with("image/") && !NON_PHOTO_MIME.iter().any(|m| mime.contains(m));
    }

    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext))
}

/// Keep only the photos of a resource listing, in listing order.
pub fn filter_photos(records: &[PhotoRecord]) -> Vec<PhotoRecord> {
    let photos: Vec<PhotoRecord> = records.iter().filter(|r| is_image(r)).cloned().collect();
    debug!("filter_photos: {} files -> {} photos", records.len(), photos.len());
    photos
}

/// Whether the EXIF importer has already tagged this record.
pub fn has_exif_tag(record: &PhotoRecord) -> bool {
    match &record.tags {
        Some(Tags::List(tags)) => tags.iter().any(|t| t.contains(EXIF_IMPORTED_TAG)),
        Some(Tags::Text(tags)) => tags.contains(EXIF_IMPORTED_TAG),
        None => false,
    }
}
