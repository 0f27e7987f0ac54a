use std::fs;
use std::path::Path;

use anyhow::Context;
use filetime::FileTime;
use photo_groups_core::{is_sidecar, DateValue, PhotoRecord, SidecarFile};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Photo candidates and sidecar files found on disk.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub records: Vec<PhotoRecord>,
    pub sidecars: Vec<SidecarFile>,
}

/// Walk `root` recursively. Sidecars are read into memory; every other file
/// becomes a record with a guessed MIME type and its modification time.
///
/// A sidecar that cannot be read is skipped with a warning. Invalid UTF-8 is
/// replaced, so the JSON can still parse.
pub fn scan_dir(root: &Path) -> anyhow::Result<ScanResult> {
    let mut result = ScanResult::default();

    let mut entries: Vec<walkdir::DirEntry> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => entries.push(entry),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    // Stable listing order, independent of the filesystem.
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let filename = entry.file_name().to_string_lossy().into_owned();

        if is_sidecar(&filename) {
            match fs::read(path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes).into_owned();
                    result.sidecars.push(SidecarFile::new(relative, content));
                }
                Err(e) => warn!("Skipping sidecar {}: {}", path.display(), e),
            }
            continue;
        }

        let mut record = PhotoRecord::new(relative, filename);
        record.mime_type = mime_guess::from_path(path).first().map(|m| m.essence_str().to_string());
        match entry.metadata() {
            Ok(meta) => {
                let mtime = FileTime::from_last_modification_time(&meta);
                let millis = mtime.unix_seconds() * 1000 + i64::from(mtime.nanoseconds() / 1_000_000);
                record.mdate = Some(DateValue::from(millis));
            }
            Err(e) => warn!("No metadata for {}: {}", path.display(), e),
        }
        result.records.push(record);
    }

    debug!(
        "Scanned {}: {} files, {} sidecars",
        root.display(),
        result.records.len(),
        result.sidecars.len()
    );
    Ok(result)
}

/// Read a JSON array of photo records. Sidecars are looked up next to the manifest.
pub fn read_manifest(path: &Path) -> anyhow::Result<ScanResult> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<PhotoRecord> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let sidecars = scan_dir(dir)?.sidecars;

    Ok(ScanResult { records, sidecars })
}
