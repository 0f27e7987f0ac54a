use thiserror::Error;

/// Sidecar content that could not be turned into a [`crate::sidecar::SidecarRecord`].
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("malformed sidecar JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown group mode `{0}` (expected day, week, month or year)")]
pub struct ParseGroupModeError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale `{0}` (expected en, de, fr or es)")]
pub struct ParseLocaleError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time zone `{0}` (expected local, UTC, an offset like +02:00 or an IANA name)")]
pub struct ParseZoneError(pub String);
