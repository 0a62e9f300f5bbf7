//! Error types shared across the render pipeline and the stores.

use thiserror::Error;

/// Failure while laying out or emitting a document. No bytes are ever
/// returned alongside one of these.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid page geometry: {0}")]
    InvalidPageGeometry(String),
    #[error("invalid geometry for template element '{name}': {reason}")]
    InvalidElementGeometry { name: String, reason: String },
    #[error("document has no pages")]
    EmptyDocument,
    #[error("PDF emission failed: {0}")]
    Emit(String),
}

/// Failure while reading or writing persisted configuration.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("branding settings already exist; update the existing instance instead")]
    SettingsAlreadyExist,
    #[error("no branding settings have been created")]
    SettingsMissing,
}

/// A missing or corrupt image. Recovered locally by the composer, never
/// propagated out of a render call.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("image source is not a base64 data URI: {0}")]
    NotDataUri(String),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),
}
