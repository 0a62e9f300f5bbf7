//! Image assets – logo, watermark and signature images.
//!
//! Every asset is a scoped acquisition: read, decode, keep the bytes for
//! embedding, drop the decoded pixels. Failures are reported as
//! [`AssetError`] and turned into an omission or placeholder by the caller
//! via [`acquire`]; they never abort a render.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Where an image comes from. Serialised as a single string: a
/// `data:<mime>;base64,<data>` URI, or otherwise a file path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSource {
    Path(PathBuf),
    DataUri(String),
    Bytes(Vec<u8>),
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        if s.starts_with("data:") {
            ImageSource::DataUri(s)
        } else {
            ImageSource::Path(PathBuf::from(s))
        }
    }
}

impl From<ImageSource> for String {
    fn from(src: ImageSource) -> Self {
        match src {
            ImageSource::Path(p) => p.to_string_lossy().into_owned(),
            ImageSource::DataUri(uri) => uri,
            ImageSource::Bytes(bytes) => format!(
                "data:application/octet-stream;base64,{}",
                BASE64_STD.encode(bytes)
            ),
        }
    }
}

impl ImageSource {
    pub fn read_bytes(&self) -> Result<Vec<u8>, AssetError> {
        match self {
            ImageSource::Path(p) => Ok(fs::read(p)?),
            ImageSource::DataUri(uri) => parse_data_uri(uri),
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
pub fn parse_data_uri(src: &str) -> Result<Vec<u8>, AssetError> {
    let preview = |s: &str| s.chars().take(40).collect::<String>();
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::NotDataUri(preview(src)))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::NotDataUri(preview(src)))?;
    if !header.contains(";base64") {
        return Err(AssetError::NotDataUri(preview(src)));
    }
    Ok(BASE64_STD.decode(data.trim())?)
}

/// A decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub id: String,
    pub px_width: u32,
    pub px_height: u32,
    bytes: Arc<[u8]>,
}

impl ImageAsset {
    pub fn load(id: &str, source: &ImageSource) -> Result<Self, AssetError> {
        let bytes = source.read_bytes()?;
        let decoded = ::image::load_from_memory(&bytes)?;
        Ok(Self {
            id: id.to_string(),
            px_width: decoded.width().max(1),
            px_height: decoded.height().max(1),
            bytes: bytes.into(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Height / width.
    pub fn aspect(&self) -> f32 {
        self.px_height as f32 / self.px_width as f32
    }

    /// Largest size with this aspect ratio that fits inside `max_w × max_h`.
    pub fn fit_within(&self, max_w: f32, max_h: f32) -> (f32, f32) {
        let w = max_w.min(max_h / self.aspect());
        (w, w * self.aspect())
    }
}

/// Load an optional asset, swallowing failures with a warning.
pub fn acquire(id: &str, source: Option<&ImageSource>) -> Option<ImageAsset> {
    let source = source?;
    match ImageAsset::load(id, source) {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("Skipping image '{id}': {e}");
            None
        }
    }
}

/// Images referenced by a laid-out document, keyed by asset id.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    assets: BTreeMap<String, ImageAsset>,
}

impl AssetTable {
    pub fn insert(&mut self, asset: ImageAsset) {
        self.assets.insert(asset.id.clone(), asset);
    }

    pub fn get(&self, id: &str) -> Option<&ImageAsset> {
        self.assets.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
