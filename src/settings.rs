//! Branding settings – the company identity printed on every job card.
//!
//! There is exactly one settings instance. The repository enforces that on
//! creation; renders receive an owned snapshot and never touch the
//! repository again.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::ImageSource;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingSettings {
    pub company_name: String,
    #[serde(default)]
    pub company_address: String,
    #[serde(default)]
    pub company_contact: String,
    #[serde(default)]
    pub logo: Option<ImageSource>,
    #[serde(default)]
    pub watermark: Option<ImageSource>,
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self {
            company_name: "My Company".to_string(),
            company_address: String::new(),
            company_contact: String::new(),
            logo: None,
            watermark: None,
        }
    }
}

impl BrandingSettings {
    /// Explicit watermark, else the logo.
    pub fn watermark_source(&self) -> Option<&ImageSource> {
        self.watermark.as_ref().or(self.logo.as_ref())
    }
}

/// Holds the single settings instance, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct SettingsRepository {
    current: Option<BrandingSettings>,
    path: Option<PathBuf>,
}

impl SettingsRepository {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let current = if path.exists() {
            let json = fs::read_to_string(&path)?;
            Some(serde_json::from_str(&json)?)
        } else {
            None
        };
        Ok(Self {
            current,
            path: Some(path),
        })
    }

    /// Create the settings instance. Fails if one already exists.
    pub fn create(&mut self, settings: BrandingSettings) -> Result<(), StoreError> {
        if self.current.is_some() {
            return Err(StoreError::SettingsAlreadyExist);
        }
        self.current = Some(settings);
        self.persist()
    }

    pub fn update(&mut self, settings: BrandingSettings) -> Result<(), StoreError> {
        if self.current.is_none() {
            return Err(StoreError::SettingsMissing);
        }
        self.current = Some(settings);
        self.persist()
    }

    /// Owned copy for one render; defaults when nothing has been created.
    pub fn snapshot(&self) -> BrandingSettings {
        self.current.clone().unwrap_or_default()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let (Some(path), Some(settings)) = (&self.path, &self.current) {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, serde_json::to_string_pretty(settings)?)?;
        }
        Ok(())
    }
}
