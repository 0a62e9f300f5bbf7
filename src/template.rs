//! Template layout store – persisted mapping of named page regions to
//! geometry, as edited by the visual layout designer.
//!
//! Geometry is expressed in authoring space (origin top-left, y down, in
//! points). The store accepts arbitrary names so that newer designers can
//! save regions this renderer does not know about; only the fixed
//! [`ElementName`] set is ever read back for rendering.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, StoreError};

/// Font size given to stored names that have none yet.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// The closed set of regions the renderer places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementName {
    HeaderLogo,
    CompanyInfo,
    JobcardMeta,
    ClientDetails,
    StartStopTimes,
    ItemsTable,
    ManagerNotes,
    AdminNotes,
    Signatures,
}

impl ElementName {
    pub const ALL: [ElementName; 9] = [
        ElementName::HeaderLogo,
        ElementName::CompanyInfo,
        ElementName::JobcardMeta,
        ElementName::ClientDetails,
        ElementName::StartStopTimes,
        ElementName::ItemsTable,
        ElementName::ManagerNotes,
        ElementName::AdminNotes,
        ElementName::Signatures,
    ];

    /// Regions placed once on page 1 and never paginated.
    pub const FIXED: [ElementName; 5] = [
        ElementName::HeaderLogo,
        ElementName::CompanyInfo,
        ElementName::JobcardMeta,
        ElementName::ClientDetails,
        ElementName::StartStopTimes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementName::HeaderLogo => "header_logo",
            ElementName::CompanyInfo => "company_info",
            ElementName::JobcardMeta => "jobcard_meta",
            ElementName::ClientDetails => "client_details",
            ElementName::StartStopTimes => "start_stop_times",
            ElementName::ItemsTable => "items_table",
            ElementName::ManagerNotes => "manager_notes",
            ElementName::AdminNotes => "admin_notes",
            ElementName::Signatures => "signatures",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.as_str() == name)
    }

    /// Documented default geometry on an A4 portrait page.
    ///
    /// | element            |   x |   y |   w |   h | font |
    /// |--------------------|-----|-----|-----|-----|------|
    /// | header_logo        |  40 |  40 | 120 |  60 |   10 |
    /// | company_info       | 180 |  40 | 375 |  60 |   12 |
    /// | jobcard_meta       |  40 | 115 | 250 |  70 |   10 |
    /// | client_details     | 305 | 115 | 250 |  70 |   10 |
    /// | start_stop_times   |  40 | 195 | 515 |  30 |   10 |
    /// | items_table        |  40 | 240 | 515 | 300 |    9 |
    /// | manager_notes      |  40 | 560 | 515 |  60 |   10 |
    /// | admin_notes        |  40 | 640 | 515 |  60 |   10 |
    /// | signatures         |  40 | 720 | 515 |  50 |   10 |
    pub fn default_geometry(self) -> ElementGeometry {
        let (x, y, width, height, font_size) = match self {
            ElementName::HeaderLogo => (40.0, 40.0, 120.0, 60.0, 10.0),
            ElementName::CompanyInfo => (180.0, 40.0, 375.0, 60.0, 12.0),
            ElementName::JobcardMeta => (40.0, 115.0, 250.0, 70.0, 10.0),
            ElementName::ClientDetails => (305.0, 115.0, 250.0, 70.0, 10.0),
            ElementName::StartStopTimes => (40.0, 195.0, 515.0, 30.0, 10.0),
            ElementName::ItemsTable => (40.0, 240.0, 515.0, 300.0, 9.0),
            ElementName::ManagerNotes => (40.0, 560.0, 515.0, 60.0, 10.0),
            ElementName::AdminNotes => (40.0, 640.0, 515.0, 60.0, 10.0),
            ElementName::Signatures => (40.0, 720.0, 515.0, 50.0, 10.0),
        };
        ElementGeometry {
            x,
            y,
            width,
            height,
            font_size,
        }
    }
}

/// Position and size of one region, in authoring space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

impl ElementGeometry {
    /// Authoring-space y of the bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn validate(&self, name: ElementName) -> Result<(), RenderError> {
        let fields = [self.x, self.y, self.width, self.height, self.font_size];
        let reason = if fields.iter().any(|v| !v.is_finite()) {
            Some("non-finite coordinate")
        } else if self.width <= 0.0 || self.height <= 0.0 {
            Some("width and height must be positive")
        } else if self.font_size <= 0.0 {
            Some("font size must be positive")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(RenderError::InvalidElementGeometry {
                name: name.as_str().to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// One entry submitted by the layout designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEdit {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Persisted element geometry, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct TemplateLayoutStore {
    elements: BTreeMap<String, ElementGeometry>,
    path: Option<PathBuf>,
}

impl TemplateLayoutStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store. A missing file yields an empty store; the
    /// file is created on the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let elements = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            elements,
            path: Some(path),
        })
    }

    /// Seed every fixed element that has no stored geometry yet. Existing
    /// entries, including unknown names, are left alone. Returns `true` when
    /// anything was seeded.
    pub fn ensure_defaults(&mut self) -> Result<bool, StoreError> {
        let mut seeded = 0usize;
        for name in ElementName::ALL {
            if !self.elements.contains_key(name.as_str()) {
                self.elements
                    .insert(name.as_str().to_string(), name.default_geometry());
                seeded += 1;
            }
        }
        if seeded == 0 {
            return Ok(false);
        }
        log::info!("Seeded {seeded} default template elements");
        self.persist()?;
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<ElementGeometry> {
        self.elements.get(name).copied()
    }

    /// Create or update geometry for `name`. An existing font size is kept;
    /// new entries take the element's default font size.
    pub fn upsert(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), StoreError> {
        self.put(name, x, y, width, height);
        self.persist()
    }

    /// Apply a batch from the layout designer and persist once.
    pub fn apply_edits(&mut self, edits: &[ElementEdit]) -> Result<usize, StoreError> {
        for edit in edits {
            if ElementName::parse(&edit.name).is_none() {
                log::debug!("Storing unknown template element '{}'", edit.name);
            }
            self.put(&edit.name, edit.x, edit.y, edit.width, edit.height);
        }
        self.persist()?;
        Ok(edits.len())
    }

    pub fn set_font_size(&mut self, name: &str, font_size: f32) -> Result<bool, StoreError> {
        match self.elements.get_mut(name) {
            Some(geometry) => {
                geometry.font_size = font_size;
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Consistent copy of the render-consumed set, with missing names
    /// filled from the defaults.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let elements = ElementName::ALL
            .iter()
            .map(|&name| {
                let geometry = self
                    .get(name.as_str())
                    .unwrap_or_else(|| name.default_geometry());
                (name, geometry)
            })
            .collect();
        LayoutSnapshot { elements }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.elements)?)
    }

    fn put(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        let font_size = self
            .elements
            .get(name)
            .map(|g| g.font_size)
            .or_else(|| ElementName::parse(name).map(|n| n.default_geometry().font_size))
            .unwrap_or(DEFAULT_FONT_SIZE);
        self.elements.insert(
            name.to_string(),
            ElementGeometry {
                x,
                y,
                width,
                height,
                font_size,
            },
        );
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, self.to_json()?)?;
        }
        Ok(())
    }
}

/// Read-only geometry for every [`ElementName`], taken once per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    elements: HashMap<ElementName, ElementGeometry>,
}

impl LayoutSnapshot {
    pub fn defaults() -> Self {
        TemplateLayoutStore::in_memory().snapshot()
    }

    pub fn get(&self, name: ElementName) -> ElementGeometry {
        self.elements
            .get(&name)
            .copied()
            .unwrap_or_else(|| name.default_geometry())
    }

    /// Override one element; used by callers that build snapshots directly.
    pub fn with(mut self, name: ElementName, geometry: ElementGeometry) -> Self {
        self.elements.insert(name, geometry);
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        for name in ElementName::ALL {
            self.get(name).validate(name)?;
        }
        Ok(())
    }
}
