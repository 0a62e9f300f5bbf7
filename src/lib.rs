//! # jobcard-forge – job card composition and pagination
//!
//! Turns a job card record (or the preview fixture), the company branding
//! and a stored template layout into a paginated PDF. The pipeline stages are:
//!
//! 1. **Bind** – wrap a real record or the preview fixture ([`binding`])
//! 2. **Compose** – build fixed header blocks and flowing body blocks ([`compose`])
//! 3. **Paginate** – measure, split the items table, move sections whole ([`pagination`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! Template geometry lives in [`template`], branding in [`settings`].

pub mod assets;
pub mod background;
pub mod binding;
pub mod compose;
pub mod coords;
pub mod error;
pub mod fonts;
pub mod layout_config;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod settings;
pub mod template;

// Re-exports for convenience
pub use binding::{RenderContext, RenderMode, RenderableRecord};
pub use error::{AssetError, RenderError, StoreError};
pub use pipeline::{render_jobcard, render_preview, Disposition, RenderConfig, RenderedDocument};
pub use record::{JobStatus, Jobcard};
pub use settings::{BrandingSettings, SettingsRepository};
pub use template::{ElementName, LayoutSnapshot, TemplateLayoutStore};
