//! Pipeline – ties together composition, pagination and rendering into a
//! single call per job card.
//!
//! Bound and preview renders differ only in the [`RenderableRecord`] they
//! put into the [`RenderContext`]; both run the same composer, paginator
//! and renderer.

use crate::background::PageBackground;
use crate::binding::{RenderContext, RenderableRecord};
use crate::compose::compose;
use crate::error::RenderError;
use crate::layout_config::DocumentLayout;
use crate::pagination::paginate;
use crate::record::Jobcard;
use crate::render::render_pdf;
use crate::settings::BrandingSettings;
use crate::template::LayoutSnapshot;

/// Page and background settings for a render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Top margin where flowing content restarts after a page break.
    pub page_margin: f32,
    /// Distance from the page bottom that flowing content must not cross.
    pub bottom_margin: f32,
    /// Inset of the page border from every edge.
    pub border_inset: f32,
    /// Watermark width as a share of the page width.
    pub watermark_width_ratio: f32,
    pub watermark_opacity: f32,
    /// Vertical gap after each flowing block.
    pub section_spacing: f32,
    pub page_number_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            page_margin: 40.0,
            bottom_margin: 60.0,
            border_inset: 20.0,
            watermark_width_ratio: 0.6,
            watermark_opacity: 0.1,
            section_spacing: 12.0,
            page_number_font_size: 8.0,
        }
    }
}

impl RenderConfig {
    /// Authoring-space y that flowing content must stay above.
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.bottom_margin
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let dims = [
            self.page_width,
            self.page_height,
            self.page_margin,
            self.bottom_margin,
            self.border_inset,
        ];
        if dims.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RenderError::InvalidPageGeometry(
                "page dimensions and margins must be finite and non-negative".to_string(),
            ));
        }
        if self.page_width <= 2.0 * self.border_inset {
            return Err(RenderError::InvalidPageGeometry(format!(
                "page width {} leaves no room inside a {}pt border",
                self.page_width, self.border_inset
            )));
        }
        if self.content_bottom() <= self.page_margin {
            return Err(RenderError::InvalidPageGeometry(format!(
                "no flowing region between top margin {} and bottom margin {}",
                self.page_margin, self.bottom_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.watermark_opacity)
            || !(0.0..=1.0).contains(&self.watermark_width_ratio)
        {
            return Err(RenderError::InvalidPageGeometry(
                "watermark ratio and opacity must be within 0..=1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the caller intends to hand the PDF over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Download.
    #[default]
    Attachment,
    /// Display in the browser.
    Inline,
}

/// A finished job card PDF.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub layout: DocumentLayout,
    /// Suggested filename, `<jobcard number>.pdf`.
    pub filename: String,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    /// Value for a `Content-Disposition` header.
    pub fn content_disposition(&self, disposition: Disposition) -> String {
        let kind = match disposition {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        };
        format!("{kind}; filename=\"{}\"", self.filename)
    }
}

/// Compose and paginate without emitting PDF bytes.
pub fn compute_layout(ctx: &RenderContext, config: &RenderConfig) -> Result<DocumentLayout, RenderError> {
    config.validate()?;
    ctx.layout.validate()?;

    let mut doc = compose(ctx);
    let background = PageBackground::prepare(&ctx.branding, config, &mut doc.assets);
    let title = format!("Jobcard {}", ctx.record.jobcard_number());
    paginate(doc, &background, config, &title)
}

/// Full pipeline: render context → PDF bytes.
pub fn render(ctx: &RenderContext, config: &RenderConfig) -> Result<RenderedDocument, RenderError> {
    let layout = compute_layout(ctx, config)?;
    let bytes = render_pdf(&layout)?;
    log::info!(
        "Rendered {} ({:?}): {} page(s), {} bytes",
        ctx.record.jobcard_number(),
        ctx.record.mode(),
        layout.page_count(),
        bytes.len()
    );
    Ok(RenderedDocument {
        bytes,
        layout,
        filename: format!("{}.pdf", ctx.record.jobcard_number()),
    })
}

/// Render a real job card.
pub fn render_jobcard(
    card: Jobcard,
    branding: BrandingSettings,
    layout: LayoutSnapshot,
    config: &RenderConfig,
) -> Result<RenderedDocument, RenderError> {
    render(&RenderContext::bound(branding, card, layout), config)
}

/// Render the preview fixture against the given layout.
pub fn render_preview(
    branding: BrandingSettings,
    layout: LayoutSnapshot,
    config: &RenderConfig,
) -> Result<RenderedDocument, RenderError> {
    let ctx = RenderContext::new(branding, RenderableRecord::Dummy, layout);
    render(&ctx, config)
}
