//! Page background – border, watermark and running page number, drawn
//! identically on every page.
//!
//! The background never sees the content cursor: it only knows the page
//! geometry and which page it is drawing for.

use crate::assets::{acquire, AssetTable, ImageAsset};
use crate::fonts::FontMetrics;
use crate::layout_config::{BoxTag, LayoutBox, TextContent, TextLine};
use crate::pipeline::RenderConfig;
use crate::settings::BrandingSettings;

pub const WATERMARK_ASSET_ID: &str = "watermark";

const BORDER_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
const PAGE_NUMBER_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

/// Background resolved once per render and replayed on every page.
#[derive(Debug, Clone)]
pub struct PageBackground {
    page_width: f32,
    page_height: f32,
    border_inset: f32,
    page_number_size: f32,
    /// `(x, y, width, height)` of the centred watermark.
    watermark: Option<(f32, f32, f32, f32)>,
    watermark_opacity: f32,
    metrics: FontMetrics,
}

impl PageBackground {
    /// Resolve the watermark (explicit asset, else the logo) and register it
    /// in `assets`. A missing or undecodable image just leaves it out.
    pub fn prepare(
        branding: &BrandingSettings,
        config: &RenderConfig,
        assets: &mut AssetTable,
    ) -> Self {
        let watermark = acquire(WATERMARK_ASSET_ID, branding.watermark_source()).map(
            |asset: ImageAsset| {
                let width = config.page_width * config.watermark_width_ratio;
                let height = width * asset.aspect();
                let x = (config.page_width - width) / 2.0;
                let y = (config.page_height - height) / 2.0;
                assets.insert(asset);
                (x, y, width, height)
            },
        );
        Self {
            page_width: config.page_width,
            page_height: config.page_height,
            border_inset: config.border_inset,
            page_number_size: config.page_number_font_size,
            watermark,
            watermark_opacity: config.watermark_opacity,
            metrics: FontMetrics::default(),
        }
    }

    pub fn has_watermark(&self) -> bool {
        self.watermark.is_some()
    }

    /// Boxes drawn underneath the content of every page.
    pub fn underlay(&self) -> Vec<LayoutBox> {
        let inset = self.border_inset;
        let mut boxes = vec![LayoutBox::new(
            BoxTag::PageBorder,
            inset,
            inset,
            self.page_width - 2.0 * inset,
            self.page_height - 2.0 * inset,
        )
        .with_border(1.0, BORDER_COLOR)];

        if let Some((x, y, w, h)) = self.watermark {
            boxes.push(
                LayoutBox::new(BoxTag::Watermark, x, y, w, h).with_image(
                    WATERMARK_ASSET_ID,
                    w,
                    h,
                    self.watermark_opacity,
                ),
            );
        }
        boxes
    }

    /// Right-aligned page number anchored just inside the bottom border.
    pub fn page_number(&self, page_index: usize, page_count: usize) -> LayoutBox {
        let text = format!("Page {} of {}", page_index + 1, page_count);
        let size = self.page_number_size;
        let width = self.metrics.measure_text_width(&text, size, false);
        let line_h = self.metrics.line_height(size);
        let right = self.page_width - self.border_inset - 10.0;
        let y = self.page_height - self.border_inset - 6.0 - line_h;
        LayoutBox::new(BoxTag::PageNumber, right - width, y, width, line_h).with_text(
            TextContent {
                lines: vec![TextLine {
                    text,
                    x_offset: 0.0,
                    y_offset: 0.0,
                }],
                font_size: size,
                bold: false,
                color: PAGE_NUMBER_COLOR,
            },
        )
    }
}
