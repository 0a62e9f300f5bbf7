//! Layout config – the frozen representation between pagination and PDF
//! emission. It records exactly what goes on each page, in authoring
//! space (origin top-left, y down), with a tag naming where every box came
//! from.

use serde::{Deserialize, Serialize};

use crate::assets::AssetTable;
use crate::binding::SignatureRole;
use crate::template::ElementName;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
    /// Images referenced by [`ImageContent::asset_id`].
    #[serde(skip)]
    pub assets: AssetTable,
}

/// One page of content, drawn in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// Flowing sections after the items table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Technician,
    Manager,
    Admin,
}

/// Where a box came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoxTag {
    PageBorder,
    Watermark,
    PageNumber,
    Fixed { element: ElementName },
    TableHeader,
    /// `index` is the line item's position in the record.
    TableRow { index: usize },
    Section { section: SectionKind },
    Signature { section: SectionKind, role: SignatureRole },
}

impl BoxTag {
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            BoxTag::PageBorder | BoxTag::Watermark | BoxTag::PageNumber
        )
    }
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    pub tag: BoxTag,
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 3]>,
    pub border: Option<BorderStyle>,

    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,

    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment).
    pub x_offset: f32,
    /// Y offset of the line's top from the top of the box.
    pub y_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub asset_id: String,
    pub width: f32,
    pub height: f32,
    /// 1.0 = opaque.
    pub opacity: f32,
}

impl DocumentLayout {
    pub fn new(title: &str, page_width_pt: f32, page_height_pt: f32) -> Self {
        Self {
            title: title.to_string(),
            page_width_pt,
            page_height_pt,
            pages: Vec::new(),
            assets: AssetTable::default(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON. Assets are not part of the JSON form.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Content tags in drawing order across all pages, with consecutive
    /// repeats collapsed and background boxes left out.
    pub fn block_sequence(&self) -> Vec<BoxTag> {
        let mut seq: Vec<BoxTag> = Vec::new();
        for page in &self.pages {
            for lbox in &page.boxes {
                if lbox.tag.is_background() {
                    continue;
                }
                if seq.last() != Some(&lbox.tag) {
                    seq.push(lbox.tag);
                }
            }
        }
        seq
    }

    /// `(page_index, line_item_index)` for every placed table row.
    pub fn table_rows(&self) -> Vec<(usize, usize)> {
        self.pages
            .iter()
            .flat_map(|page| {
                page.boxes.iter().filter_map(move |b| match b.tag {
                    BoxTag::TableRow { index } => Some((page.page_index, index)),
                    _ => None,
                })
            })
            .collect()
    }

    /// Pages carrying at least one box with this tag.
    pub fn pages_with(&self, tag: BoxTag) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.boxes.iter().any(|b| b.tag == tag))
            .map(|p| p.page_index)
            .collect()
    }

    pub fn contains(&self, tag: BoxTag) -> bool {
        !self.pages_with(tag).is_empty()
    }

    /// Every text line on the page, in drawing order.
    pub fn page_text(&self, page_index: usize) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(page) = self.pages.get(page_index) {
            for lbox in &page.boxes {
                lbox.visit(&mut |b| {
                    if let Some(text) = &b.text {
                        out.extend(text.lines.iter().map(|l| l.text.clone()));
                    }
                });
            }
        }
        out
    }
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            boxes: Vec::new(),
        }
    }
}

impl LayoutBox {
    pub fn new(tag: BoxTag, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            tag,
            x,
            y,
            width,
            height,
            background_color: None,
            border: None,
            text: None,
            image: None,
            children: Vec::new(),
        }
    }

    pub fn with_border(mut self, width: f32, color: [f32; 3]) -> Self {
        self.border = Some(BorderStyle { width, color });
        self
    }

    pub fn with_background(mut self, color: [f32; 3]) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_text(mut self, text: TextContent) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_image(mut self, asset_id: &str, width: f32, height: f32, opacity: f32) -> Self {
        self.image = Some(ImageContent {
            asset_id: asset_id.to_string(),
            width,
            height,
            opacity,
        });
        self
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Depth-first walk over this box and its children.
    pub fn visit(&self, f: &mut dyn FnMut(&LayoutBox)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sequence_collapses_repeats_and_skips_background() {
        let mut doc = DocumentLayout::new("t", 595.0, 842.0);
        let mut page = PageLayout::new(0);
        page.boxes.push(LayoutBox::new(BoxTag::PageBorder, 0.0, 0.0, 1.0, 1.0));
        page.boxes.push(LayoutBox::new(BoxTag::TableHeader, 0.0, 0.0, 1.0, 1.0));
        page.boxes.push(LayoutBox::new(BoxTag::TableRow { index: 0 }, 0.0, 0.0, 1.0, 1.0));
        page.boxes.push(LayoutBox::new(BoxTag::TableRow { index: 0 }, 0.0, 0.0, 1.0, 1.0));
        page.boxes.push(LayoutBox::new(BoxTag::PageNumber, 0.0, 0.0, 1.0, 1.0));
        doc.pages.push(page);

        assert_eq!(
            doc.block_sequence(),
            vec![BoxTag::TableHeader, BoxTag::TableRow { index: 0 }]
        );
        assert_eq!(doc.table_rows(), vec![(0, 0), (0, 0)]);
    }

    #[test]
    fn json_round_trip_keeps_tags() {
        let mut doc = DocumentLayout::new("t", 595.0, 842.0);
        let mut page = PageLayout::new(0);
        page.boxes.push(LayoutBox::new(
            BoxTag::Signature {
                section: SectionKind::Technician,
                role: SignatureRole::Client,
            },
            1.0,
            2.0,
            3.0,
            4.0,
        ));
        doc.pages.push(page);
        let parsed = DocumentLayout::from_json(&doc.to_json()).unwrap();
        assert_eq!(parsed.pages[0].boxes[0].tag, doc.pages[0].boxes[0].tag);
    }
}
