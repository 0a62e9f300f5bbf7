//! PDF renderer – takes a [`DocumentLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Layout boxes are in authoring space; every vertical position is turned
//! into PDF space through [`crate::coords`].

use std::collections::HashMap;

use printpdf::*;

use crate::coords;
use crate::error::RenderError;
use crate::layout_config::*;

const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Page-independent resources shared by every page.
struct Resources {
    images: HashMap<String, ImageResource>,
    /// Graphics states keyed by opacity in thousandths.
    alpha_states: HashMap<u32, ExtendedGraphicsStateId>,
}

/// Render a DocumentLayout into PDF bytes.
///
/// Images that fail to register are skipped with a `log::warn`; the rest of
/// the page is still drawn.
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
    if layout.pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    let page_w = Mm(layout.page_width_pt * PT_TO_MM);
    let page_h = Mm(layout.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&layout.title);
    let mut resources = Resources {
        images: HashMap::new(),
        alpha_states: HashMap::new(),
    };

    // ── Pre-register images and opacity states ────────────────────────────
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();
    for asset in layout.assets.iter() {
        match RawImage::decode_from_bytes(asset.bytes(), &mut img_warnings) {
            Ok(raw) => {
                let xobj_id = doc.add_image(&raw);
                resources.images.insert(
                    asset.id.clone(),
                    ImageResource {
                        xobj_id,
                        px_width: asset.px_width,
                        px_height: asset.px_height,
                    },
                );
            }
            Err(e) => log::warn!("Skipping image '{}': PDF encode error: {e}", asset.id),
        }
    }
    for page in &layout.pages {
        for lbox in &page.boxes {
            lbox.visit(&mut |b| {
                if let Some(img) = &b.image {
                    let key = alpha_key(img.opacity);
                    if key < 1000 && !resources.alpha_states.contains_key(&key) {
                        let mut gs = ExtendedGraphicsState::default();
                        gs.set_current_fill_alpha(img.opacity);
                        gs.set_current_stroke_alpha(img.opacity);
                        resources.alpha_states.insert(key, doc.add_graphics_state(gs));
                    }
                }
            });
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let pages: Vec<PdfPage> = layout
        .pages
        .iter()
        .map(|page_layout| {
            let mut ops = Vec::new();
            for lbox in &page_layout.boxes {
                render_box(&mut ops, lbox, layout.page_height_pt, &resources);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    doc.with_pages(pages);
    let mut save_warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut save_warnings);
    for w in &save_warnings {
        log::debug!("printpdf: {w:?}");
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(RenderError::Emit(
            "serialiser produced no PDF header".to_string(),
        ));
    }
    Ok(bytes)
}

fn alpha_key(opacity: f32) -> u32 {
    (opacity.clamp(0.0, 1.0) * 1000.0).round() as u32
}

fn rgb(c: [f32; 3]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Corners of a box in PDF space, counter-clockwise from bottom-left.
fn corners(lbox: &LayoutBox, page_height: f32) -> Vec<LinePoint> {
    let bottom = coords::box_y(page_height, lbox.y, lbox.height);
    let top = bottom + lbox.height;
    let (x1, x2) = (lbox.x, lbox.x + lbox.width);
    vec![
        point(x1, bottom),
        point(x2, bottom),
        point(x2, top),
        point(x1, top),
    ]
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(ops: &mut Vec<Op>, lbox: &LayoutBox, page_height: f32, res: &Resources) {
    // Background
    if let Some(bg) = lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(bg) });
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: corners(lbox, page_height),
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    // Border
    if let Some(border) = &lbox.border {
        ops.push(Op::SetOutlineColor {
            col: rgb(border.color),
        });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(border.width),
        });
        ops.push(Op::DrawLine {
            line: Line {
                points: corners(lbox, page_height),
                is_closed: true,
            },
        });
    }

    // Image – embed from pre-registered XObject
    if let Some(img) = &lbox.image {
        match res.images.get(&img.asset_id) {
            Some(image) => render_image(ops, lbox, img, image, page_height, res),
            None => log::debug!("No registered image for '{}'", img.asset_id),
        }
    }

    // Text
    if let Some(text) = &lbox.text {
        let font = if text.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        };

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            let text_y = coords::baseline_y(page_height, lbox.y + tline.y_offset, text.font_size);

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(text_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetFillColor { col: rgb(text.color) });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(tline.text.clone())],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    // Children
    for child in &lbox.children {
        render_box(ops, child, page_height, res);
    }
}

fn render_image(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    img: &ImageContent,
    image: &ImageResource,
    page_height: f32,
    res: &Resources,
) {
    // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px_dim.
    let scale_x = img.width / image.px_width.max(1) as f32;
    let scale_y = img.height / image.px_height.max(1) as f32;
    let alpha = res.alpha_states.get(&alpha_key(img.opacity));

    if let Some(gs) = alpha {
        ops.push(Op::SaveGraphicsState);
        ops.push(Op::LoadGraphicsState { gs: gs.clone() });
    }
    ops.push(Op::UseXobject {
        id: image.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Pt(lbox.x)),
            translate_y: Some(Pt(coords::box_y(page_height, lbox.y, img.height))),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });
    if alpha.is_some() {
        ops.push(Op::RestoreGraphicsState);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_single_empty_page() {
        let mut layout = DocumentLayout::new("t", 595.28, 841.89);
        layout.pages.push(PageLayout::new(0));
        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn no_pages_is_an_error() {
        let layout = DocumentLayout::new("t", 595.28, 841.89);
        assert!(matches!(render_pdf(&layout), Err(RenderError::EmptyDocument)));
    }

    #[test]
    fn opacity_keys_bucket_to_thousandths() {
        assert_eq!(alpha_key(0.1), 100);
        assert_eq!(alpha_key(1.0), 1000);
        assert_eq!(alpha_key(3.0), 1000);
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn text_page(text: &str) -> DocumentLayout {
        let mut layout = DocumentLayout::new("t", 595.28, 841.89);
        let mut page = PageLayout::new(0);
        page.boxes.push(
            LayoutBox::new(BoxTag::PageNumber, 40.0, 40.0, 200.0, 12.0).with_text(TextContent {
                lines: vec![TextLine {
                    text: text.to_string(),
                    x_offset: 0.0,
                    y_offset: 0.0,
                }],
                font_size: 10.0,
                bold: false,
                color: [0.0, 0.0, 0.0],
            }),
        );
        layout.pages.push(page);
        layout
    }

    #[test]
    fn latin1_text_is_win_ansi_encoded() {
        let bytes = render_pdf(&text_page("Café")).unwrap();
        assert!(contains(&bytes, b"436166E9"), "expected WinAnsi hex for 'Café'");
    }

    #[test]
    fn translucent_image_gets_an_alpha_graphics_state() {
        use crate::assets::{ImageAsset, ImageSource};

        let png = crate::assets::tests::png_bytes(10, 10);
        let asset = ImageAsset::load("watermark", &ImageSource::Bytes(png)).unwrap();
        let mut layout = DocumentLayout::new("t", 595.28, 841.89);
        layout.assets.insert(asset);
        let mut page = PageLayout::new(0);
        page.boxes.push(
            LayoutBox::new(BoxTag::Watermark, 100.0, 300.0, 200.0, 200.0)
                .with_image("watermark", 200.0, 200.0, 0.1),
        );
        layout.pages.push(page);

        let bytes = render_pdf(&layout).unwrap();
        assert!(contains(&bytes, b"/ca 0.1"), "missing fill alpha");
    }
}
