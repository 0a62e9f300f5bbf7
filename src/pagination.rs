//! Pagination – places composed blocks onto fixed-size pages.
//!
//! Two passes:
//! 1. **Measure** – wrap every flowing block to its width and compute its
//!    height (per row for the items table).
//! 2. **Place** – walk the measured blocks down the page with a vertical
//!    cursor. The items table splits at row boundaries; every other block
//!    moves to a new page whole when it does not fit.
//!
//! Page 1 carries the fixed header blocks; every page gets the background
//! underlay when opened and its page number once the total is known.

use crate::background::PageBackground;
use crate::compose::{
    ComposedDocument, FixedBlock, FixedContent, FlowBlock, SectionBlock, TableBlock, UNSET,
};
use crate::error::RenderError;
use crate::fonts::{wrap_text, FontMetrics};
use crate::layout_config::{BoxTag, DocumentLayout, LayoutBox, PageLayout, TextContent, TextLine};
use crate::pipeline::RenderConfig;
use crate::template::ElementName;

/// Inner padding of table cells.
pub const CELL_PADDING: f32 = 4.0;
/// Gap between the lowest fixed block and the flowing region.
pub const HEADER_GAP: f32 = 10.0;

const TEXT_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
const GRID_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
const HEADER_FILL: [f32; 3] = [0.5, 0.5, 0.5];
const HEADER_TEXT: [f32; 3] = [0.96, 0.96, 0.96];
const ROW_FILL: [f32; 3] = [0.96, 0.96, 0.86];
const PLACEHOLDER_COLOR: [f32; 3] = [0.6, 0.6, 0.6];

/// Gap between notes and the signature row.
const SIGNATURE_GAP: f32 = 6.0;
/// Horizontal gap between signature slots.
const SLOT_GAP: f32 = 15.0;

// ---------------------------------------------------------------------------
// Measure pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MeasuredRow {
    /// Wrapped lines per cell.
    cells: Vec<Vec<String>>,
    height: f32,
}

#[derive(Debug, Clone)]
struct MeasuredTable {
    x: f32,
    width: f32,
    col_widths: Vec<f32>,
    font_size: f32,
    header: MeasuredRow,
    rows: Vec<MeasuredRow>,
}

#[derive(Debug, Clone)]
struct MeasuredSection {
    block: SectionBlock,
    heading_height: f32,
    notes_lines: Vec<String>,
    notes_height: f32,
    signature_row_height: f32,
    footer_height: f32,
    height: f32,
}

#[derive(Debug, Clone)]
enum MeasuredBlock {
    Table(MeasuredTable),
    Section(MeasuredSection),
}

fn measure_row(cells: &[String], col_widths: &[f32], font_size: f32, bold: bool, m: &FontMetrics) -> MeasuredRow {
    let cells: Vec<Vec<String>> = cells
        .iter()
        .zip(col_widths)
        .map(|(text, w)| wrap_text(text, font_size, bold, w - 2.0 * CELL_PADDING, m))
        .collect();
    let max_lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    MeasuredRow {
        height: m.block_height(max_lines, font_size) + 2.0 * CELL_PADDING,
        cells,
    }
}

fn measure_table(table: &TableBlock, m: &FontMetrics) -> MeasuredTable {
    let g = table.geometry;
    let col_widths: Vec<f32> = table.columns.iter().map(|c| c.ratio * g.width).collect();
    let titles: Vec<String> = table.columns.iter().map(|c| c.title.to_string()).collect();
    MeasuredTable {
        x: g.x,
        width: g.width,
        header: measure_row(&titles, &col_widths, g.font_size, true, m),
        rows: table
            .rows
            .iter()
            .map(|r| measure_row(r, &col_widths, g.font_size, false, m))
            .collect(),
        col_widths,
        font_size: g.font_size,
    }
}

fn measure_section(section: &SectionBlock, m: &FontMetrics) -> MeasuredSection {
    let g = section.geometry;
    let notes = if section.notes.trim().is_empty() {
        UNSET
    } else {
        section.notes.as_str()
    };
    let notes_lines = wrap_text(notes, g.font_size, false, g.width, m);
    let heading_height = m.line_height(g.font_size + 1.0) + 2.0;
    let notes_height = m
        .block_height(notes_lines.len(), g.font_size)
        .max(section.min_notes_height);
    let signature_row_height = if section.signatures.is_empty() {
        0.0
    } else {
        SIGNATURE_GAP + section.signature_height + m.line_height(g.font_size)
    };
    let footer_height = m.block_height(section.footer.len(), g.font_size);
    MeasuredSection {
        block: section.clone(),
        height: heading_height + notes_height + signature_row_height + footer_height,
        heading_height,
        notes_lines,
        notes_height,
        signature_row_height,
        footer_height,
    }
}

fn measure(block: &FlowBlock, m: &FontMetrics) -> MeasuredBlock {
    match block {
        FlowBlock::ItemsTable(t) => MeasuredBlock::Table(measure_table(t, m)),
        FlowBlock::Section(s) => MeasuredBlock::Section(measure_section(s, m)),
    }
}

// ---------------------------------------------------------------------------
// Place pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    PlacingHeader,
    FlowingBody,
    PageBreak,
    Done,
}

struct Paginator<'a> {
    config: &'a RenderConfig,
    background: &'a PageBackground,
    metrics: FontMetrics,
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
    /// Nothing flowed onto the current page since it was opened by a break.
    fresh: bool,
    phase: Phase,
}

impl<'a> Paginator<'a> {
    fn new(config: &'a RenderConfig, background: &'a PageBackground) -> Self {
        let mut current = PageLayout::new(0);
        current.boxes.extend(background.underlay());
        Self {
            config,
            background,
            metrics: FontMetrics::default(),
            pages: Vec::new(),
            current,
            cursor: config.page_margin,
            fresh: false,
            phase: Phase::PlacingHeader,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::trace!("pagination: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn content_bottom(&self) -> f32 {
        self.config.content_bottom()
    }

    fn remaining(&self) -> f32 {
        self.content_bottom() - self.cursor
    }

    fn page_break(&mut self, reason: &str) {
        self.set_phase(Phase::PageBreak);
        let index = self.pages.len() + 1;
        let finished = std::mem::replace(&mut self.current, PageLayout::new(index));
        self.pages.push(finished);
        self.current.boxes.extend(self.background.underlay());
        self.cursor = self.config.page_margin;
        self.fresh = true;
        log::debug!("Page break before page {} ({reason})", index + 1);
        self.set_phase(Phase::FlowingBody);
    }

    fn push(&mut self, lbox: LayoutBox) {
        self.current.boxes.push(lbox);
        self.fresh = false;
    }

    // -- fixed header -------------------------------------------------------

    fn place_fixed(&mut self, block: &FixedBlock) {
        let g = block.geometry;
        let tag = BoxTag::Fixed {
            element: block.element,
        };
        let mut lbox = LayoutBox::new(tag, g.x, g.y, g.width, g.height);
        match &block.content {
            FixedContent::Image { asset_id } => {
                lbox = lbox.with_image(asset_id, g.width, g.height, 1.0);
            }
            FixedContent::Placeholder { label } => {
                lbox = lbox.with_border(0.5, PLACEHOLDER_COLOR);
                let width = self.metrics.measure_text_width(label, g.font_size, false);
                let line_h = self.metrics.line_height(g.font_size);
                lbox.children.push(text_box(
                    tag,
                    g.x + ((g.width - width) / 2.0).max(0.0),
                    g.y + ((g.height - line_h) / 2.0).max(0.0),
                    width,
                    vec![label.clone()],
                    g.font_size,
                    false,
                    PLACEHOLDER_COLOR,
                    &self.metrics,
                ));
            }
            FixedContent::Text { lines } => {
                let mut y = g.y;
                let limit = g.bottom();
                'lines: for line in lines {
                    let line_h = self.metrics.line_height(line.font_size);
                    for wrapped in wrap_text(&line.text, line.font_size, line.bold, g.width, &self.metrics) {
                        if y + line_h > limit {
                            log::debug!("Clipped overflow of '{}'", block.element.as_str());
                            break 'lines;
                        }
                        lbox.children.push(text_box(
                            tag,
                            g.x,
                            y,
                            g.width,
                            vec![wrapped],
                            line.font_size,
                            line.bold,
                            TEXT_COLOR,
                            &self.metrics,
                        ));
                        y += line_h;
                    }
                }
            }
        }
        self.push(lbox);
    }

    // -- items table --------------------------------------------------------

    fn place_table(&mut self, t: &MeasuredTable) {
        let mut next = 0usize;
        loop {
            let first_row = t.rows.get(next).map_or(0.0, |r| r.height);
            if !self.fresh && self.remaining() < t.header.height + first_row {
                self.page_break("items table does not fit");
            }
            let fresh = self.fresh;
            self.place_row(t, &t.header, BoxTag::TableHeader, true);

            let mut placed_here = 0usize;
            while let Some(row) = t.rows.get(next) {
                if row.height <= self.remaining() {
                    self.place_row(t, row, BoxTag::TableRow { index: next }, false);
                } else if placed_here == 0 && fresh {
                    log::debug!(
                        "Row {} ({:.1}pt) taller than an empty page; placing it clipped",
                        next,
                        row.height
                    );
                    self.place_row(t, row, BoxTag::TableRow { index: next }, false);
                } else {
                    break;
                }
                next += 1;
                placed_here += 1;
            }

            if next >= t.rows.len() {
                break;
            }
            log::debug!("Items table split after row {}", next - 1);
            self.page_break("items table continues");
        }
        self.cursor += self.config.section_spacing;
    }

    fn place_row(&mut self, t: &MeasuredTable, row: &MeasuredRow, tag: BoxTag, is_header: bool) {
        let limit = self.content_bottom();
        let y = self.cursor;
        let height = row.height.min((limit - y).max(0.0));
        let fill = if is_header { HEADER_FILL } else { ROW_FILL };
        let color = if is_header { HEADER_TEXT } else { TEXT_COLOR };

        let mut lbox = LayoutBox::new(tag, t.x, y, t.width, height).with_background(fill);
        let mut x = t.x;
        for (lines, &w) in row.cells.iter().zip(&t.col_widths) {
            let line_h = self.metrics.line_height(t.font_size);
            let fitting = fitting_lines(lines, y + CELL_PADDING, line_h, limit);
            let mut cell = text_box(
                tag,
                x,
                y,
                w,
                fitting,
                t.font_size,
                is_header,
                color,
                &self.metrics,
            );
            cell.height = height;
            if let Some(text) = cell.text.as_mut() {
                for line in &mut text.lines {
                    line.x_offset = CELL_PADDING;
                    line.y_offset += CELL_PADDING;
                }
            }
            lbox.children.push(cell.with_border(0.75, GRID_COLOR));
            x += w;
        }
        self.push(lbox);
        self.cursor += row.height;
    }

    // -- sections -----------------------------------------------------------

    fn place_section(&mut self, s: &MeasuredSection) {
        if s.height > self.remaining() && !self.fresh {
            self.page_break("section does not fit");
        }
        if s.height <= self.remaining() {
            self.place_section_whole(s);
        } else {
            log::debug!(
                "{:?} section ({:.1}pt) taller than an empty page; splitting its notes",
                s.block.kind,
                s.height
            );
            self.place_section_split(s);
        }
    }

    fn place_section_whole(&mut self, s: &MeasuredSection) {
        let g = s.block.geometry;
        let tag = BoxTag::Section {
            section: s.block.kind,
        };
        let top = self.cursor;

        let mut section = LayoutBox::new(tag, g.x, top, g.width, s.height);
        section.children.push(self.heading_box(s, top));
        let notes_top = top + s.heading_height;
        section.children.push(text_box(
            tag,
            g.x,
            notes_top,
            g.width,
            s.notes_lines.clone(),
            g.font_size,
            false,
            TEXT_COLOR,
            &self.metrics,
        ));
        let footer_top = notes_top + s.notes_height + s.signature_row_height;
        if s.footer_height > 0.0 {
            section.children.push(self.footer_box(s, footer_top));
        }
        self.push(section);

        if !s.block.signatures.is_empty() {
            let limit = self.content_bottom();
            self.place_signatures(s, notes_top + s.notes_height + SIGNATURE_GAP, limit);
        }
        self.cursor = top + s.height + self.config.section_spacing;
    }

    /// Flow an oversized section: notes continue line by line on following
    /// pages, then the signature row and footer follow on whichever page has
    /// room for them.
    fn place_section_split(&mut self, s: &MeasuredSection) {
        let g = s.block.geometry;
        let tag = BoxTag::Section {
            section: s.block.kind,
        };
        let limit = self.content_bottom();
        let line_h = self.metrics.line_height(g.font_size);

        let mut piece_top = self.cursor;
        let mut page_fresh = self.fresh;
        let mut piece = LayoutBox::new(tag, g.x, piece_top, g.width, 0.0);
        piece.children.push(self.heading_box(s, piece_top));
        let mut y = piece_top + s.heading_height;

        let mut notes: &[String] = &s.notes_lines;
        loop {
            let room = ((limit - y) / line_h + 1e-4).floor().max(0.0) as usize;
            let mut take = room.min(notes.len());
            if take == 0 && page_fresh && !notes.is_empty() {
                log::debug!("Notes line taller than an empty page; placing it clipped");
                take = 1;
            }
            if take > 0 {
                piece.children.push(text_box(
                    tag,
                    g.x,
                    y,
                    g.width,
                    notes[..take].to_vec(),
                    g.font_size,
                    false,
                    TEXT_COLOR,
                    &self.metrics,
                ));
                y += take as f32 * line_h;
                notes = &notes[take..];
            }
            piece.height = y - piece_top;
            self.push(piece);
            if notes.is_empty() {
                break;
            }
            self.page_break("section notes continue");
            piece_top = self.cursor;
            y = piece_top;
            page_fresh = true;
            piece = LayoutBox::new(tag, g.x, piece_top, g.width, 0.0);
        }

        if !s.block.signatures.is_empty() {
            if y + s.signature_row_height > limit {
                self.page_break("signature row does not fit");
                y = self.cursor;
            }
            self.place_signatures(s, y + SIGNATURE_GAP, limit);
            y += s.signature_row_height;
        }

        if s.footer_height > 0.0 {
            if y + s.footer_height > limit {
                self.page_break("section footer does not fit");
                y = self.cursor;
            }
            let mut footer = LayoutBox::new(tag, g.x, y, g.width, s.footer_height);
            footer.children.push(self.footer_box(s, y));
            self.push(footer);
            y += s.footer_height;
        }
        self.cursor = y + self.config.section_spacing;
    }

    fn heading_box(&self, s: &MeasuredSection, top: f32) -> LayoutBox {
        let g = s.block.geometry;
        text_box(
            BoxTag::Section {
                section: s.block.kind,
            },
            g.x,
            top,
            g.width,
            vec![s.block.heading.clone()],
            g.font_size + 1.0,
            true,
            TEXT_COLOR,
            &self.metrics,
        )
    }

    fn footer_box(&self, s: &MeasuredSection, top: f32) -> LayoutBox {
        let g = s.block.geometry;
        text_box(
            BoxTag::Section {
                section: s.block.kind,
            },
            g.x,
            top,
            g.width,
            s.block.footer.clone(),
            g.font_size,
            false,
            TEXT_COLOR,
            &self.metrics,
        )
    }

    /// Every slot is placed; a signature image taller than the space left
    /// is shrunk to fit above its name line.
    fn place_signatures(&mut self, s: &MeasuredSection, top: f32, limit: f32) {
        let g = s.block.geometry;
        let n = s.block.signatures.len() as f32;
        let slot_w = (g.width - SLOT_GAP * (n - 1.0)) / n;
        let line_h = self.metrics.line_height(g.font_size);
        let sig_h = s.block.signature_height.min((limit - top - line_h).max(0.0));
        if sig_h < s.block.signature_height {
            log::debug!("{:?} signature row clipped at page bottom", s.block.kind);
        }

        for (i, slot) in s.block.signatures.iter().enumerate() {
            let x = g.x + i as f32 * (slot_w + SLOT_GAP);
            let tag = BoxTag::Signature {
                section: s.block.kind,
                role: slot.role,
            };
            let mut lbox = LayoutBox::new(tag, x, top, slot_w, sig_h);
            match &slot.asset_id {
                Some(id) => lbox = lbox.with_image(id, slot_w, sig_h, 1.0),
                None => lbox = lbox.with_border(0.5, PLACEHOLDER_COLOR),
            }
            lbox.children.push(text_box(
                tag,
                x,
                top + sig_h,
                slot_w,
                vec![slot.name_line.clone()],
                g.font_size,
                false,
                TEXT_COLOR,
                &self.metrics,
            ));
            self.push(lbox);
        }
    }

    fn finish(mut self, title: &str) -> DocumentLayout {
        self.set_phase(Phase::Done);
        self.pages.push(self.current);
        let total = self.pages.len();
        for page in &mut self.pages {
            page.boxes
                .push(self.background.page_number(page.page_index, total));
        }
        let mut doc = DocumentLayout::new(title, self.config.page_width, self.config.page_height);
        doc.pages = self.pages;
        doc
    }
}

/// Lines whose bottom edge stays above `limit`, starting at `top`.
fn fitting_lines(lines: &[String], top: f32, line_h: f32, limit: f32) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .take_while(|(i, _)| top + (*i as f32 + 1.0) * line_h <= limit + 0.01)
        .map(|(_, l)| l.clone())
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn text_box(
    tag: BoxTag,
    x: f32,
    y: f32,
    width: f32,
    lines: Vec<String>,
    font_size: f32,
    bold: bool,
    color: [f32; 3],
    m: &FontMetrics,
) -> LayoutBox {
    let line_h = m.line_height(font_size);
    let height = m.block_height(lines.len(), font_size);
    LayoutBox::new(tag, x, y, width, height).with_text(TextContent {
        lines: lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextLine {
                text,
                x_offset: 0.0,
                y_offset: i as f32 * line_h,
            })
            .collect(),
        font_size,
        bold,
        color,
    })
}

/// Where the flowing region starts on page 1.
pub fn flow_start(doc: &ComposedDocument, table_top: f32) -> f32 {
    let header_bottom = doc
        .fixed
        .iter()
        .filter(|b| ElementName::FIXED.contains(&b.element))
        .map(|b| b.geometry.bottom())
        .fold(0.0f32, f32::max);
    table_top.max(header_bottom + HEADER_GAP)
}

/// Lay out a composed document onto pages.
pub fn paginate(
    doc: ComposedDocument,
    background: &PageBackground,
    config: &RenderConfig,
    title: &str,
) -> Result<DocumentLayout, RenderError> {
    config.validate()?;
    let metrics = FontMetrics::default();

    // Measure.
    let measured: Vec<MeasuredBlock> = doc.body.iter().map(|b| measure(b, &metrics)).collect();

    // Header.
    let mut p = Paginator::new(config, background);
    for block in &doc.fixed {
        let block = fit_header_image(block, &doc);
        p.place_fixed(&block);
    }

    // Flowing body.
    let table_top = doc
        .body
        .iter()
        .find_map(|b| match b {
            FlowBlock::ItemsTable(t) => Some(t.geometry.y),
            FlowBlock::Section(_) => None,
        })
        .unwrap_or(config.page_margin);
    p.cursor = flow_start(&doc, table_top);
    p.set_phase(Phase::FlowingBody);
    if p.cursor >= p.content_bottom() {
        p.page_break("header fills first page");
    }

    for block in &measured {
        match block {
            MeasuredBlock::Table(t) => p.place_table(t),
            MeasuredBlock::Section(s) => p.place_section(s),
        }
    }

    let mut layout = p.finish(title);
    layout.assets = doc.assets;
    if layout.pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    Ok(layout)
}

/// Shrink a header image block to its aspect-correct size within the box.
fn fit_header_image(block: &FixedBlock, doc: &ComposedDocument) -> FixedBlock {
    let mut block = block.clone();
    if let FixedContent::Image { asset_id } = &block.content {
        if let Some(asset) = doc.assets.get(asset_id) {
            let (w, h) = asset.fit_within(block.geometry.width, block.geometry.height);
            block.geometry.width = w;
            block.geometry.height = h;
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetTable;
    use crate::binding::{RenderContext, SignatureRole};
    use crate::compose::compose;
    use crate::layout_config::SectionKind;
    use crate::record::{Company, JobStatus, Jobcard, LineItem};
    use crate::settings::BrandingSettings;
    use crate::template::LayoutSnapshot;

    fn layout_for(card: Jobcard) -> DocumentLayout {
        let config = RenderConfig::default();
        let branding = BrandingSettings::default();
        let ctx = RenderContext::bound(branding.clone(), card, LayoutSnapshot::defaults());
        let mut doc = compose(&ctx);
        let mut assets = AssetTable::default();
        let bg = PageBackground::prepare(&branding, &config, &mut assets);
        for a in assets.iter() {
            doc.assets.insert(a.clone());
        }
        paginate(doc, &bg, &config, "test").unwrap()
    }

    fn card_with_items(n: usize, status: JobStatus) -> Jobcard {
        let mut card = Jobcard::new(
            Some(Company {
                name: "Acme Corp".into(),
                ..Company::default()
            }),
            None,
        );
        card.status = status;
        card.items = (0..n)
            .map(|i| LineItem::new(&format!("Item {i}"), "", 1, ""))
            .collect();
        card
    }

    #[test]
    fn flow_starts_at_items_table_top_by_default() {
        let ctx = RenderContext::preview(BrandingSettings::default(), LayoutSnapshot::defaults());
        let doc = compose(&ctx);
        assert_eq!(flow_start(&doc, 240.0), 240.0);
        assert_eq!(flow_start(&doc, 100.0), 225.0 + HEADER_GAP);
    }

    #[test]
    fn long_table_splits_at_row_boundaries() {
        let layout = layout_for(card_with_items(120, JobStatus::Draft));
        assert!(layout.page_count() > 1);

        let rows = layout.table_rows();
        let indices: Vec<usize> = rows.iter().map(|&(_, i)| i).collect();
        assert_eq!(indices, (0..120).collect::<Vec<_>>());
        // Header is repeated on every page carrying rows.
        let mut row_pages: Vec<usize> = rows.iter().map(|&(p, _)| p).collect();
        row_pages.dedup();
        assert_eq!(layout.pages_with(BoxTag::TableHeader), row_pages);

        let bottom = RenderConfig::default().content_bottom();
        for page in &layout.pages {
            for b in &page.boxes {
                if matches!(b.tag, BoxTag::TableRow { .. }) {
                    assert!(b.bottom() <= bottom + 0.01);
                }
            }
        }
    }

    #[test]
    fn oversized_row_is_forced_onto_an_empty_page() {
        let mut card = card_with_items(1, JobStatus::Draft);
        card.items[0].description = "word ".repeat(3000);
        let layout = layout_for(card);
        assert_eq!(layout.table_rows().len(), 1);
        assert!(layout.page_count() >= 2);
    }

    #[test]
    fn background_is_on_every_page() {
        let layout = layout_for(card_with_items(150, JobStatus::Invoiced));
        let all: Vec<usize> = (0..layout.page_count()).collect();
        assert_eq!(layout.pages_with(BoxTag::PageBorder), all);
        assert_eq!(layout.pages_with(BoxTag::PageNumber), all);
        let last = layout.page_count();
        let text = layout.page_text(last - 1);
        assert!(text.contains(&format!("Page {last} of {last}")));
    }

    #[test]
    fn sections_follow_the_table_in_order() {
        let layout = layout_for(card_with_items(3, JobStatus::Invoiced));
        let sections: Vec<SectionKind> = layout
            .block_sequence()
            .into_iter()
            .filter_map(|t| match t {
                BoxTag::Section { section } => Some(section),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            vec![SectionKind::Technician, SectionKind::Manager, SectionKind::Admin]
        );
    }

    #[test]
    fn section_moves_whole_to_next_page() {
        // Enough rows to leave only a sliver of the first page.
        let m = FontMetrics::default();
        let row_h = m.block_height(1, 9.0) + 2.0 * CELL_PADDING;
        let config = RenderConfig::default();
        let free = config.content_bottom() - 240.0;
        let rows = ((free - row_h - 20.0) / row_h).floor() as usize;
        let layout = layout_for(card_with_items(rows, JobStatus::Draft));

        let tech = BoxTag::Section {
            section: SectionKind::Technician,
        };
        let pages = layout.pages_with(tech);
        assert_eq!(pages, vec![1]);
        assert!(layout.table_rows().iter().all(|&(p, _)| p == 0));
    }

    #[test]
    fn oversized_section_flows_notes_and_keeps_signatures() {
        let mut card = card_with_items(1, JobStatus::Draft);
        card.tech_notes = (0..4000)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let layout = layout_for(card);
        assert!(layout.page_count() >= 2);

        let words: Vec<usize> = (0..layout.page_count())
            .flat_map(|p| layout.page_text(p))
            .flat_map(|line| {
                line.split_whitespace()
                    .filter_map(|t| t.strip_prefix("word").and_then(|n| n.parse().ok()))
                    .collect::<Vec<usize>>()
            })
            .collect();
        assert_eq!(words, (0..4000).collect::<Vec<_>>());

        for role in [SignatureRole::Technician, SignatureRole::Client] {
            assert!(layout.contains(BoxTag::Signature {
                section: SectionKind::Technician,
                role,
            }));
        }

        let bottom = RenderConfig::default().content_bottom();
        for page in &layout.pages {
            for b in page.boxes.iter().filter(|b| !b.tag.is_background()) {
                assert!(b.bottom() <= bottom + 0.01, "{:?} overflows", b.tag);
            }
        }
    }
}
