//! Content composer – turns a [`RenderContext`] into the ordered logical
//! blocks of a job card.
//!
//! Fixed blocks sit at their configured coordinates on page 1 and are
//! clipped to their box. Flowing blocks are placed by the paginator in the
//! order given here; which sections appear depends on the card's status.

use crate::assets::{acquire, AssetTable};
use crate::binding::{RenderContext, RenderableRecord, SignatureRole};
use crate::layout_config::SectionKind;
use crate::template::{ElementGeometry, ElementName, LayoutSnapshot};

/// Printed in place of a missing client/company or technician.
pub const NOT_AVAILABLE: &str = "N/A";
/// Printed in place of an unset timestamp or empty field.
pub const UNSET: &str = "-";

pub const LOGO_ASSET_ID: &str = "logo";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line of header text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub bold: bool,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixedContent {
    Image { asset_id: String },
    /// Empty box with a label, drawn when an optional image is absent.
    Placeholder { label: String },
    Text { lines: Vec<StyledLine> },
}

/// A block drawn once at its configured position.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBlock {
    pub element: ElementName,
    pub geometry: ElementGeometry,
    pub content: FixedContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub title: &'static str,
    /// Share of the table width.
    pub ratio: f32,
}

pub const ITEM_COLUMNS: [TableColumn; 4] = [
    TableColumn {
        title: "Description",
        ratio: 0.40,
    },
    TableColumn {
        title: "Parts",
        ratio: 0.25,
    },
    TableColumn {
        title: "Qty",
        ratio: 0.10,
    },
    TableColumn {
        title: "Person Helped",
        ratio: 0.25,
    },
];

/// The line-items table; the only block that splits across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub geometry: ElementGeometry,
    pub columns: Vec<TableColumn>,
    /// One entry per line item, in record order.
    pub rows: Vec<Vec<String>>,
}

/// One signature: a name line paired with an image or an empty box.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureSlot {
    pub role: SignatureRole,
    pub name_line: String,
    /// `None` when the image is absent or failed to decode.
    pub asset_id: Option<String>,
}

/// Notes with optional signatures and trailing lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBlock {
    pub kind: SectionKind,
    pub geometry: ElementGeometry,
    pub heading: String,
    pub notes: String,
    /// Minimum height reserved for the notes text.
    pub min_notes_height: f32,
    pub signatures: Vec<SignatureSlot>,
    /// Height of each signature image area.
    pub signature_height: f32,
    pub footer: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowBlock {
    ItemsTable(TableBlock),
    Section(SectionBlock),
}

impl FlowBlock {
    pub fn section_kind(&self) -> Option<SectionKind> {
        match self {
            FlowBlock::ItemsTable(_) => None,
            FlowBlock::Section(s) => Some(s.kind),
        }
    }
}

/// Output of the composer.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub fixed: Vec<FixedBlock>,
    pub body: Vec<FlowBlock>,
    pub assets: AssetTable,
}

/// Build the fixed and flowing blocks for one render.
pub fn compose(ctx: &RenderContext) -> ComposedDocument {
    let mut assets = AssetTable::default();
    let record = &ctx.record;
    let layout = &ctx.layout;

    let fixed = vec![
        logo_block(ctx, &mut assets),
        company_block(ctx),
        meta_block(record, layout),
        client_block(record, layout),
        times_block(record, layout),
    ];

    let mut body = vec![FlowBlock::ItemsTable(items_table(record, layout))];
    body.push(FlowBlock::Section(technician_section(
        record,
        layout,
        &mut assets,
    )));
    if record.status().includes_manager_section() {
        body.push(FlowBlock::Section(manager_section(
            record,
            layout,
            &mut assets,
        )));
    }
    if record.status().includes_admin_section() {
        body.push(FlowBlock::Section(admin_section(record, layout)));
    }

    log::debug!(
        "Composed {} ({:?} mode): {} fixed blocks, {} flowing blocks",
        record.jobcard_number(),
        record.mode(),
        fixed.len(),
        body.len()
    );

    ComposedDocument {
        fixed,
        body,
        assets,
    }
}

/// Client name, else company name, else "N/A".
pub fn client_display_name(record: &RenderableRecord) -> &str {
    record
        .client_name()
        .or_else(|| record.company_name())
        .unwrap_or(NOT_AVAILABLE)
}

fn text_block(element: ElementName, layout: &LayoutSnapshot, lines: Vec<(String, bool)>) -> FixedBlock {
    let geometry = layout.get(element);
    FixedBlock {
        element,
        geometry,
        content: FixedContent::Text {
            lines: lines
                .into_iter()
                .map(|(text, bold)| StyledLine {
                    text,
                    bold,
                    font_size: geometry.font_size,
                })
                .collect(),
        },
    }
}

fn logo_block(ctx: &RenderContext, assets: &mut AssetTable) -> FixedBlock {
    let geometry = ctx.layout.get(ElementName::HeaderLogo);
    let content = match acquire(LOGO_ASSET_ID, ctx.branding.logo.as_ref()) {
        Some(asset) => {
            assets.insert(asset);
            FixedContent::Image {
                asset_id: LOGO_ASSET_ID.to_string(),
            }
        }
        None => FixedContent::Placeholder {
            label: "LOGO".to_string(),
        },
    };
    FixedBlock {
        element: ElementName::HeaderLogo,
        geometry,
        content,
    }
}

fn company_block(ctx: &RenderContext) -> FixedBlock {
    let branding = &ctx.branding;
    let geometry = ctx.layout.get(ElementName::CompanyInfo);
    let mut lines = vec![StyledLine {
        text: branding.company_name.clone(),
        bold: true,
        font_size: geometry.font_size + 4.0,
    }];
    let rest = branding
        .company_address
        .lines()
        .chain(std::iter::once(branding.company_contact.as_str()))
        .map(str::trim)
        .filter(|l| !l.is_empty());
    lines.extend(rest.map(|l| StyledLine {
        text: l.to_string(),
        bold: false,
        font_size: geometry.font_size,
    }));
    FixedBlock {
        element: ElementName::CompanyInfo,
        geometry,
        content: FixedContent::Text { lines },
    }
}

fn meta_block(record: &RenderableRecord, layout: &LayoutSnapshot) -> FixedBlock {
    text_block(
        ElementName::JobcardMeta,
        layout,
        vec![
            (format!("Jobcard: {}", record.jobcard_number()), true),
            (format!("Date: {}", record.date().format(DATE_FORMAT)), false),
            (format!("Status: {}", record.status().label()), false),
            (format!("Category: {}", record.category().label()), false),
        ],
    )
}

fn client_block(record: &RenderableRecord, layout: &LayoutSnapshot) -> FixedBlock {
    let mut lines = vec![(format!("Client: {}", client_display_name(record)), true)];
    if let Some(email) = record.company_email() {
        lines.push((format!("Email: {email}"), false));
    }
    let technician = record
        .technician_name()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    lines.push((format!("Technician: {technician}"), false));
    text_block(ElementName::ClientDetails, layout, lines)
}

fn times_block(record: &RenderableRecord, layout: &LayoutSnapshot) -> FixedBlock {
    let fmt = |t: Option<chrono::NaiveDateTime>| {
        t.map(|t| t.format(DATE_TIME_FORMAT).to_string())
            .unwrap_or_else(|| UNSET.to_string())
    };
    text_block(
        ElementName::StartStopTimes,
        layout,
        vec![
            (format!("Start: {}", fmt(record.time_start())), false),
            (format!("Stop: {}", fmt(record.time_stop())), false),
        ],
    )
}

fn items_table(record: &RenderableRecord, layout: &LayoutSnapshot) -> TableBlock {
    let rows = record
        .items()
        .iter()
        .map(|item| {
            vec![
                item.description.clone(),
                item.parts_used.clone(),
                item.qty.to_string(),
                item.person_helped.clone(),
            ]
        })
        .collect();
    TableBlock {
        geometry: layout.get(ElementName::ItemsTable),
        columns: ITEM_COLUMNS.to_vec(),
        rows,
    }
}

fn signature_slot(
    record: &RenderableRecord,
    role: SignatureRole,
    assets: &mut AssetTable,
) -> SignatureSlot {
    let name = record.signer_name(role).trim();
    let name = if name.is_empty() { UNSET } else { name };
    let asset_id = acquire(role.asset_id(), record.signature(role)).map(|asset| {
        let id = asset.id.clone();
        assets.insert(asset);
        id
    });
    SignatureSlot {
        role,
        name_line: format!("{}: {}", role.label(), name),
        asset_id,
    }
}

fn technician_section(
    record: &RenderableRecord,
    layout: &LayoutSnapshot,
    assets: &mut AssetTable,
) -> SectionBlock {
    let geometry = layout.get(ElementName::Signatures);
    SectionBlock {
        kind: SectionKind::Technician,
        geometry,
        heading: "Technician Notes".to_string(),
        notes: record.tech_notes().to_string(),
        min_notes_height: 0.0,
        signatures: vec![
            signature_slot(record, SignatureRole::Technician, assets),
            signature_slot(record, SignatureRole::Client, assets),
        ],
        signature_height: geometry.height,
        footer: Vec::new(),
    }
}

fn manager_section(
    record: &RenderableRecord,
    layout: &LayoutSnapshot,
    assets: &mut AssetTable,
) -> SectionBlock {
    let geometry = layout.get(ElementName::ManagerNotes);
    SectionBlock {
        kind: SectionKind::Manager,
        geometry,
        heading: "Manager Notes".to_string(),
        notes: record.manager_notes().to_string(),
        min_notes_height: geometry.height,
        signatures: vec![signature_slot(record, SignatureRole::Manager, assets)],
        signature_height: layout.get(ElementName::Signatures).height,
        footer: Vec::new(),
    }
}

fn admin_section(record: &RenderableRecord, layout: &LayoutSnapshot) -> SectionBlock {
    let geometry = layout.get(ElementName::AdminNotes);
    let (captured_by, captured_at) = record.admin_capture();
    let mut footer = Vec::new();
    if !captured_by.trim().is_empty() {
        let when = captured_at
            .map(|t| t.format(DATE_TIME_FORMAT).to_string())
            .unwrap_or_else(|| UNSET.to_string());
        footer.push(format!("Captured by: {} on {}", captured_by.trim(), when));
    }
    SectionBlock {
        kind: SectionKind::Admin,
        geometry,
        heading: "Admin Notes".to_string(),
        notes: record.admin_notes().to_string(),
        min_notes_height: geometry.height,
        signatures: Vec::new(),
        signature_height: 0.0,
        footer,
    }
}
