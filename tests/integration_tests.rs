//! Integration tests for the job card pipeline.
//!
//! These tests validate:
//! - Template layout seeding and persistence
//! - PDF output exists and has valid format
//! - Long item lists paginate with every row exactly once, in order
//! - Conditional sections follow the job status
//! - Preview and bound renders share one layout path

use jobcard_forge::assets::ImageSource;
use jobcard_forge::binding::{fixture, RenderContext, SignatureRole};
use jobcard_forge::layout_config::{BoxTag, DocumentLayout, LayoutBox, SectionKind};
use jobcard_forge::pipeline::{compute_layout, render_jobcard, render_preview, RenderConfig};
use jobcard_forge::record::{Company, JobStatus, Jobcard, LineItem, Technician};
use jobcard_forge::settings::{BrandingSettings, SettingsRepository};
use jobcard_forge::template::{ElementEdit, ElementName, LayoutSnapshot, TemplateLayoutStore};
use jobcard_forge::StoreError;
use sha2::{Digest, Sha256};

// =====================================================================
// Helpers
// =====================================================================

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([20, 40, 160]));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn acme_card(status: JobStatus) -> Jobcard {
    let mut card = Jobcard::new(
        Some(Company {
            name: "Acme".into(),
            ..Company::default()
        }),
        None,
    );
    card.status = status;
    card.items = vec![LineItem::new("Printer jam", "", 1, "Front desk")];
    card
}

fn layout_of(card: Jobcard) -> DocumentLayout {
    let ctx = RenderContext::bound(BrandingSettings::default(), card, LayoutSnapshot::defaults());
    compute_layout(&ctx, &RenderConfig::default()).unwrap()
}

fn find_box(layout: &DocumentLayout, tag: BoxTag) -> Option<&LayoutBox> {
    layout
        .pages
        .iter()
        .flat_map(|p| p.boxes.iter())
        .find(|b| b.tag == tag)
}

fn section(kind: SectionKind) -> BoxTag {
    BoxTag::Section { section: kind }
}

/// A bound record carrying exactly the preview fixture's values.
fn fixture_equivalent_card() -> Jobcard {
    let mut card = Jobcard::new(
        Some(Company {
            name: fixture::COMPANY_NAME.into(),
            email: fixture::COMPANY_EMAIL.into(),
            ..Company::default()
        }),
        Some(Technician {
            username: fixture::TECHNICIAN.into(),
            ..Technician::default()
        }),
    );
    card.jobcard_number = fixture::JOBCARD_NUMBER.into();
    card.created_at = fixture::time_start();
    card.status = fixture::STATUS;
    card.category = fixture::CATEGORY;
    card.time_start = Some(fixture::time_start());
    card.time_stop = Some(fixture::time_stop());
    card.tech_notes = fixture::TECH_NOTES.into();
    card.manager_notes = fixture::MANAGER_NOTES.into();
    card.admin_notes = fixture::ADMIN_NOTES.into();
    card.tech_name = fixture::TECH_NAME.into();
    card.client_name = fixture::CLIENT_NAME.into();
    card.manager_name = fixture::MANAGER_NAME.into();
    card.admin_capture_name = fixture::ADMIN_CAPTURE_NAME.into();
    card.admin_capture_date = Some(fixture::admin_capture_date());
    card.items = fixture::items();
    card
}

// =====================================================================
// Template layout store
// =====================================================================

#[test]
fn ensure_defaults_seeds_every_element_once() {
    let mut store = TemplateLayoutStore::in_memory();
    assert!(store.ensure_defaults().unwrap());
    assert_eq!(store.len(), ElementName::ALL.len());
    for name in ElementName::ALL {
        let g = store.get(name.as_str()).unwrap();
        assert!(g.width > 0.0 && g.height > 0.0, "{name:?} has empty geometry");
    }

    store.upsert("company_info", 200.0, 40.0, 355.0, 60.0).unwrap();
    assert!(!store.ensure_defaults().unwrap());
    assert_eq!(store.get("company_info").unwrap().x, 200.0);
}

#[test]
fn layout_store_persists_edits_and_keeps_font_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template_layout.json");

    let mut store = TemplateLayoutStore::open(&path).unwrap();
    assert!(store.ensure_defaults().unwrap());
    store.set_font_size("client_details", 11.0).unwrap();
    let applied = store
        .apply_edits(&[ElementEdit {
            name: "client_details".into(),
            x: 320.0,
            y: 120.0,
            width: 235.0,
            height: 70.0,
        }])
        .unwrap();
    assert_eq!(applied, 1);

    let reopened = TemplateLayoutStore::open(&path).unwrap();
    assert_eq!(reopened.len(), ElementName::ALL.len());
    let g = reopened.get("client_details").unwrap();
    assert_eq!((g.x, g.y, g.width, g.height), (320.0, 120.0, 235.0, 70.0));
    assert_eq!(g.font_size, 11.0);
}

#[test]
fn edited_geometry_moves_the_rendered_block() {
    let mut store = TemplateLayoutStore::in_memory();
    store.ensure_defaults().unwrap();
    store.upsert("client_details", 330.0, 115.0, 225.0, 70.0).unwrap();

    let ctx = RenderContext::preview(BrandingSettings::default(), store.snapshot());
    let layout = compute_layout(&ctx, &RenderConfig::default()).unwrap();
    let client = find_box(
        &layout,
        BoxTag::Fixed {
            element: ElementName::ClientDetails,
        },
    )
    .unwrap();
    assert_eq!(client.x, 330.0);
    assert_eq!(client.width, 225.0);
}

#[test]
fn settings_are_a_singleton() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut repo = SettingsRepository::open(&path).unwrap();
    repo.create(BrandingSettings {
        company_name: "Forge IT".into(),
        ..BrandingSettings::default()
    })
    .unwrap();
    let err = repo.create(BrandingSettings::default()).unwrap_err();
    assert!(matches!(err, StoreError::SettingsAlreadyExist));

    let reopened = SettingsRepository::open(&path).unwrap();
    assert_eq!(reopened.snapshot().company_name, "Forge IT");
}

// =====================================================================
// Rendering
// =====================================================================

#[test]
fn acme_submitted_scenario_renders_one_page() {
    let mut card = Jobcard::new(
        Some(Company {
            name: "Acme Corp".into(),
            email: "ops@acme.example".into(),
            ..Company::default()
        }),
        Some(Technician {
            username: "jdoe".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
        }),
    );
    card.status = JobStatus::Submitted;
    card.time_start = chrono::NaiveDate::from_ymd_opt(2023, 10, 27)
        .and_then(|d| d.and_hms_opt(9, 0, 0));
    card.items = vec![LineItem::new("Diagnosed network issue", "", 10, "Jane Smith")];

    let doc = render_jobcard(
        card,
        BrandingSettings::default(),
        LayoutSnapshot::defaults(),
        &RenderConfig::default(),
    )
    .unwrap();
    assert_valid_pdf(&doc.bytes);
    assert_eq!(doc.page_count(), 1);

    let layout = &doc.layout;
    let text = layout.page_text(0);
    assert!(text.iter().any(|l| l == "Client: Acme Corp"), "{text:?}");
    assert!(text.iter().any(|l| l == "Email: ops@acme.example"), "{text:?}");
    assert!(text.iter().any(|l| l == "Technician: John Doe"), "{text:?}");
    assert!(text.iter().any(|l| l == "Start: 2023-10-27 09:00"), "{text:?}");
    assert!(text.iter().any(|l| l == "Stop: -"), "{text:?}");
    assert!(text.iter().any(|l| l == "Diagnosed network issue"), "{text:?}");
    assert!(text.iter().any(|l| l == "Page 1 of 1"));
    assert_eq!(layout.table_rows(), vec![(0, 0)]);

    assert!(layout.contains(section(SectionKind::Technician)));
    assert!(!layout.contains(section(SectionKind::Manager)));
    assert!(!layout.contains(section(SectionKind::Admin)));

    let sig = find_box(
        layout,
        BoxTag::Signature {
            section: SectionKind::Technician,
            role: SignatureRole::Technician,
        },
    )
    .unwrap();
    assert!(sig.image.is_none());
    assert!(sig.border.is_some(), "missing signature should draw a placeholder");
}

#[test]
fn missing_client_and_technician_fall_back() {
    let mut card = Jobcard::new(None, None);
    card.items = vec![LineItem::new("Check", "", 1, "")];
    let text = layout_of(card).page_text(0);
    assert!(text.iter().any(|l| l == "Client: N/A"), "{text:?}");
    assert!(text.iter().any(|l| l == "Technician: N/A"), "{text:?}");
    assert!(text.iter().any(|l| l == "Start: -"), "{text:?}");
}

#[test]
fn sections_follow_status() {
    let cases = [
        (JobStatus::Draft, false, false),
        (JobStatus::Submitted, false, false),
        (JobStatus::Approved, true, false),
        (JobStatus::Invoiced, true, true),
    ];
    for (status, manager, admin) in cases {
        let layout = layout_of(acme_card(status));
        assert_eq!(layout.contains(section(SectionKind::Manager)), manager, "{status:?}");
        assert_eq!(layout.contains(section(SectionKind::Admin)), admin, "{status:?}");
    }
}

#[test]
fn long_item_list_paginates_every_row_once_in_order() {
    let mut card = acme_card(JobStatus::Invoiced);
    card.items = (0..90)
        .map(|i| LineItem::new(&format!("Task {i}"), "Cable", 2, "Ops"))
        .collect();
    let doc = render_jobcard(
        card,
        BrandingSettings::default(),
        LayoutSnapshot::defaults(),
        &RenderConfig::default(),
    )
    .unwrap();
    assert_valid_pdf(&doc.bytes);
    assert!(doc.page_count() > 1);

    let layout = &doc.layout;
    let rows = layout.table_rows();
    let indices: Vec<usize> = rows.iter().map(|(_, i)| *i).collect();
    assert_eq!(indices, (0..90).collect::<Vec<_>>());

    // Header repeats on every page that carries rows.
    let mut row_pages: Vec<usize> = rows.iter().map(|(p, _)| *p).collect();
    row_pages.dedup();
    assert_eq!(layout.pages_with(BoxTag::TableHeader), row_pages);

    // Sections come after the table, in order.
    let seq = layout.block_sequence();
    let pos = |tag: BoxTag| seq.iter().position(|t| *t == tag).unwrap();
    let last_row = seq
        .iter()
        .rposition(|t| matches!(t, BoxTag::TableRow { .. }))
        .unwrap();
    assert!(last_row < pos(section(SectionKind::Technician)));
    assert!(pos(section(SectionKind::Technician)) < pos(section(SectionKind::Manager)));
    assert!(pos(section(SectionKind::Manager)) < pos(section(SectionKind::Admin)));

    let config = RenderConfig::default();
    for page in &layout.pages {
        assert!(page.boxes.iter().any(|b| b.tag == BoxTag::PageBorder));
        for b in page.boxes.iter().filter(|b| !b.tag.is_background()) {
            assert!(b.bottom() <= config.content_bottom() + 0.01, "{:?} overflows", b.tag);
        }
    }
}

#[test]
fn unreadable_signature_still_renders() {
    let mut card = acme_card(JobStatus::Approved);
    card.tech_signature = Some(ImageSource::from(
        "data:image/png;base64,@@not-base64@@".to_string(),
    ));
    card.manager_signature = Some(ImageSource::Bytes(vec![0x89, b'P', b'N', b'G']));
    let doc = render_jobcard(
        card,
        BrandingSettings::default(),
        LayoutSnapshot::defaults(),
        &RenderConfig::default(),
    )
    .unwrap();
    assert_valid_pdf(&doc.bytes);

    let sig = find_box(
        &doc.layout,
        BoxTag::Signature {
            section: SectionKind::Manager,
            role: SignatureRole::Manager,
        },
    )
    .unwrap();
    assert!(sig.image.is_none());
}

#[test]
fn images_are_embedded_for_logo_watermark_and_signature() {
    let branding = BrandingSettings {
        company_name: "Forge IT".into(),
        logo: Some(ImageSource::Bytes(png_bytes(200, 100))),
        ..BrandingSettings::default()
    };
    let mut card = acme_card(JobStatus::Draft);
    card.client_signature = Some(ImageSource::Bytes(png_bytes(120, 40)));
    let doc = render_jobcard(card, branding, LayoutSnapshot::defaults(), &RenderConfig::default())
        .unwrap();
    assert_valid_pdf(&doc.bytes);
    assert!(
        doc.bytes.windows(7).any(|w| w == b"/ca 0.1"),
        "watermark should be drawn through a 10% alpha graphics state"
    );

    let layout = &doc.layout;
    assert!(find_box(layout, BoxTag::Watermark).is_some());
    let logo = find_box(
        layout,
        BoxTag::Fixed {
            element: ElementName::HeaderLogo,
        },
    )
    .unwrap();
    assert!(logo.image.is_some());
    let sig = find_box(
        layout,
        BoxTag::Signature {
            section: SectionKind::Technician,
            role: SignatureRole::Client,
        },
    )
    .unwrap();
    assert!(sig.image.is_some());
}

// =====================================================================
// Preview / bound parity
// =====================================================================

#[test]
fn preview_matches_equivalent_bound_record() {
    let config = RenderConfig::default();
    let preview = render_preview(BrandingSettings::default(), LayoutSnapshot::defaults(), &config)
        .unwrap();
    let bound = render_jobcard(
        fixture_equivalent_card(),
        BrandingSettings::default(),
        LayoutSnapshot::defaults(),
        &config,
    )
    .unwrap();
    assert_valid_pdf(&preview.bytes);
    assert_eq!(preview.page_count(), bound.page_count());
    assert_eq!(preview.layout.block_sequence(), bound.layout.block_sequence());
    assert_eq!(preview.layout.to_json(), bound.layout.to_json());
}

#[test]
fn layout_is_deterministic() {
    let card = acme_card(JobStatus::Invoiced);
    let digest = |layout: &DocumentLayout| {
        let mut h = Sha256::new();
        h.update(layout.to_json().as_bytes());
        h.finalize()
    };
    let a = layout_of(card.clone());
    let b = layout_of(card);
    assert_eq!(digest(&a), digest(&b));

    let restored = DocumentLayout::from_json(&a.to_json()).unwrap();
    assert_eq!(restored.page_count(), a.page_count());
    assert_eq!(restored.block_sequence(), a.block_sequence());
}
