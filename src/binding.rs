//! Data binding – one accessor surface over a real job card or the preview
//! fixture, plus the per-render [`RenderContext`].
//!
//! The composer only ever talks to [`RenderableRecord`], so bound and
//! preview renders run through exactly the same layout code.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::assets::ImageSource;
use crate::record::{JobCategory, JobStatus, Jobcard, LineItem};
use crate::settings::BrandingSettings;
use crate::template::LayoutSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Bound,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureRole {
    Technician,
    Client,
    Manager,
}

impl SignatureRole {
    pub fn label(self) -> &'static str {
        match self {
            SignatureRole::Technician => "Technician",
            SignatureRole::Client => "Client",
            SignatureRole::Manager => "Manager",
        }
    }

    pub fn asset_id(self) -> &'static str {
        match self {
            SignatureRole::Technician => "signature_technician",
            SignatureRole::Client => "signature_client",
            SignatureRole::Manager => "signature_manager",
        }
    }
}

/// Fixed values rendered in preview mode.
pub mod fixture {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::record::{JobCategory, JobStatus, LineItem};

    pub const JOBCARD_NUMBER: &str = "JC-PREVIEW-000000";
    pub const STATUS: JobStatus = JobStatus::Invoiced;
    pub const CATEGORY: JobCategory = JobCategory::CallOut;
    pub const COMPANY_NAME: &str = "Sample Client Ltd";
    pub const COMPANY_EMAIL: &str = "client@example.com";
    pub const TECHNICIAN: &str = "Sample Technician";
    pub const TECH_NOTES: &str =
        "Replaced the faulty switch and verified connectivity on all floor ports.";
    pub const MANAGER_NOTES: &str = "Work checked and approved.";
    pub const ADMIN_NOTES: &str = "Invoice raised.";
    pub const TECH_NAME: &str = "Sample Technician";
    pub const CLIENT_NAME: &str = "Sample Client";
    pub const MANAGER_NAME: &str = "Sample Manager";
    pub const ADMIN_CAPTURE_NAME: &str = "Sample Admin";

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
    }

    pub fn time_start() -> NaiveDateTime {
        at(8, 0)
    }

    pub fn time_stop() -> NaiveDateTime {
        at(12, 30)
    }

    pub fn admin_capture_date() -> NaiveDateTime {
        at(16, 0)
    }

    pub fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("Network switch replacement", "24-port switch", 1, "Reception"),
            LineItem::new("Cable testing", "", 12, "IT Office"),
            LineItem::new("User workstation setup", "Patch leads", 3, "Accounts"),
        ]
    }
}

/// A job card to render: a real record, or the preview fixture.
#[derive(Debug, Clone)]
pub enum RenderableRecord {
    Bound(Box<Jobcard>),
    Dummy,
}

impl From<Jobcard> for RenderableRecord {
    fn from(card: Jobcard) -> Self {
        RenderableRecord::Bound(Box::new(card))
    }
}

impl RenderableRecord {
    pub fn mode(&self) -> RenderMode {
        match self {
            RenderableRecord::Bound(_) => RenderMode::Bound,
            RenderableRecord::Dummy => RenderMode::Preview,
        }
    }

    pub fn jobcard_number(&self) -> &str {
        match self {
            RenderableRecord::Bound(c) => &c.jobcard_number,
            RenderableRecord::Dummy => fixture::JOBCARD_NUMBER,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            RenderableRecord::Bound(c) => c.created_at.date(),
            RenderableRecord::Dummy => fixture::date(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            RenderableRecord::Bound(c) => c.status,
            RenderableRecord::Dummy => fixture::STATUS,
        }
    }

    pub fn category(&self) -> JobCategory {
        match self {
            RenderableRecord::Bound(c) => c.category,
            RenderableRecord::Dummy => fixture::CATEGORY,
        }
    }

    /// Explicit client name entered on the card, if any.
    pub fn client_name(&self) -> Option<&str> {
        match self {
            RenderableRecord::Bound(c) => non_blank(&c.client_name),
            RenderableRecord::Dummy => Some(fixture::CLIENT_NAME),
        }
    }

    pub fn company_name(&self) -> Option<&str> {
        match self {
            RenderableRecord::Bound(c) => c.company.as_ref().and_then(|co| non_blank(&co.name)),
            RenderableRecord::Dummy => Some(fixture::COMPANY_NAME),
        }
    }

    pub fn company_email(&self) -> Option<&str> {
        match self {
            RenderableRecord::Bound(c) => c.company.as_ref().and_then(|co| non_blank(&co.email)),
            RenderableRecord::Dummy => Some(fixture::COMPANY_EMAIL),
        }
    }

    /// Technician display name, falling back to the account identifier.
    pub fn technician_name(&self) -> Option<String> {
        match self {
            RenderableRecord::Bound(c) => c
                .technician
                .as_ref()
                .map(|t| t.display_name())
                .filter(|n| !n.trim().is_empty()),
            RenderableRecord::Dummy => Some(fixture::TECHNICIAN.to_string()),
        }
    }

    pub fn time_start(&self) -> Option<NaiveDateTime> {
        match self {
            RenderableRecord::Bound(c) => c.time_start,
            RenderableRecord::Dummy => Some(fixture::time_start()),
        }
    }

    pub fn time_stop(&self) -> Option<NaiveDateTime> {
        match self {
            RenderableRecord::Bound(c) => c.time_stop,
            RenderableRecord::Dummy => Some(fixture::time_stop()),
        }
    }

    pub fn tech_notes(&self) -> &str {
        match self {
            RenderableRecord::Bound(c) => &c.tech_notes,
            RenderableRecord::Dummy => fixture::TECH_NOTES,
        }
    }

    pub fn manager_notes(&self) -> &str {
        match self {
            RenderableRecord::Bound(c) => &c.manager_notes,
            RenderableRecord::Dummy => fixture::MANAGER_NOTES,
        }
    }

    pub fn admin_notes(&self) -> &str {
        match self {
            RenderableRecord::Bound(c) => &c.admin_notes,
            RenderableRecord::Dummy => fixture::ADMIN_NOTES,
        }
    }

    pub fn admin_capture(&self) -> (&str, Option<NaiveDateTime>) {
        match self {
            RenderableRecord::Bound(c) => (&c.admin_capture_name, c.admin_capture_date),
            RenderableRecord::Dummy => (
                fixture::ADMIN_CAPTURE_NAME,
                Some(fixture::admin_capture_date()),
            ),
        }
    }

    pub fn items(&self) -> Cow<'_, [LineItem]> {
        match self {
            RenderableRecord::Bound(c) => Cow::Borrowed(&c.items),
            RenderableRecord::Dummy => Cow::Owned(fixture::items()),
        }
    }

    /// Name printed under a signature.
    pub fn signer_name(&self, role: SignatureRole) -> &str {
        match (self, role) {
            (RenderableRecord::Bound(c), SignatureRole::Technician) => &c.tech_name,
            (RenderableRecord::Bound(c), SignatureRole::Client) => &c.client_name,
            (RenderableRecord::Bound(c), SignatureRole::Manager) => &c.manager_name,
            (RenderableRecord::Dummy, SignatureRole::Technician) => fixture::TECH_NAME,
            (RenderableRecord::Dummy, SignatureRole::Client) => fixture::CLIENT_NAME,
            (RenderableRecord::Dummy, SignatureRole::Manager) => fixture::MANAGER_NAME,
        }
    }

    /// Preview renders never carry signature images.
    pub fn signature(&self, role: SignatureRole) -> Option<&ImageSource> {
        match (self, role) {
            (RenderableRecord::Bound(c), SignatureRole::Technician) => c.tech_signature.as_ref(),
            (RenderableRecord::Bound(c), SignatureRole::Client) => c.client_signature.as_ref(),
            (RenderableRecord::Bound(c), SignatureRole::Manager) => c.manager_signature.as_ref(),
            (RenderableRecord::Dummy, _) => None,
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

/// Everything one render reads, captured once up front.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub branding: BrandingSettings,
    pub record: RenderableRecord,
    pub layout: LayoutSnapshot,
}

impl RenderContext {
    pub fn new(branding: BrandingSettings, record: RenderableRecord, layout: LayoutSnapshot) -> Self {
        Self {
            branding,
            record,
            layout,
        }
    }

    pub fn bound(branding: BrandingSettings, card: Jobcard, layout: LayoutSnapshot) -> Self {
        Self::new(branding, card.into(), layout)
    }

    pub fn preview(branding: BrandingSettings, layout: LayoutSnapshot) -> Self {
        Self::new(branding, RenderableRecord::Dummy, layout)
    }
}
