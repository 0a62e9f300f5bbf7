//! Job card records as supplied by the record collaborator.
//!
//! The renderer only reads these; validation and persistence happen
//! upstream.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::assets::ImageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Invoiced,
}

impl JobStatus {
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "Draft",
            JobStatus::Submitted => "Submitted",
            JobStatus::Approved => "Approved",
            JobStatus::Invoiced => "Invoiced",
        }
    }

    /// Manager notes and signature are printed once a manager has signed off.
    pub fn includes_manager_section(self) -> bool {
        matches!(self, JobStatus::Approved | JobStatus::Invoiced)
    }

    pub fn includes_admin_section(self) -> bool {
        self == JobStatus::Invoiced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobCategory {
    Internal,
    #[default]
    CallOut,
    Backups,
    Remote,
}

impl JobCategory {
    pub fn label(self) -> &'static str {
        match self {
            JobCategory::Internal => "Internal",
            JobCategory::CallOut => "Call Out",
            JobCategory::Backups => "Backups",
            JobCategory::Remote => "Remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Technician {
    /// Account identifier.
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Technician {
    /// "First Last", or `None` when both parts are blank.
    pub fn full_name(&self) -> Option<String> {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_string())
    }

    pub fn display_name(&self) -> String {
        self.full_name().unwrap_or_else(|| self.username.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub parts_used: String,
    #[serde(default = "default_qty")]
    pub qty: i64,
    #[serde(default)]
    pub person_helped: String,
}

fn default_qty() -> i64 {
    1
}

impl LineItem {
    pub fn new(description: &str, parts_used: &str, qty: i64, person_helped: &str) -> Self {
        Self {
            description: description.to_string(),
            parts_used: parts_used.to_string(),
            qty,
            person_helped: person_helped.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jobcard {
    pub jobcard_number: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub category: JobCategory,
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub technician: Option<Technician>,
    #[serde(default)]
    pub time_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub time_stop: Option<NaiveDateTime>,

    #[serde(default)]
    pub tech_notes: String,
    #[serde(default)]
    pub manager_notes: String,
    #[serde(default)]
    pub admin_notes: String,

    #[serde(default)]
    pub tech_name: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default)]
    pub admin_capture_name: String,
    #[serde(default)]
    pub admin_capture_date: Option<NaiveDateTime>,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub tech_signature: Option<ImageSource>,
    #[serde(default)]
    pub client_signature: Option<ImageSource>,
    #[serde(default)]
    pub manager_signature: Option<ImageSource>,
}

impl Jobcard {
    /// A fresh draft with a generated number, created now.
    pub fn new(company: Option<Company>, technician: Option<Technician>) -> Self {
        let now = Local::now().naive_local();
        Self {
            jobcard_number: generate_jobcard_number(now.date()),
            created_at: now,
            status: JobStatus::default(),
            category: JobCategory::default(),
            company,
            technician,
            time_start: None,
            time_stop: None,
            tech_notes: String::new(),
            manager_notes: String::new(),
            admin_notes: String::new(),
            tech_name: String::new(),
            client_name: String::new(),
            manager_name: String::new(),
            admin_capture_name: String::new(),
            admin_capture_date: None,
            items: Vec::new(),
            tech_signature: None,
            client_signature: None,
            manager_signature: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// `JC-YYYYMMDD-XXXXXX`, six upper-case hex digits from a random UUID.
pub fn generate_jobcard_number(date: NaiveDate) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("JC-{}-{}", date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobcard_number_format() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 27).unwrap();
        let n = generate_jobcard_number(date);
        assert!(n.starts_with("JC-20231027-"));
        let suffix = &n["JC-20231027-".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn status_gates_sections() {
        assert!(!JobStatus::Draft.includes_manager_section());
        assert!(!JobStatus::Submitted.includes_manager_section());
        assert!(JobStatus::Approved.includes_manager_section());
        assert!(!JobStatus::Approved.includes_admin_section());
        assert!(JobStatus::Invoiced.includes_manager_section());
        assert!(JobStatus::Invoiced.includes_admin_section());
    }

    #[test]
    fn technician_name_falls_back_to_username() {
        let mut tech = Technician {
            username: "jdoe".into(),
            ..Technician::default()
        };
        assert_eq!(tech.display_name(), "jdoe");
        tech.first_name = "John".into();
        tech.last_name = "Doe".into();
        assert_eq!(tech.display_name(), "John Doe");
    }

    #[test]
    fn parses_minimal_json_record() {
        let json = r#"{
            "jobcard_number": "JC-20231027-ABC123",
            "created_at": "2023-10-27T08:30:00",
            "status": "CALL_OUT_IS_NOT_A_STATUS"
        }"#;
        assert!(Jobcard::from_json(json).is_err());

        let json = r#"{
            "jobcard_number": "JC-20231027-ABC123",
            "created_at": "2023-10-27T08:30:00",
            "status": "SUBMITTED",
            "category": "CALL_OUT",
            "items": [{"description": "Diagnosed network issue", "qty": 10}]
        }"#;
        let card = Jobcard::from_json(json).unwrap();
        assert_eq!(card.status, JobStatus::Submitted);
        assert_eq!(card.category.label(), "Call Out");
        assert_eq!(card.items[0].qty, 10);
        assert!(card.time_stop.is_none());
    }
}
