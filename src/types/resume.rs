// src/types/resume.rs
//! The resume document edited by the wizard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Soft cap applied to the summary text.
pub const SUMMARY_MAX_CHARS: usize = 500;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 4;
pub const DEFAULT_LEVEL: u8 = 2;

// ===== Document =====

/// Every section is always present; absent input deserializes to the empty default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub contacts: Contacts,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<LeveledItem>,
    pub languages: Vec<LeveledItem>,
    pub certifications: Vec<Certification>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
    pub first_name: String,
    pub last_name: String,
    pub desired_job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub post_code: String,
    pub leetcode_url: String,
    pub github_url: String,
    pub linkedin_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub role: String,
    pub technologies: Vec<String>,
    pub duration: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub start_year: String,
    pub end_year: String,
    pub description: String,
}

/// A skill or a spoken language with a 1-4 proficiency level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeveledItem {
    pub name: String,
    pub level: u8,
}

impl Default for LeveledItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: DEFAULT_LEVEL,
        }
    }
}

impl LeveledItem {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level: clamp_level(i64::from(level)),
        }
    }
}

pub fn clamp_level(level: i64) -> u8 {
    level.clamp(i64::from(MIN_LEVEL), i64::from(MAX_LEVEL)) as u8
}

/// Certifications arrive either as a bare name or as a full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    Name(String),
    Detailed(CertificationDetails),
}

impl Default for Certification {
    fn default() -> Self {
        Certification::Detailed(CertificationDetails::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationDetails {
    pub name: String,
    pub organization: String,
    pub completion_date: String,
    pub credential_id: String,
    pub credential_url: String,
}

impl Certification {
    /// Structured view used by the certificates step.
    pub fn normalized(&self) -> CertificationDetails {
        match self {
            Certification::Name(name) => CertificationDetails {
                name: name.clone(),
                ..Default::default()
            },
            Certification::Detailed(details) => details.clone(),
        }
    }
}

// ===== Sections and updates =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Contacts,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Summary,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Contacts => "contacts",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Languages => "languages",
            Section::Certifications => "certifications",
            Section::Summary => "summary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "contacts" => Some(Section::Contacts),
            "experience" => Some(Section::Experience),
            "education" => Some(Section::Education),
            "skills" => Some(Section::Skills),
            "languages" => Some(Section::Languages),
            "certifications" | "certificates" => Some(Section::Certifications),
            "summary" => Some(Section::Summary),
            _ => None,
        }
    }

    pub fn is_list(self) -> bool {
        !matches!(self, Section::Contacts | Section::Summary)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Partial contacts record; only `Some` fields overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub desired_job_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub post_code: Option<String>,
    pub leetcode_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl Contacts {
    pub fn merged(&self, patch: ContactsPatch) -> Contacts {
        Contacts {
            first_name: patch.first_name.unwrap_or_else(|| self.first_name.clone()),
            last_name: patch.last_name.unwrap_or_else(|| self.last_name.clone()),
            desired_job_title: patch
                .desired_job_title
                .unwrap_or_else(|| self.desired_job_title.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            location: patch.location.unwrap_or_else(|| self.location.clone()),
            country: patch.country.unwrap_or_else(|| self.country.clone()),
            city: patch.city.unwrap_or_else(|| self.city.clone()),
            address: patch.address.unwrap_or_else(|| self.address.clone()),
            post_code: patch.post_code.unwrap_or_else(|| self.post_code.clone()),
            leetcode_url: patch.leetcode_url.unwrap_or_else(|| self.leetcode_url.clone()),
            github_url: patch.github_url.unwrap_or_else(|| self.github_url.clone()),
            linkedin_url: patch.linkedin_url.unwrap_or_else(|| self.linkedin_url.clone()),
        }
    }
}

/// One write against the document: contacts merge, everything else replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionUpdate {
    Contacts(ContactsPatch),
    Experience(Vec<ExperienceEntry>),
    Education(Vec<EducationEntry>),
    Skills(Vec<LeveledItem>),
    Languages(Vec<LeveledItem>),
    Certifications(Vec<Certification>),
    Summary(String),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::Contacts(_) => Section::Contacts,
            SectionUpdate::Experience(_) => Section::Experience,
            SectionUpdate::Education(_) => Section::Education,
            SectionUpdate::Skills(_) => Section::Skills,
            SectionUpdate::Languages(_) => Section::Languages,
            SectionUpdate::Certifications(_) => Section::Certifications,
            SectionUpdate::Summary(_) => Section::Summary,
        }
    }
}

impl ResumeDocument {
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Contacts(patch) => self.contacts = self.contacts.merged(patch),
            SectionUpdate::Experience(entries) => self.experience = entries,
            SectionUpdate::Education(entries) => self.education = entries,
            SectionUpdate::Skills(items) => self.skills = items,
            SectionUpdate::Languages(items) => self.languages = items,
            SectionUpdate::Certifications(items) => self.certifications = items,
            SectionUpdate::Summary(text) => self.summary = text,
        }
    }

    pub fn section_len(&self, section: Section) -> Option<usize> {
        match section {
            Section::Experience => Some(self.experience.len()),
            Section::Education => Some(self.education.len()),
            Section::Skills => Some(self.skills.len()),
            Section::Languages => Some(self.languages.len()),
            Section::Certifications => Some(self.certifications.len()),
            Section::Contacts | Section::Summary => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_merge_keeps_siblings() {
        let mut doc = ResumeDocument::default();
        doc.apply(SectionUpdate::Contacts(ContactsPatch {
            first_name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        }));
        doc.apply(SectionUpdate::Contacts(ContactsPatch {
            email: Some("ada@lovelace.dev".to_string()),
            ..Default::default()
        }));

        assert_eq!(doc.contacts.first_name, "Ada");
        assert_eq!(doc.contacts.email, "ada@lovelace.dev");
        assert_eq!(doc.contacts.phone, "");
    }

    #[test]
    fn test_list_sections_replace_wholesale() {
        let mut doc = ResumeDocument::default();
        doc.apply(SectionUpdate::Skills(vec![
            LeveledItem::new("Rust", 4),
            LeveledItem::new("SQL", 3),
        ]));
        let replacement = vec![LeveledItem::new("Go", 1)];
        doc.apply(SectionUpdate::Skills(replacement.clone()));

        assert_eq!(doc.skills, replacement);
    }

    #[test]
    fn test_document_defaults_missing_sections() {
        let doc: ResumeDocument =
            serde_json::from_str(r#"{"summary": "Engineer"}"#).expect("valid json");
        assert_eq!(doc.summary, "Engineer");
        assert!(doc.experience.is_empty());
        assert!(doc.certifications.is_empty());
        assert_eq!(doc.contacts, Contacts::default());
    }

    #[test]
    fn test_certification_shapes_normalize() {
        let certs: Vec<Certification> = serde_json::from_str(
            r#"["AWS SAA", {"name": "CKA", "organization": "CNCF"}]"#,
        )
        .expect("valid json");

        assert_eq!(certs[0].normalized().name, "AWS SAA");
        assert_eq!(certs[0].normalized().organization, "");
        assert_eq!(certs[1].normalized().organization, "CNCF");
    }

    #[test]
    fn test_leveled_item_clamps() {
        assert_eq!(LeveledItem::new("x", 9).level, MAX_LEVEL);
        assert_eq!(LeveledItem::new("x", 0).level, MIN_LEVEL);
        assert_eq!(LeveledItem::default().level, DEFAULT_LEVEL);
    }
}
