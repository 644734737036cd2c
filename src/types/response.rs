// src/types/response.rs
//! Collaborator request and response bodies.
//!
//! The parser's output is loosely shaped: sections may be missing or `null`,
//! experience may come in the parser's raw field names, skills may be grouped
//! by category. Everything funnels through [`ParsedResumeData::into_document`]
//! so the store only ever holds a fully defined [`ResumeDocument`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::resume::{
    clamp_level, Certification, CertificationDetails, Contacts, EducationEntry, ExperienceEntry,
    LeveledItem, ResumeDocument, DEFAULT_LEVEL, SUMMARY_MAX_CHARS,
};
use crate::utils::truncate_chars;

// ===== Service Response Types =====

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedResumeResponse {
    pub resume_id: Uuid,
    pub template_id: String,
    #[serde(default)]
    pub data: Option<ParsedResumeData>,
}

/// `/change-template` echoes the whole session; only the bound template matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeTemplateResponse {
    pub template_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateSummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

// ===== Service Request Types =====

#[derive(Debug, Serialize)]
pub struct ChangeTemplateRequest<'a> {
    pub resume_id: Uuid,
    pub template_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateSummaryRequest<'a> {
    pub job_description: &'a str,
    pub resume_data: ResumePayload,
}

// ===== Parsed payload =====

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParsedResumeData {
    pub contacts: Option<WireContacts>,
    pub experience: Option<Vec<WireExperience>>,
    pub education: Option<Vec<WireEducation>>,
    pub skills: Option<WireSkills>,
    pub languages: Option<Vec<WireLeveled>>,
    pub certifications: Option<Vec<WireCertification>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireContacts {
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

/// Accepts both the document's shape and the parser's raw one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireExperience {
    pub title: Option<String>,
    pub role: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub duration: Option<String>,
    pub description: Option<WireText>,
    pub job_title: Option<String>,
    pub employer: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireText {
    Lines(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireEducation {
    #[serde(alias = "school_name")]
    pub institution: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
    #[serde(alias = "start_date")]
    pub start_year: Option<String>,
    #[serde(alias = "end_date")]
    pub end_year: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireSkills {
    List(Vec<WireLeveled>),
    Grouped(WireSkillGroups),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireSkillGroups {
    pub technical: Option<Vec<String>>,
    pub soft: Option<Vec<String>>,
    pub tools: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireLeveled {
    Name(String),
    Item {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireCertification {
    Name(String),
    Detailed(WireCertificationDetails),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireCertificationDetails {
    #[serde(alias = "certificate_name")]
    pub name: Option<String>,
    #[serde(alias = "issuing_organization")]
    pub organization: Option<String>,
    #[serde(alias = "completionDate", alias = "date_of_completion")]
    pub completion_date: Option<String>,
    #[serde(alias = "credentialId")]
    pub credential_id: Option<String>,
    #[serde(alias = "credentialUrl")]
    pub credential_url: Option<String>,
}

impl ParsedResumeData {
    pub fn into_document(self) -> ResumeDocument {
        let (skills, grouped_languages) = match self.skills {
            Some(WireSkills::List(items)) => (leveled_items(items), Vec::new()),
            Some(WireSkills::Grouped(groups)) => {
                let skills = [groups.technical, groups.soft, groups.tools]
                    .into_iter()
                    .flatten()
                    .flatten()
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| LeveledItem::new(name.trim(), DEFAULT_LEVEL))
                    .collect();
                let languages = groups
                    .languages
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| LeveledItem::new(name.trim(), DEFAULT_LEVEL))
                    .collect();
                (skills, languages)
            }
            None => (Vec::new(), Vec::new()),
        };

        let languages = match self.languages {
            Some(items) => leveled_items(items),
            None => grouped_languages,
        };

        ResumeDocument {
            contacts: self.contacts.map(WireContacts::into_contacts).unwrap_or_default(),
            experience: self
                .experience
                .unwrap_or_default()
                .into_iter()
                .map(WireExperience::into_entry)
                .collect(),
            education: self
                .education
                .unwrap_or_default()
                .into_iter()
                .map(WireEducation::into_entry)
                .collect(),
            skills,
            languages,
            certifications: self
                .certifications
                .unwrap_or_default()
                .into_iter()
                .map(WireCertification::into_certification)
                .collect(),
            summary: truncate_chars(self.summary.unwrap_or_default().trim(), SUMMARY_MAX_CHARS),
        }
    }
}

impl WireContacts {
    fn into_contacts(self) -> Contacts {
        Contacts {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            desired_job_title: self.desired_job_title.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            post_code: self.post_code.unwrap_or_default(),
            leetcode_url: self.leetcode_url.unwrap_or_default(),
            github_url: self.github_url.unwrap_or_default(),
            linkedin_url: self.linkedin_url.unwrap_or_default(),
        }
    }
}

impl WireExperience {
    fn into_entry(self) -> ExperienceEntry {
        let duration = self
            .duration
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format_duration(self.start_date.as_deref(), self.end_date.as_deref()));

        let description = match self.description {
            Some(WireText::Lines(lines)) => lines
                .iter()
                .flat_map(|line| description_lines(line))
                .collect(),
            Some(WireText::Text(text)) => description_lines(&text),
            None => Vec::new(),
        };

        ExperienceEntry {
            title: self.title.or(self.employer).unwrap_or_default(),
            role: self.role.or(self.job_title).unwrap_or_default(),
            technologies: self
                .technologies
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            duration,
            description,
        }
    }
}

impl WireEducation {
    fn into_entry(self) -> EducationEntry {
        EducationEntry {
            institution: self.institution.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            degree: self.degree.unwrap_or_default(),
            start_year: self.start_year.unwrap_or_default(),
            end_year: self.end_year.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

impl WireCertification {
    fn into_certification(self) -> Certification {
        match self {
            WireCertification::Name(name) => Certification::Name(name),
            WireCertification::Detailed(details) => {
                Certification::Detailed(CertificationDetails {
                    name: details.name.unwrap_or_default(),
                    organization: details.organization.unwrap_or_default(),
                    completion_date: details.completion_date.unwrap_or_default(),
                    credential_id: details.credential_id.unwrap_or_default(),
                    credential_url: details.credential_url.unwrap_or_default(),
                })
            }
        }
    }
}

fn leveled_items(items: Vec<WireLeveled>) -> Vec<LeveledItem> {
    items
        .into_iter()
        .map(|item| match item {
            WireLeveled::Name(name) => LeveledItem::new(name, DEFAULT_LEVEL),
            WireLeveled::Item { name, level } => LeveledItem {
                name: name.unwrap_or_default(),
                level: level.as_ref().map_or(DEFAULT_LEVEL, level_from_value),
            },
        })
        .collect()
}

fn level_from_value(value: &serde_json::Value) -> u8 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map_or(DEFAULT_LEVEL, clamp_level),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_or(DEFAULT_LEVEL, clamp_level),
        _ => DEFAULT_LEVEL,
    }
}

const DURATION_SEPARATOR: &str = " – ";
const PRESENT: &str = "Present";

/// "start – end", "start – Present" when the end is unknown.
pub fn format_duration(start: Option<&str>, end: Option<&str>) -> String {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => format!("{}{}{}", start, DURATION_SEPARATOR, end),
        (Some(start), None) => format!("{}{}{}", start, DURATION_SEPARATOR, PRESENT),
        (None, Some(end)) => end.to_string(),
        (None, None) => String::new(),
    }
}

/// Split free text into bullet lines, dropping bullet markers and blanks.
/// `•` and `·` are always markers; `-`, `*` and `–` only when followed by
/// whitespace, so "-5% cost" keeps its sign.
pub fn description_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_bullet(line.trim()).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let mut chars = line.chars();
    match chars.next() {
        Some('•' | '·') => chars.as_str(),
        Some('-' | '*' | '–') if chars.as_str().starts_with(char::is_whitespace) => {
            chars.as_str()
        }
        _ => line,
    }
}

// ===== Outgoing payload =====

/// The document rendered in the collaborator's own field names, used as
/// `resume_data` for summary generation.
#[derive(Debug, Clone, Serialize)]
pub struct ResumePayload {
    pub contacts: Contacts,
    pub experience: Vec<PayloadExperience>,
    pub education: Vec<PayloadEducation>,
    pub skills: PayloadSkills,
    pub certifications: Vec<PayloadCertification>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadExperience {
    pub job_title: String,
    pub employer: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadEducation {
    pub school_name: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadSkills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub tools: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayloadCertification {
    pub certificate_name: String,
    pub issuing_organization: String,
    pub date_of_completion: String,
    pub credential_id: String,
    pub credential_url: String,
}

impl From<&ResumeDocument> for ResumePayload {
    fn from(doc: &ResumeDocument) -> Self {
        Self {
            contacts: doc.contacts.clone(),
            experience: doc
                .experience
                .iter()
                .map(|exp| {
                    let (start_date, end_date) = split_duration(&exp.duration);
                    PayloadExperience {
                        job_title: exp.role.clone(),
                        employer: exp.title.clone(),
                        start_date,
                        end_date,
                        description: exp.description.join("\n"),
                    }
                })
                .collect(),
            education: doc
                .education
                .iter()
                .map(|edu| PayloadEducation {
                    school_name: edu.institution.clone(),
                    degree: edu.degree.clone(),
                    location: edu.location.clone(),
                    start_date: edu.start_year.clone(),
                    end_date: edu.end_year.clone(),
                    description: edu.description.clone(),
                })
                .collect(),
            skills: PayloadSkills {
                technical: doc.skills.iter().map(|s| s.name.clone()).collect(),
                soft: Vec::new(),
                tools: Vec::new(),
                languages: doc.languages.iter().map(|l| l.name.clone()).collect(),
            },
            certifications: doc
                .certifications
                .iter()
                .map(|cert| {
                    let details = cert.normalized();
                    PayloadCertification {
                        certificate_name: details.name,
                        issuing_organization: details.organization,
                        date_of_completion: details.completion_date,
                        credential_id: details.credential_id,
                        credential_url: details.credential_url,
                    }
                })
                .collect(),
            summary: doc.summary.clone(),
        }
    }
}

/// Inverse of [`format_duration`]; a typed " - " is accepted too and
/// "Present" becomes an empty end date.
fn split_duration(duration: &str) -> (String, String) {
    let parts = duration
        .split_once(DURATION_SEPARATOR)
        .or_else(|| duration.split_once(" - "));
    match parts {
        Some((start, end)) => {
            let end = end.trim();
            let end = if end.eq_ignore_ascii_case(PRESENT) { "" } else { end };
            (start.trim().to_string(), end.to_string())
        }
        None => (duration.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ResumeDocument {
        serde_json::from_str::<ParsedResumeData>(json)
            .expect("valid payload")
            .into_document()
    }

    #[test]
    fn test_missing_and_null_sections_default() {
        let doc = parse(r#"{"contacts": null, "experience": null, "summary": null}"#);
        assert_eq!(doc, ResumeDocument::default());
    }

    #[test]
    fn test_raw_parser_experience_is_mapped() {
        let doc = parse(
            r#"{"experience": [{
                "job_title": "Backend Engineer",
                "employer": "Acme",
                "start_date": "2019",
                "end_date": null,
                "description": "• Built billing\n\n- Owned on-call"
            }]}"#,
        );
        let exp = &doc.experience[0];
        assert_eq!(exp.title, "Acme");
        assert_eq!(exp.role, "Backend Engineer");
        assert_eq!(exp.duration, "2019 – Present");
        assert_eq!(exp.description, vec!["Built billing", "Owned on-call"]);
        assert!(exp.technologies.is_empty());
    }

    #[test]
    fn test_grouped_skills_flatten_and_feed_languages() {
        let doc = parse(
            r#"{"skills": {"technical": ["Rust", " "], "soft": ["Mentoring"], "tools": null,
                "languages": ["English", "French"]}}"#,
        );
        let names: Vec<_> = doc.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Mentoring"]);
        assert!(doc.skills.iter().all(|s| s.level == DEFAULT_LEVEL));
        assert_eq!(doc.languages.len(), 2);
    }

    #[test]
    fn test_explicit_languages_win_over_grouped() {
        let doc = parse(
            r#"{"skills": {"languages": ["English"]},
                "languages": [{"name": "German", "level": 7}, "Spanish"]}"#,
        );
        assert_eq!(doc.languages[0], LeveledItem::new("German", 4));
        assert_eq!(doc.languages[1].name, "Spanish");
    }

    #[test]
    fn test_education_and_certification_aliases() {
        let doc = parse(
            r#"{"education": [{"school_name": "MIT", "start_date": "2010", "end_year": "2014"}],
                "certifications": ["CKA", {"name": "AWS", "organization": "Amazon",
                    "completionDate": "01/2023", "credentialId": "X1", "credentialUrl": null}]}"#,
        );
        assert_eq!(doc.education[0].institution, "MIT");
        assert_eq!(doc.education[0].start_year, "2010");
        assert_eq!(doc.education[0].end_year, "2014");
        assert_eq!(doc.certifications[0], Certification::Name("CKA".to_string()));
        let aws = doc.certifications[1].normalized();
        assert_eq!(aws.completion_date, "01/2023");
        assert_eq!(aws.credential_id, "X1");
        assert_eq!(aws.credential_url, "");
    }

    #[test]
    fn test_summary_is_capped() {
        let long = "a".repeat(SUMMARY_MAX_CHARS + 40);
        let doc = parse(&format!(r#"{{"summary": "{}"}}"#, long));
        assert_eq!(doc.summary.chars().count(), SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_payload_uses_collaborator_field_names() {
        let mut doc = ResumeDocument::default();
        doc.experience.push(ExperienceEntry {
            title: "Acme".to_string(),
            role: "Engineer".to_string(),
            duration: "2019 - 2022".to_string(),
            description: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        });
        doc.skills.push(LeveledItem::new("Rust", 3));

        let value = serde_json::to_value(ResumePayload::from(&doc)).expect("serializable");
        assert_eq!(value["experience"][0]["employer"], "Acme");
        assert_eq!(value["experience"][0]["start_date"], "2019");
        assert_eq!(value["experience"][0]["end_date"], "2022");
        assert_eq!(value["experience"][0]["description"], "a\nb");
        assert_eq!(value["skills"]["technical"][0], "Rust");
    }

    #[test]
    fn test_duration_round_trips_through_payload() {
        let mut doc = ResumeDocument::default();
        for duration in [format_duration(Some("2020"), Some("2023")), format_duration(Some("2024"), None)] {
            doc.experience.push(ExperienceEntry {
                duration,
                ..Default::default()
            });
        }

        let value = serde_json::to_value(ResumePayload::from(&doc)).expect("serializable");
        assert_eq!(doc.experience[0].duration, "2020 – 2023");
        assert_eq!(value["experience"][0]["end_date"], "2023");
        assert_eq!(value["experience"][1]["start_date"], "2024");
        assert_eq!(value["experience"][1]["end_date"], "");
    }

    #[test]
    fn test_description_keeps_leading_signs_that_are_not_bullets() {
        assert_eq!(
            description_lines("*nix administration\n-5% cost\n- Owned on-call\n•Tight bullet"),
            vec!["*nix administration", "-5% cost", "Owned on-call", "Tight bullet"]
        );
    }
}
