// src/wizard/fields.rs
//! Addressing a single form field and turning an edit into a section write

use crate::error::ValidationError;
use crate::store::StoreState;
use crate::types::resume::{
    Certification, CertificationDetails, Contacts, ContactsPatch, EducationEntry,
    ExperienceEntry, LeveledItem, ResumeDocument, Section, SectionUpdate, MAX_LEVEL, MIN_LEVEL,
    SUMMARY_MAX_CHARS,
};
use crate::types::response::description_lines;
use crate::utils::truncate_chars;
use crate::wizard::steps::WizardStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    DesiredJobTitle,
    Email,
    Phone,
    Location,
    Country,
    City,
    Address,
    PostCode,
    LeetcodeUrl,
    GithubUrl,
    LinkedinUrl,
}

impl ContactField {
    pub const ALL: [ContactField; 13] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::DesiredJobTitle,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Location,
        ContactField::Country,
        ContactField::City,
        ContactField::Address,
        ContactField::PostCode,
        ContactField::LeetcodeUrl,
        ContactField::GithubUrl,
        ContactField::LinkedinUrl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContactField::FirstName => "first_name",
            ContactField::LastName => "last_name",
            ContactField::DesiredJobTitle => "desired_job_title",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Location => "location",
            ContactField::Country => "country",
            ContactField::City => "city",
            ContactField::Address => "address",
            ContactField::PostCode => "post_code",
            ContactField::LeetcodeUrl => "leetcode_url",
            ContactField::GithubUrl => "github_url",
            ContactField::LinkedinUrl => "linkedin_url",
        }
    }

    pub fn get(self, contacts: &Contacts) -> &str {
        match self {
            ContactField::FirstName => &contacts.first_name,
            ContactField::LastName => &contacts.last_name,
            ContactField::DesiredJobTitle => &contacts.desired_job_title,
            ContactField::Email => &contacts.email,
            ContactField::Phone => &contacts.phone,
            ContactField::Location => &contacts.location,
            ContactField::Country => &contacts.country,
            ContactField::City => &contacts.city,
            ContactField::Address => &contacts.address,
            ContactField::PostCode => &contacts.post_code,
            ContactField::LeetcodeUrl => &contacts.leetcode_url,
            ContactField::GithubUrl => &contacts.github_url,
            ContactField::LinkedinUrl => &contacts.linkedin_url,
        }
    }

    /// A patch touching only this field.
    pub fn patch(self, value: String) -> ContactsPatch {
        let mut patch = ContactsPatch::default();
        let slot = match self {
            ContactField::FirstName => &mut patch.first_name,
            ContactField::LastName => &mut patch.last_name,
            ContactField::DesiredJobTitle => &mut patch.desired_job_title,
            ContactField::Email => &mut patch.email,
            ContactField::Phone => &mut patch.phone,
            ContactField::Location => &mut patch.location,
            ContactField::Country => &mut patch.country,
            ContactField::City => &mut patch.city,
            ContactField::Address => &mut patch.address,
            ContactField::PostCode => &mut patch.post_code,
            ContactField::LeetcodeUrl => &mut patch.leetcode_url,
            ContactField::GithubUrl => &mut patch.github_url,
            ContactField::LinkedinUrl => &mut patch.linkedin_url,
        };
        *slot = Some(value);
        patch
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceField {
    Title,
    Role,
    Technologies,
    Duration,
    Description,
}

impl ExperienceField {
    pub const ALL: [ExperienceField; 5] = [
        ExperienceField::Title,
        ExperienceField::Role,
        ExperienceField::Technologies,
        ExperienceField::Duration,
        ExperienceField::Description,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExperienceField::Title => "title",
            ExperienceField::Role => "role",
            ExperienceField::Technologies => "technologies",
            ExperienceField::Duration => "duration",
            ExperienceField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EducationField {
    Institution,
    Location,
    Degree,
    StartYear,
    EndYear,
    Description,
}

impl EducationField {
    pub const ALL: [EducationField; 6] = [
        EducationField::Institution,
        EducationField::Location,
        EducationField::Degree,
        EducationField::StartYear,
        EducationField::EndYear,
        EducationField::Description,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EducationField::Institution => "institution",
            EducationField::Location => "location",
            EducationField::Degree => "degree",
            EducationField::StartYear => "start_year",
            EducationField::EndYear => "end_year",
            EducationField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeveledField {
    Name,
    Level,
}

impl LeveledField {
    pub const ALL: [LeveledField; 2] = [LeveledField::Name, LeveledField::Level];

    pub fn name(self) -> &'static str {
        match self {
            LeveledField::Name => "name",
            LeveledField::Level => "level",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CertificationField {
    Name,
    Organization,
    CompletionDate,
    CredentialId,
    CredentialUrl,
}

impl CertificationField {
    pub const ALL: [CertificationField; 5] = [
        CertificationField::Name,
        CertificationField::Organization,
        CertificationField::CompletionDate,
        CertificationField::CredentialId,
        CertificationField::CredentialUrl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CertificationField::Name => "name",
            CertificationField::Organization => "organization",
            CertificationField::CompletionDate => "completion_date",
            CertificationField::CredentialId => "credential_id",
            CertificationField::CredentialUrl => "credential_url",
        }
    }
}

/// One editable control on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldRef {
    Contact(ContactField),
    Experience(usize, ExperienceField),
    Education(usize, EducationField),
    Skill(usize, LeveledField),
    Language(usize, LeveledField),
    Certification(usize, CertificationField),
    Summary,
    JobDescription,
}

/// Where a committed field value lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldWrite {
    Section(SectionUpdate),
    JobDescription(String),
}

impl FieldRef {
    pub fn step(self) -> WizardStep {
        match self {
            FieldRef::Contact(_) => WizardStep::Contacts,
            FieldRef::Experience(..) => WizardStep::Experience,
            FieldRef::Education(..) => WizardStep::Education,
            FieldRef::Skill(..) | FieldRef::Language(..) => WizardStep::Skills,
            FieldRef::Certification(..) => WizardStep::Certificates,
            FieldRef::Summary => WizardStep::Summary,
            FieldRef::JobDescription => WizardStep::JobDescription,
        }
    }

    pub fn label(self) -> String {
        match self {
            FieldRef::Contact(f) => f.name().to_string(),
            FieldRef::Experience(i, f) => format!("{}.{}", i, f.name()),
            FieldRef::Education(i, f) => format!("{}.{}", i, f.name()),
            FieldRef::Skill(i, f) => format!("skills.{}.{}", i, f.name()),
            FieldRef::Language(i, f) => format!("languages.{}.{}", i, f.name()),
            FieldRef::Certification(i, f) => format!("{}.{}", i, f.name()),
            FieldRef::Summary => "summary".to_string(),
            FieldRef::JobDescription => "job_description".to_string(),
        }
    }

    /// Current store value rendered as form text; `None` for a missing entry.
    pub fn read(self, state: &StoreState) -> Option<String> {
        let doc = &state.document;
        match self {
            FieldRef::Contact(f) => Some(f.get(&doc.contacts).to_string()),
            FieldRef::Experience(i, f) => doc.experience.get(i).map(|e| match f {
                ExperienceField::Title => e.title.clone(),
                ExperienceField::Role => e.role.clone(),
                ExperienceField::Technologies => e.technologies.join(", "),
                ExperienceField::Duration => e.duration.clone(),
                ExperienceField::Description => e.description.join("\n"),
            }),
            FieldRef::Education(i, f) => doc.education.get(i).map(|e| {
                let value = match f {
                    EducationField::Institution => &e.institution,
                    EducationField::Location => &e.location,
                    EducationField::Degree => &e.degree,
                    EducationField::StartYear => &e.start_year,
                    EducationField::EndYear => &e.end_year,
                    EducationField::Description => &e.description,
                };
                value.clone()
            }),
            FieldRef::Skill(i, f) => doc.skills.get(i).map(|s| read_leveled(s, f)),
            FieldRef::Language(i, f) => doc.languages.get(i).map(|s| read_leveled(s, f)),
            FieldRef::Certification(i, f) => doc.certifications.get(i).map(|c| {
                let details = c.normalized();
                match f {
                    CertificationField::Name => details.name,
                    CertificationField::Organization => details.organization,
                    CertificationField::CompletionDate => details.completion_date,
                    CertificationField::CredentialId => details.credential_id,
                    CertificationField::CredentialUrl => details.credential_url,
                }
            }),
            FieldRef::Summary => Some(doc.summary.clone()),
            FieldRef::JobDescription => Some(state.job_description.clone()),
        }
    }

    /// Build the write for `value` against the current state. List sections
    /// are copied and replaced whole.
    pub fn write(self, state: &StoreState, value: &str) -> Result<FieldWrite, ValidationError> {
        let doc = &state.document;
        let update = match self {
            FieldRef::Contact(f) => SectionUpdate::Contacts(f.patch(value.to_string())),
            FieldRef::Experience(i, f) => {
                let mut entries = doc.experience.clone();
                let entry = entry_mut(&mut entries, Section::Experience, i)?;
                write_experience(entry, f, value);
                SectionUpdate::Experience(entries)
            }
            FieldRef::Education(i, f) => {
                let mut entries = doc.education.clone();
                let entry = entry_mut(&mut entries, Section::Education, i)?;
                write_education(entry, f, value);
                SectionUpdate::Education(entries)
            }
            FieldRef::Skill(i, f) => {
                let mut items = doc.skills.clone();
                write_leveled(entry_mut(&mut items, Section::Skills, i)?, f, value)?;
                SectionUpdate::Skills(items)
            }
            FieldRef::Language(i, f) => {
                let mut items = doc.languages.clone();
                write_leveled(entry_mut(&mut items, Section::Languages, i)?, f, value)?;
                SectionUpdate::Languages(items)
            }
            FieldRef::Certification(i, f) => {
                let mut items = doc.certifications.clone();
                let cert = entry_mut(&mut items, Section::Certifications, i)?;
                let mut details = cert.normalized();
                write_certification(&mut details, f, value);
                *cert = Certification::Detailed(details);
                SectionUpdate::Certifications(items)
            }
            FieldRef::Summary => SectionUpdate::Summary(truncate_chars(value, SUMMARY_MAX_CHARS)),
            FieldRef::JobDescription => return Ok(FieldWrite::JobDescription(value.to_string())),
        };
        Ok(FieldWrite::Section(update))
    }

    /// Parse a field name typed relative to `step`: `email`, `0.title`,
    /// `languages.1.level`, `summary`.
    pub fn parse(step: WizardStep, name: &str) -> Result<FieldRef, ValidationError> {
        let unknown = || ValidationError::UnknownField {
            step: step.slug().to_string(),
            name: name.to_string(),
        };
        let name = name.trim();
        let mut parts: Vec<&str> = name.split('.').collect();

        let section = match parts.first().and_then(|p| Section::from_name(p)) {
            Some(section) if step.sections().contains(&section) && parts.len() > 1 => {
                parts.remove(0);
                section
            }
            _ => step.sections().first().copied().unwrap_or(Section::Summary),
        };

        match step {
            WizardStep::Contacts => ContactField::from_name(name)
                .map(FieldRef::Contact)
                .ok_or_else(unknown),
            WizardStep::Summary => match name {
                "summary" | "text" => Ok(FieldRef::Summary),
                _ => Err(unknown()),
            },
            WizardStep::JobDescription => match name {
                "job_description" | "text" => Ok(FieldRef::JobDescription),
                _ => Err(unknown()),
            },
            WizardStep::Finalize => Err(unknown()),
            WizardStep::Experience
            | WizardStep::Education
            | WizardStep::Skills
            | WizardStep::Certificates => {
                let [index, field] = parts[..] else {
                    return Err(unknown());
                };
                let index: usize = index.parse().map_err(|_| unknown())?;
                match section {
                    Section::Experience => find_field(&ExperienceField::ALL, field, |f| f.name())
                        .map(|f| FieldRef::Experience(index, f)),
                    Section::Education => find_field(&EducationField::ALL, field, |f| f.name())
                        .map(|f| FieldRef::Education(index, f)),
                    Section::Skills => find_field(&LeveledField::ALL, field, |f| f.name())
                        .map(|f| FieldRef::Skill(index, f)),
                    Section::Languages => find_field(&LeveledField::ALL, field, |f| f.name())
                        .map(|f| FieldRef::Language(index, f)),
                    Section::Certifications => {
                        find_field(&CertificationField::ALL, field, |f| f.name())
                            .map(|f| FieldRef::Certification(index, f))
                    }
                    Section::Contacts | Section::Summary => None,
                }
                .ok_or_else(unknown)
            }
        }
    }
}

/// Every field shown for the current contents of `step`.
pub fn step_fields(step: WizardStep, doc: &ResumeDocument) -> Vec<FieldRef> {
    match step {
        WizardStep::Contacts => ContactField::ALL.into_iter().map(FieldRef::Contact).collect(),
        WizardStep::Experience => (0..doc.experience.len())
            .flat_map(|i| ExperienceField::ALL.map(|f| FieldRef::Experience(i, f)))
            .collect(),
        WizardStep::Education => (0..doc.education.len())
            .flat_map(|i| EducationField::ALL.map(|f| FieldRef::Education(i, f)))
            .collect(),
        WizardStep::Skills => (0..doc.skills.len())
            .flat_map(|i| LeveledField::ALL.map(|f| FieldRef::Skill(i, f)))
            .chain(
                (0..doc.languages.len())
                    .flat_map(|i| LeveledField::ALL.map(|f| FieldRef::Language(i, f))),
            )
            .collect(),
        WizardStep::Certificates => (0..doc.certifications.len())
            .flat_map(|i| CertificationField::ALL.map(|f| FieldRef::Certification(i, f)))
            .collect(),
        WizardStep::Summary => vec![FieldRef::Summary],
        WizardStep::JobDescription => vec![FieldRef::JobDescription],
        WizardStep::Finalize => Vec::new(),
    }
}

fn find_field<F: Copy>(all: &[F], name: &str, field_name: impl Fn(F) -> &'static str) -> Option<F> {
    all.iter().copied().find(|f| field_name(*f) == name)
}

fn entry_mut<T>(items: &mut [T], section: Section, index: usize) -> Result<&mut T, ValidationError> {
    let len = items.len();
    items
        .get_mut(index)
        .ok_or(ValidationError::IndexOutOfRange {
            section,
            index,
            len,
        })
}

fn read_leveled(item: &LeveledItem, field: LeveledField) -> String {
    match field {
        LeveledField::Name => item.name.clone(),
        LeveledField::Level => item.level.to_string(),
    }
}

fn write_leveled(item: &mut LeveledItem, field: LeveledField, value: &str) -> Result<(), ValidationError> {
    match field {
        LeveledField::Name => item.name = value.to_string(),
        LeveledField::Level => {
            item.level = value
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|level| (MIN_LEVEL..=MAX_LEVEL).contains(level))
                .ok_or_else(|| ValidationError::InvalidLevel {
                    value: value.to_string(),
                })?;
        }
    }
    Ok(())
}

fn write_experience(entry: &mut ExperienceEntry, field: ExperienceField, value: &str) {
    match field {
        ExperienceField::Title => entry.title = value.to_string(),
        ExperienceField::Role => entry.role = value.to_string(),
        ExperienceField::Technologies => {
            entry.technologies = value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        ExperienceField::Duration => entry.duration = value.to_string(),
        ExperienceField::Description => entry.description = description_lines(value),
    }
}

fn write_education(entry: &mut EducationEntry, field: EducationField, value: &str) {
    let slot = match field {
        EducationField::Institution => &mut entry.institution,
        EducationField::Location => &mut entry.location,
        EducationField::Degree => &mut entry.degree,
        EducationField::StartYear => &mut entry.start_year,
        EducationField::EndYear => &mut entry.end_year,
        EducationField::Description => &mut entry.description,
    };
    *slot = value.to_string();
}

fn write_certification(details: &mut CertificationDetails, field: CertificationField, value: &str) {
    let slot = match field {
        CertificationField::Name => &mut details.name,
        CertificationField::Organization => &mut details.organization,
        CertificationField::CompletionDate => &mut details.completion_date,
        CertificationField::CredentialId => &mut details.credential_id,
        CertificationField::CredentialUrl => &mut details.credential_url,
    };
    *slot = value.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(doc: ResumeDocument) -> StoreState {
        StoreState {
            document: doc,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_relative_names() {
        assert_eq!(
            FieldRef::parse(WizardStep::Contacts, "email"),
            Ok(FieldRef::Contact(ContactField::Email))
        );
        assert_eq!(
            FieldRef::parse(WizardStep::Experience, "1.technologies"),
            Ok(FieldRef::Experience(1, ExperienceField::Technologies))
        );
        assert_eq!(
            FieldRef::parse(WizardStep::Skills, "0.level"),
            Ok(FieldRef::Skill(0, LeveledField::Level))
        );
        assert_eq!(
            FieldRef::parse(WizardStep::Skills, "languages.2.name"),
            Ok(FieldRef::Language(2, LeveledField::Name))
        );
        assert_eq!(
            FieldRef::parse(WizardStep::Certificates, "0.credential_url"),
            Ok(FieldRef::Certification(0, CertificationField::CredentialUrl))
        );
        assert!(FieldRef::parse(WizardStep::Experience, "title").is_err());
        assert!(FieldRef::parse(WizardStep::Contacts, "0.title").is_err());
        assert!(FieldRef::parse(WizardStep::Finalize, "summary").is_err());
    }

    #[test]
    fn test_labels_parse_back() {
        let doc = ResumeDocument {
            skills: vec![LeveledItem::default()],
            languages: vec![LeveledItem::default()],
            ..Default::default()
        };
        for field in step_fields(WizardStep::Skills, &doc) {
            assert_eq!(FieldRef::parse(WizardStep::Skills, &field.label()), Ok(field));
        }
    }

    #[test]
    fn test_write_experience_technologies_splits() {
        let state = state_with(ResumeDocument {
            experience: vec![ExperienceEntry::default()],
            ..Default::default()
        });

        let write = FieldRef::Experience(0, ExperienceField::Technologies)
            .write(&state, "Rust, , Tokio ")
            .expect("valid");

        match write {
            FieldWrite::Section(SectionUpdate::Experience(entries)) => {
                assert_eq!(entries[0].technologies, vec!["Rust", "Tokio"]);
            }
            other => panic!("unexpected write: {:?}", other),
        }
    }

    #[test]
    fn test_write_level_out_of_range() {
        let state = state_with(ResumeDocument {
            skills: vec![LeveledItem::default()],
            ..Default::default()
        });
        assert_eq!(
            FieldRef::Skill(0, LeveledField::Level).write(&state, "5"),
            Err(ValidationError::InvalidLevel {
                value: "5".to_string()
            })
        );
        assert!(FieldRef::Skill(0, LeveledField::Level)
            .write(&state, "4")
            .is_ok());
    }

    #[test]
    fn test_write_missing_index() {
        let state = state_with(ResumeDocument::default());
        assert_eq!(
            FieldRef::Education(3, EducationField::Degree).write(&state, "BSc"),
            Err(ValidationError::IndexOutOfRange {
                section: Section::Education,
                index: 3,
                len: 0
            })
        );
    }

    #[test]
    fn test_certification_write_normalizes_bare_name() {
        let state = state_with(ResumeDocument {
            certifications: vec![Certification::Name("CKA".to_string())],
            ..Default::default()
        });

        let write = FieldRef::Certification(0, CertificationField::Organization)
            .write(&state, "CNCF")
            .expect("valid");

        assert_eq!(
            write,
            FieldWrite::Section(SectionUpdate::Certifications(vec![Certification::Detailed(
                CertificationDetails {
                    name: "CKA".to_string(),
                    organization: "CNCF".to_string(),
                    ..Default::default()
                }
            )]))
        );
    }

    #[test]
    fn test_summary_write_is_capped() {
        let state = state_with(ResumeDocument::default());
        let long = "x".repeat(SUMMARY_MAX_CHARS * 2);
        match FieldRef::Summary.write(&state, &long).expect("valid") {
            FieldWrite::Section(SectionUpdate::Summary(text)) => {
                assert_eq!(text.chars().count(), SUMMARY_MAX_CHARS)
            }
            other => panic!("unexpected write: {:?}", other),
        }
    }

    #[test]
    fn test_read_renders_lists_as_text() {
        let state = state_with(ResumeDocument {
            experience: vec![ExperienceEntry {
                technologies: vec!["Rust".to_string(), "Go".to_string()],
                description: vec!["a".to_string(), "b".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(
            FieldRef::Experience(0, ExperienceField::Technologies).read(&state),
            Some("Rust, Go".to_string())
        );
        assert_eq!(
            FieldRef::Experience(0, ExperienceField::Description).read(&state),
            Some("a\nb".to_string())
        );
        assert_eq!(FieldRef::Experience(1, ExperienceField::Title).read(&state), None);
    }
}
