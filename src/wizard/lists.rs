// src/wizard/lists.rs
//! Add/remove for list sections

use crate::error::ValidationError;
use crate::types::resume::{ResumeDocument, Section, SectionUpdate};

/// What happens when the last entry of a list is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyListPolicy {
    /// The list may be empty.
    AllowEmpty,
    /// A single blank entry takes the place of the removed one.
    KeepOneBlank,
}

/// Card-style sections always show one form; chip-style sections may be empty.
pub fn empty_list_policy(section: Section) -> EmptyListPolicy {
    match section {
        Section::Experience | Section::Education | Section::Certifications => {
            EmptyListPolicy::KeepOneBlank
        }
        _ => EmptyListPolicy::AllowEmpty,
    }
}

/// Append a blank entry (skills and languages default to level 2).
pub fn append_blank(doc: &ResumeDocument, section: Section) -> Result<SectionUpdate, ValidationError> {
    let update = match section {
        Section::Experience => SectionUpdate::Experience(appended(&doc.experience)),
        Section::Education => SectionUpdate::Education(appended(&doc.education)),
        Section::Skills => SectionUpdate::Skills(appended(&doc.skills)),
        Section::Languages => SectionUpdate::Languages(appended(&doc.languages)),
        Section::Certifications => SectionUpdate::Certifications(appended(&doc.certifications)),
        Section::Contacts | Section::Summary => return Err(ValidationError::NotAList { section }),
    };
    Ok(update)
}

pub fn remove_entry(
    doc: &ResumeDocument,
    section: Section,
    index: usize,
) -> Result<SectionUpdate, ValidationError> {
    let policy = empty_list_policy(section);
    let update = match section {
        Section::Experience => {
            SectionUpdate::Experience(removed(&doc.experience, section, index, policy)?)
        }
        Section::Education => {
            SectionUpdate::Education(removed(&doc.education, section, index, policy)?)
        }
        Section::Skills => SectionUpdate::Skills(removed(&doc.skills, section, index, policy)?),
        Section::Languages => {
            SectionUpdate::Languages(removed(&doc.languages, section, index, policy)?)
        }
        Section::Certifications => {
            SectionUpdate::Certifications(removed(&doc.certifications, section, index, policy)?)
        }
        Section::Contacts | Section::Summary => return Err(ValidationError::NotAList { section }),
    };
    Ok(update)
}

fn appended<T: Clone + Default>(items: &[T]) -> Vec<T> {
    let mut next = items.to_vec();
    next.push(T::default());
    next
}

fn removed<T: Clone + Default>(
    items: &[T],
    section: Section,
    index: usize,
    policy: EmptyListPolicy,
) -> Result<Vec<T>, ValidationError> {
    if index >= items.len() {
        return Err(ValidationError::IndexOutOfRange {
            section,
            index,
            len: items.len(),
        });
    }

    let mut next = items.to_vec();
    next.remove(index);
    if next.is_empty() && policy == EmptyListPolicy::KeepOneBlank {
        next.push(T::default());
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resume::{ExperienceEntry, LeveledItem, DEFAULT_LEVEL};

    #[test]
    fn test_add_twice_remove_first_skill() {
        let mut doc = ResumeDocument::default();
        doc.apply(append_blank(&doc, Section::Skills).expect("list"));
        doc.skills[0].name = "first".to_string();
        doc.apply(append_blank(&doc, Section::Skills).expect("list"));
        doc.skills[1].name = "second".to_string();

        assert_eq!(doc.skills.len(), 2);
        assert!(doc.skills.iter().all(|s| s.level == DEFAULT_LEVEL));

        doc.apply(remove_entry(&doc, Section::Skills, 0).expect("in range"));
        assert_eq!(doc.skills, vec![LeveledItem::new("second", DEFAULT_LEVEL)]);
    }

    #[test]
    fn test_skills_may_become_empty() {
        let doc = ResumeDocument {
            skills: vec![LeveledItem::new("Rust", 3)],
            ..Default::default()
        };
        assert_eq!(
            remove_entry(&doc, Section::Skills, 0),
            Ok(SectionUpdate::Skills(Vec::new()))
        );
    }

    #[test]
    fn test_experience_keeps_one_blank() {
        let doc = ResumeDocument {
            experience: vec![ExperienceEntry {
                title: "Acme".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            remove_entry(&doc, Section::Experience, 0),
            Ok(SectionUpdate::Experience(vec![ExperienceEntry::default()]))
        );
    }

    #[test]
    fn test_remove_out_of_range() {
        let doc = ResumeDocument::default();
        assert!(matches!(
            remove_entry(&doc, Section::Certifications, 0),
            Err(ValidationError::IndexOutOfRange { len: 0, .. })
        ));
    }

    #[test]
    fn test_scalar_sections_are_not_lists() {
        let doc = ResumeDocument::default();
        assert_eq!(
            append_blank(&doc, Section::Summary),
            Err(ValidationError::NotAList {
                section: Section::Summary
            })
        );
    }
}
