pub mod resume;
pub mod response;

pub use resume::{
    Certification, CertificationDetails, Contacts, ContactsPatch, EducationEntry, ExperienceEntry,
    LeveledItem, ResumeDocument, Section, SectionUpdate,
};
