// src/wizard/draft.rs
//! Per-step edit buffer.
//!
//! The store is authoritative. A draft only holds keystrokes that have not
//! been committed yet; everything else renders straight from the store.
//! Buffers commit on blur and before navigation. If a section this step
//! edits is written by someone else (an upload landing, a reset), the
//! buffers are dropped and the step renders the new store value. Writes to
//! other parts of the state (template, other sections) leave them alone.
//! Syncing never writes to the store.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ValidationError;
use crate::store::{ResumeStore, StateKey, StoreState};
use crate::types::resume::Section;
use crate::wizard::fields::{FieldRef, FieldWrite};
use crate::wizard::lists;
use crate::wizard::steps::WizardStep;

#[derive(Debug, Clone)]
pub struct StepDraft {
    step: WizardStep,
    buffers: BTreeMap<FieldRef, String>,
    seen_revision: u64,
}

impl StepDraft {
    pub fn mount(step: WizardStep, state: &StoreState) -> Self {
        Self {
            step,
            buffers: BTreeMap::new(),
            seen_revision: watched_revision(step, state),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_dirty(&self) -> bool {
        !self.buffers.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = (&FieldRef, &String)> {
        self.buffers.iter()
    }

    /// What the control shows: the uncommitted text if any, else the store value.
    pub fn value(&self, state: &StoreState, field: FieldRef) -> Option<String> {
        self.buffers
            .get(&field)
            .cloned()
            .or_else(|| field.read(state))
    }

    /// Record a keystroke. Nothing reaches the store until blur/commit.
    pub fn input(&mut self, field: FieldRef, text: impl Into<String>) -> Result<(), ValidationError> {
        if field.step() != self.step {
            return Err(ValidationError::UnknownField {
                step: self.step.slug().to_string(),
                name: field.label(),
            });
        }
        self.buffers.insert(field, text.into());
        Ok(())
    }

    /// Converge on the store after an out-of-band change. Returns whether
    /// uncommitted edits were discarded.
    pub fn sync(&mut self, state: &StoreState) -> bool {
        let revision = watched_revision(self.step, state);
        if revision == self.seen_revision {
            return false;
        }

        let dropped = !self.buffers.is_empty();
        if dropped {
            debug!(
                "Step {} discarding {} uncommitted edits after store moved to revision {}",
                self.step,
                self.buffers.len(),
                state.revision
            );
        }
        self.buffers.clear();
        self.seen_revision = revision;
        dropped
    }

    /// Commit one field (the user left the control).
    pub fn blur(&mut self, store: &ResumeStore, field: FieldRef) -> Result<(), ValidationError> {
        self.sync(&store.snapshot());
        let Some(text) = self.buffers.get(&field).cloned() else {
            return Ok(());
        };
        self.write_through(store, field, &text)?;
        self.buffers.remove(&field);
        Ok(())
    }

    /// Commit every buffered field in field order. On a validation failure
    /// the failing field and those after it stay buffered.
    pub fn commit(&mut self, store: &ResumeStore) -> Result<usize, ValidationError> {
        self.sync(&store.snapshot());

        let pending: Vec<(FieldRef, String)> = self
            .buffers
            .iter()
            .map(|(field, text)| (*field, text.clone()))
            .collect();

        let mut committed = 0;
        for (field, text) in pending {
            self.write_through(store, field, &text)?;
            self.buffers.remove(&field);
            committed += 1;
        }
        Ok(committed)
    }

    /// Append a blank entry to `section`; returns its index.
    pub fn add_entry(&mut self, store: &ResumeStore, section: Section) -> Result<usize, ValidationError> {
        self.ensure_owned(section)?;
        self.commit(store)?;

        let update = lists::append_blank(&store.document(), section)?;
        store.update_section(update);
        self.mark_seen(store);

        let len = store.document().section_len(section).unwrap_or_default();
        Ok(len.saturating_sub(1))
    }

    pub fn remove_entry(
        &mut self,
        store: &ResumeStore,
        section: Section,
        index: usize,
    ) -> Result<(), ValidationError> {
        self.ensure_owned(section)?;
        self.commit(store)?;

        let update = lists::remove_entry(&store.document(), section, index)?;
        store.update_section(update);
        self.mark_seen(store);
        Ok(())
    }

    fn ensure_owned(&self, section: Section) -> Result<(), ValidationError> {
        if !section.is_list() {
            return Err(ValidationError::NotAList { section });
        }
        if !self.step.sections().contains(&section) {
            return Err(ValidationError::UnknownField {
                step: self.step.slug().to_string(),
                name: section.name().to_string(),
            });
        }
        Ok(())
    }

    fn write_through(
        &mut self,
        store: &ResumeStore,
        field: FieldRef,
        text: &str,
    ) -> Result<(), ValidationError> {
        match field.write(&store.snapshot(), text)? {
            FieldWrite::Section(update) => store.update_section(update),
            FieldWrite::JobDescription(text) => store.set_job_description(&text),
        };
        self.mark_seen(store);
        Ok(())
    }

    fn mark_seen(&mut self, store: &ResumeStore) {
        self.seen_revision = watched_revision(self.step, &store.snapshot());
    }
}

/// Latest revision that wrote any part of the state `step` edits.
fn watched_revision(step: WizardStep, state: &StoreState) -> u64 {
    let sections = step
        .sections()
        .iter()
        .map(|section| state.changed_at(StateKey::Section(*section)));
    let job = (step == WizardStep::JobDescription)
        .then(|| state.changed_at(StateKey::JobDescription));
    sections.chain(job).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResumeBackend;
    use crate::error::BackendError;
    use crate::types::resume::{LeveledItem, ResumeDocument, SectionUpdate};
    use crate::types::response::{
        ChangeTemplateResponse, GenerateSummaryResponse, ParsedResumeResponse,
    };
    use crate::utils::SourceFile;
    use crate::wizard::fields::{ContactField, LeveledField};
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    struct OfflineBackend;

    #[async_trait]
    impl ResumeBackend for OfflineBackend {
        async fn upload_resume(
            &self,
            _file: &SourceFile,
            _template_id: &str,
        ) -> Result<ParsedResumeResponse, BackendError> {
            Err(BackendError::Transport("offline".to_string()))
        }

        async fn change_template(
            &self,
            _resume_id: Uuid,
            _template_id: &str,
        ) -> Result<ChangeTemplateResponse, BackendError> {
            Err(BackendError::Transport("offline".to_string()))
        }

        async fn generate_summary(
            &self,
            _job_description: &str,
            _resume: &ResumeDocument,
        ) -> Result<GenerateSummaryResponse, BackendError> {
            Err(BackendError::Transport("offline".to_string()))
        }

        async fn fetch_resume(
            &self,
            _resume_id: Uuid,
        ) -> Result<ParsedResumeResponse, BackendError> {
            Err(BackendError::Transport("offline".to_string()))
        }
    }

    fn store() -> ResumeStore {
        ResumeStore::new(Arc::new(OfflineBackend))
    }

    const EMAIL: FieldRef = FieldRef::Contact(ContactField::Email);
    const PHONE: FieldRef = FieldRef::Contact(ContactField::Phone);

    #[test]
    fn test_value_prefers_buffer_over_store() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Contacts, &store.snapshot());

        draft.input(EMAIL, "a@b.c").expect("field on step");

        assert_eq!(draft.value(&store.snapshot(), EMAIL).as_deref(), Some("a@b.c"));
        assert_eq!(store.document().contacts.email, "");
    }

    #[test]
    fn test_blur_commits_only_that_field() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Contacts, &store.snapshot());
        draft.input(EMAIL, "a@b.c").expect("field on step");
        draft.input(PHONE, "555").expect("field on step");

        draft.blur(&store, EMAIL).expect("valid");

        assert_eq!(store.document().contacts.email, "a@b.c");
        assert_eq!(store.document().contacts.phone, "");
        assert!(!draft.sync(&store.snapshot()));
        assert_eq!(draft.value(&store.snapshot(), PHONE).as_deref(), Some("555"));
    }

    #[test]
    fn test_out_of_band_change_drops_buffers() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Contacts, &store.snapshot());
        draft.input(EMAIL, "typed@local").expect("field on step");

        store.update_section(SectionUpdate::Contacts(ContactField::Email.patch(
            "parsed@remote".to_string(),
        )));
        let revision = store.revision();

        assert!(draft.sync(&store.snapshot()));
        assert_eq!(
            draft.value(&store.snapshot(), EMAIL).as_deref(),
            Some("parsed@remote")
        );
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_unrelated_store_change_keeps_buffers() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Contacts, &store.snapshot());
        draft.input(EMAIL, "typed@local").expect("field on step");

        store.set_job_description("Rust engineer");
        store.update_section(SectionUpdate::Skills(vec![LeveledItem::new("Rust", 3)]));

        assert!(!draft.sync(&store.snapshot()));
        assert_eq!(draft.commit(&store), Ok(1));
        assert_eq!(store.document().contacts.email, "typed@local");
    }

    #[test]
    fn test_job_description_step_watches_job_text() {
        let store = store();
        let field = FieldRef::JobDescription;
        let mut draft = StepDraft::mount(WizardStep::JobDescription, &store.snapshot());
        draft.input(field, "typed").expect("field on step");

        store.set_job_description("set elsewhere");

        assert!(draft.sync(&store.snapshot()));
        assert_eq!(
            draft.value(&store.snapshot(), field).as_deref(),
            Some("set elsewhere")
        );
    }

    #[test]
    fn test_wrong_step_field_is_rejected() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Summary, &store.snapshot());
        assert!(draft.input(EMAIL, "x").is_err());
    }

    #[test]
    fn test_failed_commit_keeps_failing_buffer() {
        let store = store();
        store.update_section(SectionUpdate::Skills(vec![LeveledItem::default()]));
        let mut draft = StepDraft::mount(WizardStep::Skills, &store.snapshot());
        let name = FieldRef::Skill(0, LeveledField::Name);
        let level = FieldRef::Skill(0, LeveledField::Level);
        draft.input(name, "Rust").expect("field on step");
        draft.input(level, "9").expect("field on step");

        let err = draft.commit(&store).expect_err("bad level");

        assert!(matches!(err, ValidationError::InvalidLevel { .. }));
        assert_eq!(store.document().skills[0].name, "Rust");
        assert_eq!(draft.pending().count(), 1);
    }

    #[test]
    fn test_add_entry_commits_pending_edits_first() {
        let store = store();
        store.update_section(SectionUpdate::Skills(vec![LeveledItem::default()]));
        let mut draft = StepDraft::mount(WizardStep::Skills, &store.snapshot());
        draft
            .input(FieldRef::Skill(0, LeveledField::Name), "Rust")
            .expect("field on step");

        let index = draft.add_entry(&store, Section::Skills).expect("list");

        assert_eq!(index, 1);
        let skills = store.document().skills;
        assert_eq!(skills[0].name, "Rust");
        assert_eq!(skills[1], LeveledItem::default());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_add_entry_to_foreign_section_is_rejected() {
        let store = store();
        let mut draft = StepDraft::mount(WizardStep::Skills, &store.snapshot());
        assert!(draft.add_entry(&store, Section::Experience).is_err());
        assert!(draft.add_entry(&store, Section::Languages).is_ok());
    }
}
