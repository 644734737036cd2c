// src/wizard/controller.rs
//! Step wizard: the navigator plus the draft of whichever step is active

use std::sync::Arc;
use tracing::debug;

use crate::error::{StoreError, ValidationError};
use crate::store::{ResumeStore, StoreState};
use crate::types::resume::Section;
use crate::wizard::draft::StepDraft;
use crate::wizard::fields::FieldRef;
use crate::wizard::steps::{Navigator, Route, WizardStep};

pub struct Wizard {
    store: Arc<ResumeStore>,
    navigator: Navigator,
    draft: Option<StepDraft>,
}

impl Wizard {
    /// Start on the first builder step.
    pub fn new(store: Arc<ResumeStore>) -> Self {
        Self::at(store, &WizardStep::first().path())
    }

    pub fn at(store: Arc<ResumeStore>, path: &str) -> Self {
        let navigator = Navigator::at(path);
        let draft = navigator
            .current_step()
            .map(|step| StepDraft::mount(step, &store.snapshot()));
        Self {
            store,
            navigator,
            draft,
        }
    }

    pub fn store(&self) -> &Arc<ResumeStore> {
        &self.store
    }

    pub fn route(&self) -> Route {
        self.navigator.route()
    }

    pub fn location(&self) -> String {
        self.navigator.location()
    }

    pub fn step(&self) -> Option<WizardStep> {
        self.navigator.current_step()
    }

    pub fn progress(&self) -> Option<(usize, usize)> {
        self.navigator.progress()
    }

    pub fn draft(&self) -> Option<&StepDraft> {
        self.draft.as_ref()
    }

    pub fn value(&self, field: FieldRef) -> Option<String> {
        let state = self.store.snapshot();
        match &self.draft {
            Some(draft) => draft.value(&state, field),
            None => field.read(&state),
        }
    }

    /// Pick up out-of-band store changes. Call after any async event lands.
    pub fn refresh(&mut self) -> bool {
        let state = self.store.snapshot();
        self.draft
            .as_mut()
            .map(|draft| draft.sync(&state))
            .unwrap_or(false)
    }

    pub fn input(&mut self, field: FieldRef, text: impl Into<String>) -> Result<(), StoreError> {
        self.refresh();
        self.active_draft()?.input(field, text)?;
        Ok(())
    }

    pub fn blur(&mut self, field: FieldRef) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        self.active_draft()?.blur(&store, field)?;
        Ok(())
    }

    /// Commit everything buffered on the current step.
    pub fn commit(&mut self) -> Result<usize, StoreError> {
        let store = Arc::clone(&self.store);
        match self.draft.as_mut() {
            Some(draft) => Ok(draft.commit(&store)?),
            None => Ok(0),
        }
    }

    pub fn add_entry(&mut self, section: Option<Section>) -> Result<usize, StoreError> {
        let store = Arc::clone(&self.store);
        let draft = self.active_draft()?;
        let section = section_or_default(draft.step(), section)?;
        Ok(draft.add_entry(&store, section)?)
    }

    pub fn remove_entry(&mut self, section: Option<Section>, index: usize) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        let draft = self.active_draft()?;
        let section = section_or_default(draft.step(), section)?;
        draft.remove_entry(&store, section, index)?;
        Ok(())
    }

    /// Commit and move one step forward. `Ok(false)` when already on the last step.
    pub fn next(&mut self) -> Result<bool, StoreError> {
        self.commit()?;
        let moved = self.navigator.next();
        if moved {
            self.remount();
        }
        Ok(moved)
    }

    /// Commit and move one step back. `Ok(false)` when already on the first step.
    pub fn back(&mut self) -> Result<bool, StoreError> {
        self.commit()?;
        let moved = self.navigator.back();
        if moved {
            self.remount();
        }
        Ok(moved)
    }

    pub fn go_to(&mut self, path: &str) -> Result<Route, StoreError> {
        self.commit()?;
        let route = self.navigator.navigate(path);
        self.remount();
        Ok(route)
    }

    /// Steps that still need input, in wizard order.
    pub fn incomplete_steps(&self) -> Vec<WizardStep> {
        let state = self.store.snapshot();
        WizardStep::ALL
            .into_iter()
            .filter(|step| !step_complete(*step, &state))
            .collect()
    }

    fn remount(&mut self) {
        let state = self.store.snapshot();
        self.draft = self
            .navigator
            .current_step()
            .map(|step| StepDraft::mount(step, &state));
        debug!("Navigated to {}", self.navigator.location());
    }

    fn active_draft(&mut self) -> Result<&mut StepDraft, ValidationError> {
        let location = self.navigator.location();
        self.draft.as_mut().ok_or(ValidationError::UnknownField {
            step: location,
            name: "builder step".to_string(),
        })
    }
}

fn section_or_default(step: WizardStep, section: Option<Section>) -> Result<Section, ValidationError> {
    match section.or_else(|| step.sections().first().copied()) {
        Some(section) => Ok(section),
        None => Err(ValidationError::UnknownField {
            step: step.slug().to_string(),
            name: "list".to_string(),
        }),
    }
}

/// Whether `step` has the minimum input a reviewer would expect.
pub fn step_complete(step: WizardStep, state: &StoreState) -> bool {
    let doc = &state.document;
    let filled = |s: &str| !s.trim().is_empty();
    match step {
        WizardStep::Contacts => {
            filled(&doc.contacts.first_name)
                && filled(&doc.contacts.last_name)
                && filled(&doc.contacts.email)
        }
        WizardStep::Experience => doc
            .experience
            .iter()
            .any(|e| filled(&e.title) || filled(&e.role)),
        WizardStep::Education => doc
            .education
            .iter()
            .any(|e| filled(&e.institution) || filled(&e.degree)),
        WizardStep::Skills => doc.skills.iter().any(|s| filled(&s.name)),
        WizardStep::Certificates => doc
            .certifications
            .iter()
            .any(|c| filled(&c.normalized().name)),
        WizardStep::Summary => filled(&doc.summary),
        WizardStep::JobDescription => filled(&state.job_description),
        WizardStep::Finalize => true,
    }
}
