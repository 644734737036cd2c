// src/store.rs
//! Shared resume model store.
//!
//! One store per session, handed to every view as an `Arc<ResumeStore>`.
//! State lives in a `tokio::sync::watch` channel: writers replace sections
//! through [`ResumeStore::update_section`] and the collaborator-backed
//! operations, readers take snapshots or subscribe for changes.
//!
//! `revision` advances on every content change (document, session, template,
//! job description), and each [`StateKey`] remembers the revision that last
//! wrote it so a view can tell whether *its* part of the state moved. The
//! in-flight request count changes without touching any revision so that a
//! busy indicator never looks like an out-of-band edit.
//!
//! Overlapping collaborator calls resolve latest-request-wins: each call takes
//! a ticket, and a response whose ticket is no longer the newest is dropped
//! with [`StoreError::Superseded`]. `reset` also invalidates outstanding tickets.
//! A template picked locally while an upload is in flight is kept and bound
//! to the new session once the upload lands.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::ResumeBackend;
use crate::error::{StoreError, ValidationError};
use crate::types::resume::{ResumeDocument, Section, SectionUpdate, SUMMARY_MAX_CHARS};
use crate::types::response::ParsedResumeResponse;
use crate::utils::{truncate_chars, validate_source_file, SourceFile};

/// A parsed resume bound on the collaborator side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSession {
    pub resume_id: Uuid,
    pub template_id: String,
    pub parsed_at: DateTime<Utc>,
}

/// Independently tracked parts of the store state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    Section(Section),
    JobDescription,
    Template,
}

impl StateKey {
    pub const SECTIONS: [StateKey; 7] = [
        StateKey::Section(Section::Contacts),
        StateKey::Section(Section::Experience),
        StateKey::Section(Section::Education),
        StateKey::Section(Section::Skills),
        StateKey::Section(Section::Languages),
        StateKey::Section(Section::Certifications),
        StateKey::Section(Section::Summary),
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub document: ResumeDocument,
    pub session: Option<ResumeSession>,
    pub template_id: Option<String>,
    pub job_description: String,
    pub revision: u64,
    pub in_flight: usize,
    pub(crate) changed_at: BTreeMap<StateKey, u64>,
}

impl StoreState {
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn resume_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.resume_id)
    }

    /// Revision of the last write to `key`; 0 if it was never written.
    pub fn changed_at(&self, key: StateKey) -> u64 {
        self.changed_at.get(&key).copied().unwrap_or(0)
    }
}

pub struct ResumeStore {
    state: watch::Sender<StoreState>,
    backend: Arc<dyn ResumeBackend>,
    latest_ticket: AtomicU64,
}

/// Marks one outstanding collaborator call; releases the busy count on drop.
struct InFlight<'a> {
    store: &'a ResumeStore,
    ticket: u64,
    started_at: u64,
}

impl InFlight<'_> {
    fn is_current(&self) -> bool {
        self.store.latest_ticket.load(Ordering::SeqCst) == self.ticket
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store
            .state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

impl ResumeStore {
    pub fn new(backend: Arc<dyn ResumeBackend>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            state,
            backend,
            latest_ticket: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn document(&self) -> ResumeDocument {
        self.state.borrow().document.clone()
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    fn commit(&self, touched: &[StateKey], change: impl FnOnce(&mut StoreState)) -> u64 {
        let mut revision = 0;
        self.state.send_modify(|s| {
            change(s);
            s.revision += 1;
            for key in touched {
                s.changed_at.insert(*key, s.revision);
            }
            revision = s.revision;
        });
        revision
    }

    fn begin_request(&self) -> InFlight<'_> {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let mut started_at = 0;
        self.state.send_modify(|s| {
            s.in_flight += 1;
            started_at = s.revision;
        });
        InFlight {
            store: self,
            ticket,
            started_at,
        }
    }

    /// Replace one section; contacts merge shallowly. Returns the new revision.
    pub fn update_section(&self, update: SectionUpdate) -> u64 {
        let section = update.section();
        let revision = self.commit(&[StateKey::Section(section)], |s| s.document.apply(update));
        debug!("Section {} updated (revision {})", section, revision);
        revision
    }

    /// Replace the whole document, e.g. from a saved JSON export. The
    /// session binding is kept.
    pub fn load_document(&self, document: ResumeDocument) -> u64 {
        let revision = self.commit(&StateKey::SECTIONS, |s| s.document = document);
        info!("Document replaced (revision {})", revision);
        revision
    }

    pub fn set_job_description(&self, text: &str) -> u64 {
        self.commit(&[StateKey::JobDescription], |s| {
            s.job_description = text.to_string()
        })
    }

    /// Back to an empty session. Responses still in flight are discarded.
    pub fn reset(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::SeqCst);
        let mut touched = StateKey::SECTIONS.to_vec();
        touched.extend([StateKey::JobDescription, StateKey::Template]);
        let revision = self.commit(&touched, |s| {
            s.document = ResumeDocument::default();
            s.session = None;
            s.template_id = None;
            s.job_description.clear();
        });
        info!("Store reset (revision {})", revision);
        revision
    }

    /// Send a resume file to the collaborator and adopt its parse result.
    pub async fn upload_source_document(
        &self,
        file: &SourceFile,
        template_id: &str,
    ) -> Result<(), StoreError> {
        validate_source_file(file).map_err(|err| {
            warn!("Rejected {} before upload: {}", file.file_name, err);
            err
        })?;

        let request = self.begin_request();
        let response = self.backend.upload_resume(file, template_id).await?;

        if !request.is_current() {
            warn!("Discarding superseded upload response for {}", file.file_name);
            return Err(StoreError::Superseded);
        }

        info!(
            "Parsed {} into resume {} (template {})",
            file.file_name, response.resume_id, response.template_id
        );
        let started_at = request.started_at;
        drop(request);
        self.adopt_parsed(response, started_at).await;
        Ok(())
    }

    /// Re-enter a resume the collaborator already parsed.
    pub async fn load_session(&self, resume_id: Uuid) -> Result<(), StoreError> {
        let request = self.begin_request();
        let response = self.backend.fetch_resume(resume_id).await?;

        if !request.is_current() {
            warn!("Discarding superseded fetch for resume {}", resume_id);
            return Err(StoreError::Superseded);
        }

        info!("Loaded resume {} (template {})", resume_id, response.template_id);
        let started_at = request.started_at;
        drop(request);
        self.adopt_parsed(response, started_at).await;
        Ok(())
    }

    /// Replace the document and session with a parse result. A template the
    /// user picked after the request started wins over the returned one and
    /// is bound to the new session.
    async fn adopt_parsed(&self, response: ParsedResumeResponse, started_at: u64) {
        let picked = {
            let state = self.state.borrow();
            if state.changed_at(StateKey::Template) > started_at {
                state.template_id.clone()
            } else {
                None
            }
        };

        let document = response.data.unwrap_or_default().into_document();
        let session = ResumeSession {
            resume_id: response.resume_id,
            template_id: response.template_id.clone(),
            parsed_at: Utc::now(),
        };
        let template_id = picked.clone().unwrap_or(response.template_id);
        let bound = session.template_id.clone();

        let mut touched = StateKey::SECTIONS.to_vec();
        touched.push(StateKey::Template);
        self.commit(&touched, |s| {
            s.document = document;
            s.session = Some(session);
            s.template_id = Some(template_id);
        });

        if let Some(picked) = picked.filter(|picked| *picked != bound) {
            info!("Binding template {} picked during the request", picked);
            if let Err(err) = self.change_template(&picked).await {
                warn!("Could not bind template {}: {}", picked, err);
            }
        }
    }

    /// Pick a template. Without a session this is purely local.
    pub async fn change_template(&self, template_id: &str) -> Result<(), StoreError> {
        let current = self.state.borrow().resume_id();
        let resume_id = match current {
            Some(id) => id,
            None => {
                debug!("No session yet; recording template {} locally", template_id);
                self.commit(&[StateKey::Template], |s| {
                    s.template_id = Some(template_id.to_string())
                });
                return Ok(());
            }
        };

        let request = self.begin_request();
        let response = self.backend.change_template(resume_id, template_id).await?;

        if !request.is_current() {
            warn!("Discarding superseded template change to {}", template_id);
            return Err(StoreError::Superseded);
        }

        info!("Resume {} now bound to template {}", resume_id, response.template_id);
        self.commit(&[StateKey::Template], |s| {
            if let Some(session) = s.session.as_mut() {
                session.template_id = response.template_id.clone();
            }
            s.template_id = Some(response.template_id);
        });
        Ok(())
    }

    /// Ask the collaborator for a summary tailored to `job_description` and
    /// store it (capped) as the document summary.
    pub async fn generate_summary(&self, job_description: &str) -> Result<String, StoreError> {
        if job_description.trim().is_empty() {
            return Err(ValidationError::EmptyJobDescription.into());
        }

        let document = self.document();
        let request = self.begin_request();
        let response = self
            .backend
            .generate_summary(job_description, &document)
            .await?;

        if !request.is_current() {
            warn!("Discarding superseded summary");
            return Err(StoreError::Superseded);
        }

        let summary = truncate_chars(response.summary.trim(), SUMMARY_MAX_CHARS);
        let touched = [StateKey::Section(Section::Summary), StateKey::JobDescription];
        self.commit(&touched, |s| {
            s.job_description = job_description.to_string();
            s.document.summary = summary.clone();
        });
        info!("Summary generated ({} chars)", summary.chars().count());
        Ok(summary)
    }
}
