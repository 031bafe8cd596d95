//! # Edit Session
//!
//! One author's editing state for one research document.
//!
//! The session owns the [`Document`] and carries the responsibilities the
//! core leaves to its caller: auth and required-field checks before a
//! submit, and refusing edits while a submit is outstanding so no stale
//! topic/subtopic index is applied mid-flight.
//!
//! A submit can run in one call ([`EditSession::submit`]) or in three steps
//! when the UI dispatches the async part elsewhere:
//!
//! ```text
//! begin_submit → SubmitPipeline::submit(ticket) → finish_submit
//!   (locks)             (uploads + write)           (unlocks)
//! ```

use crate::services::{research_path, Services};
use crate::{Document, EditorError, Mutation, MutationResult, ResearchRecord, SubmitOutcome, SubmitPipeline};
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot handed out by [`EditSession::begin_submit`]
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub document: Document,
    pub research_id: Option<String>,
}

pub struct EditSession {
    document: Document,
    research_id: Option<String>,
    submitting: bool,
    services: Services,
    pipeline: Arc<SubmitPipeline>,
}

impl EditSession {
    /// Session for a new research document
    pub fn new(services: Services) -> Self {
        Self::with_document(services, Document::new(), None)
    }

    /// Session over an existing tree; `research_id` makes submits updates
    pub fn with_document(services: Services, document: Document, research_id: Option<String>) -> Self {
        let pipeline = Arc::new(SubmitPipeline::from_services(&services));

        Self {
            document,
            research_id,
            submitting: false,
            services,
            pipeline,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn research_id(&self) -> Option<&str> {
        self.research_id.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn pipeline(&self) -> Arc<SubmitPipeline> {
        self.pipeline.clone()
    }

    /// Apply an editor mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        if self.submitting {
            return Err(EditorError::SubmitInProgress);
        }

        let name = mutation.name();
        let result = self.document.apply(mutation)?;
        debug!(mutation = name, version = result.version, "Applied mutation");

        Ok(result)
    }

    /// Replace the tree with the stored document `id`
    ///
    /// A missing document yields `NotFound` and leaves the current tree and
    /// id untouched.
    pub async fn load_existing(&mut self, id: &str) -> Result<(), EditorError> {
        if self.submitting {
            return Err(EditorError::SubmitInProgress);
        }

        let path = research_path(id);
        let value = self
            .services
            .store
            .read(&path)
            .await?
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;

        self.document = ResearchRecord::from_value(&path, value)?.into_document();
        self.research_id = Some(id.to_string());

        info!(path = %path, topics = self.document.topics.len(), "Loaded research");
        Ok(())
    }

    /// Check preconditions and lock the session for a submit
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, EditorError> {
        if self.submitting {
            return Err(EditorError::SubmitInProgress);
        }

        if self.services.auth.current_user().is_none() {
            return Err(EditorError::Unauthenticated);
        }

        if self.document.title.trim().is_empty() {
            return Err(EditorError::Validation("research title is required".to_string()));
        }

        self.submitting = true;

        Ok(SubmitTicket {
            document: self.document.clone(),
            research_id: self.research_id.clone(),
        })
    }

    /// Unlock the session and fold a pipeline result back in
    ///
    /// On success the session now edits the saved id and every attachment
    /// holds its resolved URL, so submitting again uploads nothing. On
    /// failure the tree is left as it was.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitOutcome, EditorError>,
    ) -> Result<SubmitOutcome, EditorError> {
        self.submitting = false;

        let outcome = result?;
        self.document.adopt_resolved(&outcome.record);
        self.research_id = Some(outcome.id.clone());

        Ok(outcome)
    }

    /// Validate, resolve, and persist in one call
    ///
    /// Dropping the returned future unlocks the session with the tree as it
    /// was before the call.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, EditorError> {
        let ticket = self.begin_submit()?;
        let pipeline = self.pipeline.clone();

        let result = {
            let _unlock = Unlock(&mut self.submitting);
            pipeline
                .submit(&ticket.document, ticket.research_id.as_deref())
                .await
        };

        self.finish_submit(result)
    }
}

/// Clears the submitting flag when dropped, including on cancellation
struct Unlock<'a>(&'a mut bool);

impl Drop for Unlock<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
