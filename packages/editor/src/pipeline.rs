//! # Submit Pipeline
//!
//! Coordinates one submission: Resolve → Assemble → Persist
//!
//! The Pipeline manages:
//! - Uploading every pending attachment (images and the PDF)
//! - Passing already-resolved URLs through untouched
//! - Assembling the flat [`ResearchRecord`]
//! - Writing it to the store under an existing or freshly generated key
//!
//! Uploads for the main image, the PDF, and every topic and subtopic run
//! concurrently. The join is fail-fast: the first upload error drops the
//! remaining futures and nothing is written. Uploads that already finished
//! stay at the upload service.

use crate::document::{Attachment, Document, Subtopic, Topic};
use crate::record::{ResearchRecord, SubtopicRecord, TopicRecord};
use crate::services::{
    research_path, DocumentStore, ImageUploader, PdfUploader, Services, UploadError,
    RESEARCH_COLLECTION,
};
use crate::EditorError;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Object name for an uploaded PDF: filename plus millisecond timestamp
pub fn pdf_namespace(file_name: &str, millis: i64) -> String {
    format!("researchPDFs/{}-{}", file_name, millis)
}

/// Resolves attachments and persists research documents
pub struct SubmitPipeline {
    store: Arc<dyn DocumentStore>,
    images: Arc<dyn ImageUploader>,
    pdfs: Arc<dyn PdfUploader>,
}

/// Result of a successful submit
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Key the record was written under
    pub id: String,

    /// Exactly what was written
    pub record: ResearchRecord,

    /// Whether a new key was generated
    pub created: bool,

    /// Number of attachments uploaded
    pub uploads: usize,
}

impl SubmitPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        images: Arc<dyn ImageUploader>,
        pdfs: Arc<dyn PdfUploader>,
    ) -> Self {
        Self { store, images, pdfs }
    }

    pub fn from_services(services: &Services) -> Self {
        Self::new(
            services.store.clone(),
            services.images.clone(),
            services.pdfs.clone(),
        )
    }

    /// Run the whole pipeline for `document`
    ///
    /// With `id`, the record fully replaces `research/{id}`. Without one a
    /// new key is generated first.
    #[instrument(skip(self, document), fields(pending = document.pending_uploads()))]
    pub async fn submit(
        &self,
        document: &Document,
        id: Option<&str>,
    ) -> Result<SubmitOutcome, EditorError> {
        let uploads = document.pending_uploads();

        let record = self.resolve(document).await.map_err(|e| {
            warn!(error = %e, "Attachment upload failed, aborting submit");
            e
        })?;

        let (id, created) = match id {
            Some(id) => (id.to_string(), false),
            None => (self.store.new_key(RESEARCH_COLLECTION).await?, true),
        };

        let path = research_path(&id);
        self.store.write(&path, record.to_value()).await?;

        info!(path = %path, created, uploads, topics = record.topics.len(), "Research saved");

        Ok(SubmitOutcome {
            id,
            record,
            created,
            uploads,
        })
    }

    /// Resolve every attachment and assemble the record, without writing
    pub async fn resolve(&self, document: &Document) -> Result<ResearchRecord, UploadError> {
        let main_image = self.resolve_image(&document.main_image);
        let pdf = self.resolve_pdf(&document.pdf);
        let topics = try_join_all(document.topics.iter().map(|t| self.resolve_topic(t)));

        let (main_image, pdf, topics) = futures::try_join!(main_image, pdf, topics)?;

        Ok(ResearchRecord {
            title: document.title.clone(),
            abstract_text: document.abstract_text.clone(),
            category: document
                .category
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
            main_image,
            pdf,
            topics,
        })
    }

    async fn resolve_topic(&self, topic: &Topic) -> Result<TopicRecord, UploadError> {
        let image = self.resolve_image(&topic.image);
        let subtopics = try_join_all(topic.subtopics.iter().map(|s| self.resolve_subtopic(s)));

        let (image, subtopics) = futures::try_join!(image, subtopics)?;

        Ok(TopicRecord {
            title: topic.title.clone(),
            description: topic.description.clone(),
            image,
            subtopics,
        })
    }

    async fn resolve_subtopic(&self, subtopic: &Subtopic) -> Result<SubtopicRecord, UploadError> {
        Ok(SubtopicRecord {
            title: subtopic.title.clone(),
            description: subtopic.description.clone(),
            image: self.resolve_image(&subtopic.image).await?,
        })
    }

    async fn resolve_image(&self, attachment: &Attachment) -> Result<Option<String>, UploadError> {
        match attachment {
            Attachment::Absent => Ok(None),
            Attachment::Resolved(url) => Ok(Some(url.clone())),
            Attachment::Pending(file) => {
                debug!(name = %file.name, bytes = file.len(), "Uploading image");
                self.images.upload(file).await.map(Some)
            }
        }
    }

    async fn resolve_pdf(&self, attachment: &Attachment) -> Result<Option<String>, UploadError> {
        match attachment {
            Attachment::Absent => Ok(None),
            Attachment::Resolved(url) => Ok(Some(url.clone())),
            Attachment::Pending(file) => {
                let namespace = pdf_namespace(&file.name, chrono::Utc::now().timestamp_millis());
                debug!(name = %file.name, namespace = %namespace, "Uploading PDF");
                self.pdfs.upload(file, &namespace).await.map(Some)
            }
        }
    }
}
