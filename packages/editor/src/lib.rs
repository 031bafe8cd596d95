//! # Journal Editor
//!
//! Core authoring engine for research-journal articles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: authoring tree                    │
//! │  - title / abstract / category              │
//! │  - main image + PDF attachments             │
//! │  - topics[] → subtopics[] (index-addressed) │
//! └─────────────────────────────────────────────┘
//!                     ↓  Mutation::apply
//! ┌─────────────────────────────────────────────┐
//! │ session: caller-side guards                 │
//! │  - auth + required fields                   │
//! │  - one submit at a time                     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: resolve attachments → write       │
//! │  - concurrent uploads, fail-fast join       │
//! │  - flat ResearchRecord, full-replace write  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Indices are addresses**: topics and subtopics carry no identifiers
//! 2. **Attachments are tri-state**: absent, pending binary, or resolved URL
//! 3. **Injected services**: store, uploaders and auth are trait objects
//! 4. **All-or-nothing persistence**: the store write is the only side effect
//!    that depends on every upload succeeding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use journal_editor::{EditSession, Mutation, Services, TextField};
//!
//! let mut session = EditSession::new(services);
//! session.apply(Mutation::SetTopicField {
//!     topic: 0,
//!     field: TextField::Title,
//!     value: "Background".to_string(),
//! })?;
//!
//! let outcome = session.submit().await?;
//! println!("saved research/{}", outcome.id);
//! ```

mod catalog;
mod document;
mod errors;
mod keys;
mod memory;
mod mutations;
mod pipeline;
mod record;
mod review;
mod services;
mod session;

#[cfg(feature = "http")]
mod http;

pub use catalog::{truncate_text, Catalog, ResearchSummary, DEFAULT_PAGE_SIZE, PREVIEW_LIMIT};
pub use document::{Attachment, Category, Document, PendingFile, Subtopic, Topic};
pub use errors::EditorError;
pub use keys::KeyGenerator;
pub use memory::{MemoryStore, StoreOp};
pub use mutations::{AttachmentTarget, DocumentField, Mutation, MutationError, MutationResult, TextField};
pub use pipeline::{pdf_namespace, SubmitOutcome, SubmitPipeline};
pub use record::{ResearchRecord, SubtopicRecord, TopicRecord};
pub use review::{ReviewDesk, Submission, SubmissionStatus};
pub use services::{
    research_path, AuthContext, DocumentStore, ImageUploader, PdfUploader, Services, StaticAuth,
    StoreError, UploadError, UserIdentity, RESEARCH_COLLECTION, SUBMISSIONS_COLLECTION,
};
pub use session::{EditSession, SubmitTicket};

#[cfg(feature = "http")]
pub use http::{
    BucketPdfUploader, ImageHostUploader, RestStore, DEFAULT_BUCKET_API, DEFAULT_IMAGE_ENDPOINT,
};
