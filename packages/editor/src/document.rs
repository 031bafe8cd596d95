//! # Research Document
//!
//! The authoring-time tree for a single research article.
//!
//! A Document is edited exclusively through [`Mutation`]s and persisted
//! through the submit pipeline. It can be:
//! - **Fresh**: one blank topic holding one blank subtopic, as a new form starts
//! - **Empty**: no topics at all (`Document::default()`)
//! - **Loaded**: rebuilt from a stored record, every attachment resolved
//!
//! ## Lifecycle
//!
//! ```text
//! new/load → Mutations → submit → resolved
//!     ↓          ↓          ↓         ↓
//!   tree     tree edits  uploads   URLs only
//! ```

use crate::record::ResearchRecord;
use crate::{AttachmentTarget, Mutation, MutationError, MutationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject area a research article is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Engineering,
    MedicalSciences,
    EarthSciences,
    SocialSciences,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Engineering,
        Category::MedicalSciences,
        Category::EarthSciences,
        Category::SocialSciences,
        Category::Others,
    ];

    /// Label used in stored records and shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Category::Engineering => "Engineering",
            Category::MedicalSciences => "Medical Sciences",
            Category::EarthSciences => "Earth Sciences",
            Category::SocialSciences => "Social Sciences",
            Category::Others => "Others",
        }
    }
}

impl FromStr for Category {
    type Err = MutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| MutationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A local binary that has not been uploaded yet
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads can be megabytes; print the size instead.
impl fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Tri-state attachment field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachment {
    /// Nothing attached
    #[default]
    Absent,

    /// Chosen locally, uploaded on submit
    Pending(PendingFile),

    /// Durable URL returned by an upload service
    Resolved(String),
}

impl Attachment {
    /// Build from a stored value; empty strings count as absent
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Attachment::Resolved(url),
            _ => Attachment::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Attachment::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Attachment::Pending(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Attachment::Resolved(url) => Some(url),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingFile> {
        match self {
            Attachment::Pending(file) => Some(file),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subtopic {
    pub title: String,
    pub description: String,
    pub image: Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topic {
    pub title: String,
    pub description: String,
    pub image: Attachment,
    pub subtopics: Vec<Subtopic>,
}

impl Topic {
    /// Empty topic seeded with one empty subtopic
    pub fn blank() -> Self {
        Self {
            subtopics: vec![Subtopic::default()],
            ..Self::default()
        }
    }
}

/// Editable research document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub title: String,
    pub abstract_text: String,
    pub category: Option<Category>,
    pub main_image: Attachment,
    pub pdf: Attachment,
    pub topics: Vec<Topic>,

    /// Current version number (increments on each applied mutation)
    pub version: u64,
}

impl Document {
    /// Fresh editor document: one blank topic with one blank subtopic
    pub fn new() -> Self {
        Self {
            topics: vec![Topic::blank()],
            ..Self::default()
        }
    }

    /// Apply a mutation, bumping the version only when it succeeds
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, MutationError> {
        mutation.apply(self)?;
        self.version += 1;

        Ok(MutationResult {
            version: self.version,
        })
    }

    /// Look up an attachment field by target
    pub fn attachment(&self, target: AttachmentTarget) -> Option<&Attachment> {
        match target {
            AttachmentTarget::Main => Some(&self.main_image),
            AttachmentTarget::Pdf => Some(&self.pdf),
            AttachmentTarget::Topic { topic } => self.topics.get(topic).map(|t| &t.image),
            AttachmentTarget::Subtopic { topic, subtopic } => self
                .topics
                .get(topic)
                .and_then(|t| t.subtopics.get(subtopic))
                .map(|s| &s.image),
        }
    }

    /// Every attachment in tree order
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        [&self.main_image, &self.pdf].into_iter().chain(
            self.topics.iter().flat_map(|topic| {
                std::iter::once(&topic.image).chain(topic.subtopics.iter().map(|s| &s.image))
            }),
        )
    }

    /// Number of attachments still waiting for upload
    pub fn pending_uploads(&self) -> usize {
        self.attachments().filter(|a| a.is_pending()).count()
    }

    /// Replace every attachment with the URL the record holds at the same
    /// position. The record must have been assembled from this tree.
    pub fn adopt_resolved(&mut self, record: &ResearchRecord) {
        self.main_image = Attachment::from_url(record.main_image.clone());
        self.pdf = Attachment::from_url(record.pdf.clone());

        for (topic, topic_record) in self.topics.iter_mut().zip(&record.topics) {
            topic.image = Attachment::from_url(topic_record.image.clone());

            for (subtopic, subtopic_record) in topic.subtopics.iter_mut().zip(&topic_record.subtopics) {
                subtopic.image = Attachment::from_url(subtopic_record.image.clone());
            }
        }
    }
}
