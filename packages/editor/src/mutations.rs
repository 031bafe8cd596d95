//! # Document Mutations
//!
//! Index-addressed edits on a research [`Document`].
//!
//! ## Design Principles
//!
//! 1. **Validated**: every mutation checks its indices before touching the tree
//! 2. **Atomic**: a failed mutation leaves the document unchanged
//! 3. **Positional**: topics and subtopics are addressed by their current index
//!
//! ## Index Semantics
//!
//! ### Add
//! - Always appends; indices of existing entries are unaffected
//!
//! ### Remove
//! - Later siblings shift down by one
//! - Out-of-range indices fail with `TopicOutOfRange` / `SubtopicOutOfRange`
//!   instead of being ignored
//!
//! ### SetAttachment
//! - The field becomes `Pending`, replacing any previous state

use crate::document::{Attachment, Category, Document, PendingFile, Subtopic, Topic};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scalar fields on the document root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentField {
    Title,
    Abstract,
    Category,
}

/// Scalar fields shared by topics and subtopics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Title,
    Description,
}

/// Which attachment field an edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AttachmentTarget {
    Main,
    Pdf,
    Topic { topic: usize },
    Subtopic { topic: usize, subtopic: usize },
}

/// Editor operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Set title, abstract or category (empty category clears it)
    SetField { field: DocumentField, value: String },

    /// Put a local binary on an attachment field
    SetAttachment {
        target: AttachmentTarget,
        file: PendingFile,
    },

    /// Drop whatever the attachment field holds
    ClearAttachment { target: AttachmentTarget },

    /// Append a blank topic (with one blank subtopic)
    AddTopic,

    RemoveTopic { topic: usize },

    /// Append a blank subtopic to a topic
    AddSubtopic { topic: usize },

    RemoveSubtopic { topic: usize, subtopic: usize },

    SetTopicField {
        topic: usize,
        field: TextField,
        value: String,
    },

    SetSubtopicField {
        topic: usize,
        subtopic: usize,
        field: TextField,
        value: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Topic index {index} out of range ({len} topics)")]
    TopicOutOfRange { index: usize, len: usize },

    #[error("Subtopic index {index} out of range (topic {topic} has {len} subtopics)")]
    SubtopicOutOfRange { topic: usize, index: usize, len: usize },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(self, doc: &mut Document) -> Result<(), MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::SetField { field, value } => {
                match field {
                    DocumentField::Title => doc.title = value,
                    DocumentField::Abstract => doc.abstract_text = value,
                    DocumentField::Category => doc.category = parse_category(&value)?,
                }
                Ok(())
            }

            Mutation::SetAttachment { target, file } => {
                *Self::attachment_mut(doc, target)? = Attachment::Pending(file);
                Ok(())
            }

            Mutation::ClearAttachment { target } => {
                *Self::attachment_mut(doc, target)? = Attachment::Absent;
                Ok(())
            }

            Mutation::AddTopic => {
                doc.topics.push(Topic::blank());
                Ok(())
            }

            Mutation::RemoveTopic { topic } => {
                doc.topics.remove(topic);
                Ok(())
            }

            Mutation::AddSubtopic { topic } => {
                topic_mut(doc, topic)?.subtopics.push(Subtopic::default());
                Ok(())
            }

            Mutation::RemoveSubtopic { topic, subtopic } => {
                topic_mut(doc, topic)?.subtopics.remove(subtopic);
                Ok(())
            }

            Mutation::SetTopicField { topic, field, value } => {
                let topic = topic_mut(doc, topic)?;
                match field {
                    TextField::Title => topic.title = value,
                    TextField::Description => topic.description = value,
                }
                Ok(())
            }

            Mutation::SetSubtopicField {
                topic,
                subtopic,
                field,
                value,
            } => {
                let subtopic = subtopic_mut(doc, topic, subtopic)?;
                match field {
                    TextField::Title => subtopic.title = value,
                    TextField::Description => subtopic.description = value,
                }
                Ok(())
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::SetField {
                field: DocumentField::Category,
                value,
            } => parse_category(value).map(|_| ()),

            Mutation::SetField { .. } | Mutation::AddTopic => Ok(()),

            Mutation::SetAttachment { target, .. } | Mutation::ClearAttachment { target } => {
                check_target(doc, *target)
            }

            Mutation::RemoveTopic { topic }
            | Mutation::AddSubtopic { topic }
            | Mutation::SetTopicField { topic, .. } => check_topic(doc, *topic),

            Mutation::RemoveSubtopic { topic, subtopic }
            | Mutation::SetSubtopicField { topic, subtopic, .. } => {
                check_subtopic(doc, *topic, *subtopic)
            }
        }
    }

    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetField { .. } => "set_field",
            Mutation::SetAttachment { .. } => "set_attachment",
            Mutation::ClearAttachment { .. } => "clear_attachment",
            Mutation::AddTopic => "add_topic",
            Mutation::RemoveTopic { .. } => "remove_topic",
            Mutation::AddSubtopic { .. } => "add_subtopic",
            Mutation::RemoveSubtopic { .. } => "remove_subtopic",
            Mutation::SetTopicField { .. } => "set_topic_field",
            Mutation::SetSubtopicField { .. } => "set_subtopic_field",
        }
    }

    fn attachment_mut(
        doc: &mut Document,
        target: AttachmentTarget,
    ) -> Result<&mut Attachment, MutationError> {
        match target {
            AttachmentTarget::Main => Ok(&mut doc.main_image),
            AttachmentTarget::Pdf => Ok(&mut doc.pdf),
            AttachmentTarget::Topic { topic } => Ok(&mut topic_mut(doc, topic)?.image),
            AttachmentTarget::Subtopic { topic, subtopic } => {
                Ok(&mut subtopic_mut(doc, topic, subtopic)?.image)
            }
        }
    }
}

fn parse_category(value: &str) -> Result<Option<Category>, MutationError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

fn check_topic(doc: &Document, topic: usize) -> Result<(), MutationError> {
    if topic < doc.topics.len() {
        Ok(())
    } else {
        Err(MutationError::TopicOutOfRange {
            index: topic,
            len: doc.topics.len(),
        })
    }
}

fn check_subtopic(doc: &Document, topic: usize, subtopic: usize) -> Result<(), MutationError> {
    check_topic(doc, topic)?;

    let len = doc.topics[topic].subtopics.len();
    if subtopic < len {
        Ok(())
    } else {
        Err(MutationError::SubtopicOutOfRange {
            topic,
            index: subtopic,
            len,
        })
    }
}

fn check_target(doc: &Document, target: AttachmentTarget) -> Result<(), MutationError> {
    match target {
        AttachmentTarget::Main | AttachmentTarget::Pdf => Ok(()),
        AttachmentTarget::Topic { topic } => check_topic(doc, topic),
        AttachmentTarget::Subtopic { topic, subtopic } => check_subtopic(doc, topic, subtopic),
    }
}

fn topic_mut(doc: &mut Document, topic: usize) -> Result<&mut Topic, MutationError> {
    let len = doc.topics.len();
    doc.topics
        .get_mut(topic)
        .ok_or(MutationError::TopicOutOfRange { index: topic, len })
}

fn subtopic_mut(
    doc: &mut Document,
    topic: usize,
    subtopic: usize,
) -> Result<&mut Subtopic, MutationError> {
    let parent = topic_mut(doc, topic)?;
    let len = parent.subtopics.len();
    parent
        .subtopics
        .get_mut(subtopic)
        .ok_or(MutationError::SubtopicOutOfRange {
            topic,
            index: subtopic,
            len,
        })
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,
}
