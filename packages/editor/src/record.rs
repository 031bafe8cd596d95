//! Persisted form of a research document.
//!
//! Attachments are plain URLs (or `null`) here. Fields the store dropped
//! (it does not keep nulls or empty arrays) deserialize to their defaults.

use crate::document::{Attachment, Category, Document, Subtopic, Topic};
use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRecord {
    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub main_image: Option<String>,

    #[serde(default)]
    pub pdf: Option<String>,

    #[serde(default)]
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub subtopics: Vec<SubtopicRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubtopicRecord {
    #[serde(default, rename = "subtopicTitle")]
    pub title: String,

    #[serde(default, rename = "subtopicDescription")]
    pub description: String,

    #[serde(default, rename = "subtopicImage")]
    pub image: Option<String>,
}

impl ResearchRecord {
    /// Decode a stored value, naming the path on failure
    pub fn from_value(path: &str, value: Value) -> Result<Self, EditorError> {
        serde_json::from_value(value).map_err(|source| EditorError::Malformed {
            path: path.to_string(),
            source,
        })
    }

    pub fn to_value(&self) -> Value {
        // Only strings, options and vectors: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn parsed_category(&self) -> Option<Category> {
        if self.category.trim().is_empty() {
            return None;
        }

        match self.category.parse() {
            Ok(category) => Some(category),
            Err(_) => {
                warn!(category = %self.category, "Ignoring unknown category on stored record");
                None
            }
        }
    }

    /// Rebuild an editable tree; every attachment arrives resolved
    pub fn into_document(self) -> Document {
        let category = self.parsed_category();

        Document {
            title: self.title,
            abstract_text: self.abstract_text,
            category,
            main_image: Attachment::from_url(self.main_image),
            pdf: Attachment::from_url(self.pdf),
            topics: self.topics.into_iter().map(TopicRecord::into_topic).collect(),
            version: 0,
        }
    }
}

impl TopicRecord {
    fn into_topic(self) -> Topic {
        Topic {
            title: self.title,
            description: self.description,
            image: Attachment::from_url(self.image),
            subtopics: self
                .subtopics
                .into_iter()
                .map(|s| Subtopic {
                    title: s.title,
                    description: s.description,
                    image: Attachment::from_url(s.image),
                })
                .collect(),
        }
    }
}
