//! Research catalog: summaries, title search and deletion over `research/`.

use crate::document::Category;
use crate::record::ResearchRecord;
use crate::services::{research_path, DocumentStore, RESEARCH_COLLECTION};
use crate::EditorError;
use std::sync::Arc;
use tracing::{info, warn};

/// Abstract preview length, in characters
pub const PREVIEW_LIMIT: usize = 100;

/// How many search hits are shown by default
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Cut `text` to `limit` characters, appending `...` when anything was cut
pub fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSummary {
    pub id: String,
    pub title: String,
    pub abstract_preview: String,
    pub category: Option<Category>,
    pub main_image: Option<String>,
    pub topic_count: usize,
}

impl ResearchSummary {
    fn from_record(id: String, record: &ResearchRecord) -> Self {
        Self {
            id,
            title: record.title.clone(),
            abstract_preview: truncate_text(&record.abstract_text, PREVIEW_LIMIT),
            category: record.parsed_category(),
            main_image: record.main_image.clone(),
            topic_count: record.topics.len(),
        }
    }
}

pub struct Catalog {
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every readable research record, in key order
    ///
    /// Entries that do not decode as research records are skipped.
    pub async fn list(&self) -> Result<Vec<ResearchSummary>, EditorError> {
        let entries = self.store.list(RESEARCH_COLLECTION).await?;

        Ok(entries
            .into_iter()
            .filter_map(|(id, value)| {
                match ResearchRecord::from_value(&research_path(&id), value) {
                    Ok(record) => Some(ResearchSummary::from_record(id, &record)),
                    Err(e) => {
                        warn!(id = %id, error = %e, "Skipping unreadable research entry");
                        None
                    }
                }
            })
            .collect())
    }

    /// Case-insensitive title search, at most `limit` hits
    pub async fn search(&self, term: &str, limit: usize) -> Result<Vec<ResearchSummary>, EditorError> {
        let needle = term.trim().to_lowercase();

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|summary| summary.title.to_lowercase().contains(&needle))
            .take(limit)
            .collect())
    }

    /// Full stored record for `id`
    pub async fn fetch(&self, id: &str) -> Result<ResearchRecord, EditorError> {
        let path = research_path(id);
        let value = self
            .store
            .read(&path)
            .await?
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;

        ResearchRecord::from_value(&path, value)
    }

    pub async fn delete(&self, id: &str) -> Result<(), EditorError> {
        let path = research_path(id);
        self.store.delete(&path).await?;

        info!(path = %path, "Research deleted");
        Ok(())
    }
}
