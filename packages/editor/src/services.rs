//! # External Services
//!
//! Seams for the hosted collaborators the editor talks to. Everything is
//! injected through [`Services`]; nothing is reached through globals, so tests
//! substitute in-memory fakes.

use crate::document::PendingFile;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Collection holding research documents
pub const RESEARCH_COLLECTION: &str = "research";

/// Collection holding review submissions
pub const SUBMISSIONS_COLLECTION: &str = "submissions";

/// Store path for a research document
pub fn research_path(id: &str) -> String {
    format!("{}/{}", RESEARCH_COLLECTION, id)
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store rejected {method} {path} with status {status}")]
    Rejected {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid store path: {0:?}")]
    InvalidPath(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload of {name} rejected with status {status}")]
    Rejected { name: String, status: u16 },

    #[error("Upload of {name} failed: {message}")]
    Failed { name: String, message: String },

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Keyed document store addressed by slash-separated paths
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`; `None` when nothing is stored there
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Full replace of the value at `path`
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Generate a fresh, unused key inside `collection`
    async fn new_key(&self, collection: &str) -> Result<String, StoreError>;

    /// Direct children of `collection` as `(key, value)` pairs
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;
}

/// Turns an image binary into a public URL
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: &PendingFile) -> Result<String, UploadError>;
}

/// Turns a PDF binary into a public URL stored under `namespace`
#[async_trait]
pub trait PdfUploader: Send + Sync {
    async fn upload(&self, file: &PendingFile, namespace: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: String,
    pub email: Option<String>,
}

/// Who is signed in; produced by the auth layer, only consumed here
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Fixed identity, for CLIs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<UserIdentity>,
}

impl StaticAuth {
    pub fn signed_in(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user: Some(UserIdentity {
                uid: uid.into(),
                email,
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl AuthContext for StaticAuth {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}

/// Bundle of injected collaborators
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub images: Arc<dyn ImageUploader>,
    pub pdfs: Arc<dyn PdfUploader>,
    pub auth: Arc<dyn AuthContext>,
}
