//! Error types for the editor

use crate::mutations::MutationError;
use crate::services::{StoreError, UploadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Research not found: {0}")]
    NotFound(String),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("A submit is already in progress")]
    SubmitInProgress,

    #[error("No authenticated user")]
    Unauthenticated,

    #[error("Malformed record at {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
