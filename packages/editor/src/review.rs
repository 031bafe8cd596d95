//! # Review Desk
//!
//! Admin triage of submissions stored under `submissions/`.
//!
//! ```text
//!            ┌──→ approved
//! pending ───┼──→ rejected
//!            └──→ revision requested
//! ```
//!
//! Admins may move a submission from any status to any other status.

use crate::services::{DocumentStore, SUBMISSIONS_COLLECTION};
use crate::EditorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    RevisionRequested,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
        SubmissionStatus::RevisionRequested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::RevisionRequested => "revision requested",
        }
    }

    /// Statuses an admin can move a submission to from here
    pub fn transitions(&self) -> Vec<SubmissionStatus> {
        Self::ALL.into_iter().filter(|s| s != self).collect()
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown submission status: {}", s))
    }
}

// Stored data predates the workflow; anything unrecognised is still pending.
impl From<String> for SubmissionStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<SubmissionStatus> for String {
    fn from(status: SubmissionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission under review
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub status: SubmissionStatus,

    #[serde(default)]
    pub review_comments: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Fields this crate does not model, kept across rewrites
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submission {
    /// When the submission arrived: submitted time, else created time
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at.or(self.created_at)
    }
}

fn submission_path(id: &str) -> String {
    format!("{}/{}", SUBMISSIONS_COLLECTION, id)
}

fn decode(id: &str, value: Value) -> Result<Submission, EditorError> {
    let mut submission: Submission =
        serde_json::from_value(value).map_err(|source| EditorError::Malformed {
            path: submission_path(id),
            source,
        })?;
    submission.id = id.to_string();
    Ok(submission)
}

fn encode(submission: &Submission) -> Value {
    serde_json::to_value(submission).unwrap_or(Value::Null)
}

pub struct ReviewDesk {
    store: Arc<dyn DocumentStore>,
}

impl ReviewDesk {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All submissions, most recently received first
    ///
    /// Entries that do not decode are skipped.
    pub async fn list(&self) -> Result<Vec<Submission>, EditorError> {
        let mut submissions: Vec<Submission> = self
            .store
            .list(SUBMISSIONS_COLLECTION)
            .await?
            .into_iter()
            .filter_map(|(id, value)| match decode(&id, value) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping unreadable submission");
                    None
                }
            })
            .collect();

        // None sorts before Some, so reversing puts undated entries last.
        submissions.sort_by(|a, b| b.received_at().cmp(&a.received_at()));
        Ok(submissions)
    }

    pub async fn get(&self, id: &str) -> Result<Submission, EditorError> {
        let value = self
            .store
            .read(&submission_path(id))
            .await?
            .ok_or_else(|| EditorError::NotFound(id.to_string()))?;

        decode(id, value)
    }

    /// File a new pending submission
    pub async fn enqueue(
        &self,
        title: &str,
        email: Option<String>,
        file_url: Option<String>,
    ) -> Result<Submission, EditorError> {
        let id = self.store.new_key(SUBMISSIONS_COLLECTION).await?;
        let now = Utc::now();

        let submission = Submission {
            id: id.clone(),
            title: title.to_string(),
            email,
            file_url,
            created_at: Some(now),
            submitted_at: Some(now),
            ..Submission::default()
        };

        self.store.write(&submission_path(&id), encode(&submission)).await?;
        info!(id = %id, "Submission enqueued");

        Ok(submission)
    }

    /// Set status (and optionally replace review comments), stamping `updatedAt`
    pub async fn update(
        &self,
        id: &str,
        status: SubmissionStatus,
        comments: Option<String>,
    ) -> Result<Submission, EditorError> {
        let mut submission = self.get(id).await?;
        let previous = submission.status;

        submission.status = status;
        if let Some(comments) = comments {
            submission.review_comments = comments;
        }
        submission.updated_at = Some(Utc::now());

        self.store.write(&submission_path(id), encode(&submission)).await?;
        info!(id = %id, from = %previous, to = %status, "Submission status updated");

        Ok(submission)
    }
}
