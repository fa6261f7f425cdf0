//! Generation job record and DTOs.
//!
//! The job store owns the canonical record; these types mirror its wire
//! shape. Status strings the store may grow in the future deserialize
//! into [`JobStatus::Unknown`] instead of failing the whole fetch, so
//! the controller can surface them as a distinct failure.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Lifecycle status of a generation job as recorded by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Record created, generation not yet started.
    Pending,
    /// The remote generation function is working on the job.
    Generating,
    /// Generation finished; `image_url` should be populated.
    Completed,
    /// Generation failed; `error_message` should be populated.
    Failed,
    /// Any status string this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the job is still being worked on (poll again later).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Generating)
    }
}

/// A row from the `generated_images` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub status: JobStatus,
    /// Result locator; populated only when `status` is `Completed`.
    pub image_url: Option<String>,
    /// Failure reason; populated only when `status` is `Failed`.
    pub error_message: Option<String>,
    /// Path of the stored artifact inside the storage bucket.
    pub storage_path: Option<String>,
    /// Owning user; `None` for anonymous submissions.
    pub owner_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new job record.
///
/// The store assigns the id and timestamps; status starts as `Pending`.
#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub prompt: String,
    pub owner_id: Option<String>,
    pub status: JobStatus,
}

impl NewJob {
    pub fn new(prompt: impl Into<String>, owner_id: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            owner_id,
            status: JobStatus::Pending,
        }
    }
}

/// Partial update applied to an existing job record.
///
/// `None` fields are omitted from the serialized patch entirely, so the
/// store leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl JobPatch {
    /// Patch marking a job as failed with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error_message: Some(reason.into()),
            updated_at: Some(chrono::Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let s = serde_json::to_string(&JobStatus::Generating).unwrap();
        assert_eq!(s, "\"generating\"");
    }

    #[test]
    fn unrecognised_status_maps_to_unknown() {
        let s: JobStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(s, JobStatus::Unknown);
    }

    #[test]
    fn only_pending_and_generating_are_active() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Generating.is_active());
        assert!(!JobStatus::Completed.is_active());
        assert!(!JobStatus::Failed.is_active());
        assert!(!JobStatus::Unknown.is_active());
    }

    #[test]
    fn failed_patch_sets_status_and_reason() {
        let patch = JobPatch::failed("edge function rejected the call");
        assert_eq!(patch.status, Some(JobStatus::Failed));
        assert_eq!(
            patch.error_message.as_deref(),
            Some("edge function rejected the call")
        );
        assert!(patch.updated_at.is_some());
    }

    #[test]
    fn default_patch_serializes_empty() {
        let v = serde_json::to_value(JobPatch::default()).unwrap();
        assert_eq!(v, serde_json::json!({}));
    }
}
