//! Bounded fixed-interval polling of a job's stored status.
//!
//! One attempt is a fetch-and-evaluate cycle against the job store.
//! Attempts are strictly sequential; the loop never issues attempt N+1
//! before attempt N's result is known. The first terminal evaluation
//! ends the loop. A cancelled token abandons the loop between attempts
//! so a newer operation can take over the controller state.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use promptpix_backend::JobStore;
use promptpix_core::{ControllerError, Job, JobId, JobStatus};

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of status fetches before giving up.
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts.
    pub interval: Duration,
}

impl Default for PollConfig {
    /// 30 attempts at 2-second intervals: 60 seconds of wall clock.
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

/// Terminal result of a polling run.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job completed with a result locator.
    Completed {
        /// URL of the generated artifact.
        image_url: String,
    },
    /// The job reached a terminal failure (including timeout).
    Failed(ControllerError),
    /// The cancellation token fired before a terminal status was seen.
    Cancelled,
}

/// Poll `job_id` until it reaches a terminal state, the attempt budget
/// runs out, or `cancel` fires.
pub async fn poll_job(
    store: &dyn JobStore,
    job_id: JobId,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> PollOutcome {
    let mut attempt = 0u32;

    loop {
        if cancel.is_cancelled() {
            tracing::debug!(%job_id, attempt, "Poll cancelled");
            return PollOutcome::Cancelled;
        }

        attempt += 1;
        tracing::debug!(
            %job_id,
            attempt,
            max_attempts = config.max_attempts,
            "Fetching job status",
        );

        let job = match store.get(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                return PollOutcome::Failed(ControllerError::PollFetchFailed(
                    "job record not found".into(),
                ));
            }
            Err(e) => {
                return PollOutcome::Failed(ControllerError::PollFetchFailed(format!(
                    "status fetch failed: {e}"
                )));
            }
        };

        // The token may have fired while the fetch was in flight; the
        // state now belongs to a newer operation, so this outcome must
        // not be reported.
        if cancel.is_cancelled() {
            tracing::debug!(%job_id, attempt, "Poll cancelled");
            return PollOutcome::Cancelled;
        }

        if let Some(outcome) = evaluate(&job) {
            return outcome;
        }

        if attempt >= config.max_attempts {
            tracing::warn!(%job_id, attempt, "Giving up on job, still not terminal");
            return PollOutcome::Failed(ControllerError::TimedOut { attempts: attempt });
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

/// Evaluate one fetched record. `None` means the job is still active
/// and the loop should keep waiting.
fn evaluate(job: &Job) -> Option<PollOutcome> {
    if job.status.is_active() {
        return None;
    }
    match job.status {
        JobStatus::Completed => match job.image_url.as_deref() {
            Some(url) if !url.is_empty() => Some(PollOutcome::Completed {
                image_url: url.to_string(),
            }),
            _ => Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(
                "completed without result".into(),
            ))),
        },
        JobStatus::Failed => {
            let reason = job
                .error_message
                .clone()
                .unwrap_or_else(|| "generation failed".into());
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(
                reason,
            )))
        }
        // Pending and Generating returned above; anything else is a
        // status this client does not understand.
        _ => Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(
            "unknown status".into(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use promptpix_core::Timestamp;

    use super::*;

    fn job_with(status: JobStatus, image_url: Option<&str>, error: Option<&str>) -> Job {
        let now: Timestamp = chrono::Utc::now();
        Job {
            id: uuid::Uuid::new_v4(),
            prompt: "a lighthouse in a storm".into(),
            status,
            image_url: image_url.map(String::from),
            error_message: error.map(String::from),
            storage_path: None,
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_statuses_keep_waiting() {
        assert!(evaluate(&job_with(JobStatus::Pending, None, None)).is_none());
        assert!(evaluate(&job_with(JobStatus::Generating, None, None)).is_none());
    }

    #[test]
    fn completed_with_locator_succeeds() {
        let outcome = evaluate(&job_with(
            JobStatus::Completed,
            Some("https://cdn.example/img.png"),
            None,
        ));
        assert_matches!(
            outcome,
            Some(PollOutcome::Completed { image_url }) if image_url == "https://cdn.example/img.png"
        );
    }

    #[test]
    fn completed_without_locator_fails() {
        let outcome = evaluate(&job_with(JobStatus::Completed, None, None));
        assert_matches!(
            outcome,
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(reason)))
                if reason == "completed without result"
        );
    }

    #[test]
    fn empty_locator_counts_as_missing() {
        let outcome = evaluate(&job_with(JobStatus::Completed, Some(""), None));
        assert_matches!(
            outcome,
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(_)))
        );
    }

    #[test]
    fn failed_uses_stored_reason() {
        let outcome = evaluate(&job_with(JobStatus::Failed, None, Some("nsfw filter")));
        assert_matches!(
            outcome,
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(reason)))
                if reason == "nsfw filter"
        );
    }

    #[test]
    fn failed_without_reason_uses_default() {
        let outcome = evaluate(&job_with(JobStatus::Failed, None, None));
        assert_matches!(
            outcome,
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(reason)))
                if reason == "generation failed"
        );
    }

    #[test]
    fn unknown_status_fails() {
        let outcome = evaluate(&job_with(JobStatus::Unknown, None, None));
        assert_matches!(
            outcome,
            Some(PollOutcome::Failed(ControllerError::RemoteGenerationFailed(reason)))
                if reason == "unknown status"
        );
    }

    #[test]
    fn default_config_bounds_wall_clock_to_a_minute() {
        let config = PollConfig::default();
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.interval * config.max_attempts, Duration::from_secs(60));
    }
}
