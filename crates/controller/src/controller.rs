//! The job controller: submission, polling, clearing, deletion.
//!
//! One controller instance owns one screen's generation state. All
//! methods take `&self`; the only shared mutable pieces are the state
//! watch channel (single writer: this controller) and the cancellation
//! slot for the in-flight poll. Submitting a new job or clearing the
//! controller cancels any outstanding scheduled poll, so a stale loop
//! never writes into state a newer operation owns.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use promptpix_backend::{
    ArtifactStore, BackendConfig, EdgeFunction, GenerateFn, InvokeRequest, JobStore, NoSession,
    RestJobStore, SessionProvider, StorageApi,
};
use promptpix_core::{ControllerError, Job, JobId, JobPatch, NewJob};

use crate::poll::{poll_job, PollConfig, PollOutcome};
use crate::state::GenerationState;

/// Successful outcome of [`JobController::submit`].
#[derive(Debug, Clone)]
pub struct Generated {
    /// Store-assigned id of the job that produced the image.
    pub job_id: JobId,
    /// Result locator of the generated artifact.
    pub image_url: String,
}

/// Drives a single generation job from submission to a terminal local
/// state and exposes that state to callers.
pub struct JobController {
    store: Arc<dyn JobStore>,
    generate: Arc<dyn GenerateFn>,
    artifacts: Arc<dyn ArtifactStore>,
    session: Arc<dyn SessionProvider>,
    /// Bearer used for the generation call when no user session exists.
    fallback_token: String,
    poll: PollConfig,
    state_tx: watch::Sender<GenerationState>,
    /// Cancellation token for the in-flight poll, if any.
    cancel: Mutex<CancellationToken>,
}

impl JobController {
    /// Build a controller over explicitly constructed collaborators.
    pub fn new(
        store: Arc<dyn JobStore>,
        generate: Arc<dyn GenerateFn>,
        artifacts: Arc<dyn ArtifactStore>,
        session: Arc<dyn SessionProvider>,
        fallback_token: impl Into<String>,
    ) -> Self {
        Self {
            store,
            generate,
            artifacts,
            session,
            fallback_token: fallback_token.into(),
            poll: PollConfig::default(),
            state_tx: watch::Sender::new(GenerationState::default()),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Build a controller wired to the hosted backend, sharing one
    /// `reqwest` connection pool across the HTTP clients. Uses
    /// [`NoSession`]; deployments with user auth pass their own
    /// provider to [`new`](Self::new).
    pub fn from_config(config: BackendConfig) -> Self {
        let client = reqwest::Client::new();
        let fallback_token = config.service_key.clone();

        Self::new(
            Arc::new(RestJobStore::with_client(client.clone(), config.clone())),
            Arc::new(EdgeFunction::with_client(client.clone(), config.clone())),
            Arc::new(StorageApi::with_client(client, config)),
            Arc::new(NoSession),
            fallback_token,
        )
    }

    /// Override the polling parameters (attempt budget, interval).
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Subscribe to state changes. Receivers observe every transition
    /// the controller publishes.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GenerationState {
        self.state_tx.borrow().clone()
    }

    /// Submit a prompt and drive the resulting job to a terminal
    /// outcome.
    ///
    /// Creates the job record, invokes the generation function with the
    /// session's access token (service key when signed out), then polls
    /// the record until it completes, fails, or the attempt budget runs
    /// out. The returned value reflects the *eventual* terminal outcome;
    /// intermediate states are observable via [`subscribe`](Self::subscribe).
    ///
    /// Any poll still scheduled for a previous job is cancelled first.
    pub async fn submit(
        &self,
        prompt: impl Into<String>,
        owner_id: Option<String>,
    ) -> Result<Generated, ControllerError> {
        let prompt = prompt.into();
        let token = self.replace_token().await;
        self.state_tx.send_replace(GenerationState::loading());

        tracing::info!(prompt_len = prompt.len(), "Submitting generation job");

        let record = match self.store.create(NewJob::new(&*prompt, owner_id)).await {
            Ok(record) => record,
            Err(e) => {
                let err =
                    ControllerError::SubmissionFailed(format!("failed to create job record: {e}"));
                self.fail_local(&token, &err);
                return Err(err);
            }
        };
        // A clear() or newer submit may have landed while the record
        // was being created; the state is theirs now.
        if token.is_cancelled() {
            return Err(Self::cancelled());
        }

        let job_id = record.id;
        self.state_tx
            .send_modify(|state| state.current_job_id = Some(job_id));

        tracing::info!(%job_id, "Job record created");

        let bearer = match self.session.access_token().await {
            Some(user_token) => user_token,
            None => self.fallback_token.clone(),
        };

        let request = InvokeRequest { prompt, job_id };
        let invoke_err = match self.generate.invoke(request, &bearer).await {
            Ok(response) if response.success => None,
            Ok(response) => Some(ControllerError::RemoteGenerationFailed(
                response.error.unwrap_or_else(|| "generation failed".into()),
            )),
            Err(e) => Some(ControllerError::SubmissionFailed(format!(
                "generation function rejected the call: {e}"
            ))),
        };

        if let Some(err) = invoke_err {
            self.mark_failed_remote(job_id, &err).await;
            self.fail_local(&token, &err);
            return Err(err);
        }

        match poll_job(self.store.as_ref(), job_id, &self.poll, &token).await {
            PollOutcome::Completed { image_url } => {
                if token.is_cancelled() {
                    return Err(Self::cancelled());
                }
                tracing::info!(%job_id, %image_url, "Generation completed");
                self.state_tx.send_replace(GenerationState {
                    loading: false,
                    error: None,
                    image_url: Some(image_url.clone()),
                    current_job_id: Some(job_id),
                });
                Ok(Generated { job_id, image_url })
            }
            PollOutcome::Failed(err) => {
                tracing::warn!(%job_id, error = %err, "Generation ended in failure");
                self.fail_local(&token, &err);
                Err(err)
            }
            PollOutcome::Cancelled => {
                // A newer submit or clear owns the state now.
                Err(Self::cancelled())
            }
        }
    }

    /// Reset local state to initial and cancel any outstanding poll.
    /// Idempotent. Remote records are untouched.
    pub async fn clear(&self) {
        self.replace_token().await;
        self.state_tx.send_replace(GenerationState::default());
    }

    /// Clear only the error field, keeping any result and tracked job.
    pub fn clear_error(&self) {
        self.state_tx.send_modify(|state| state.error = None);
    }

    /// Delete a job's stored artifact (best effort) and its record.
    ///
    /// On success, if `job_id` is the currently tracked job, local state
    /// is cleared as well. Returns whether the deletion succeeded;
    /// failures are also recorded in state as a [`ControllerError::DeletionFailed`]
    /// reason.
    pub async fn delete_current(&self, job_id: JobId) -> bool {
        tracing::info!(%job_id, "Deleting job");

        let record = match self.store.get(job_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.record_error(&ControllerError::DeletionFailed(
                    "job record not found".into(),
                ));
                return false;
            }
            Err(e) => {
                self.record_error(&ControllerError::DeletionFailed(format!(
                    "failed to fetch job record: {e}"
                )));
                return false;
            }
        };

        // Artifact removal is best effort; a dangling object is an
        // accepted gap and never blocks record deletion.
        if let Some(path) = record.storage_path.as_deref() {
            if let Err(e) = self.artifacts.remove(path).await {
                tracing::warn!(%job_id, path, error = %e, "Artifact removal failed, deleting record anyway");
            }
        }

        if let Err(e) = self.store.delete(job_id).await {
            self.record_error(&ControllerError::DeletionFailed(format!(
                "failed to delete job record: {e}"
            )));
            return false;
        }

        if self.state_tx.borrow().current_job_id == Some(job_id) {
            self.clear().await;
        }

        tracing::info!(%job_id, "Job deleted");
        true
    }

    /// List jobs for an owner (or the anonymous pool), newest first.
    /// Does not touch generation state.
    pub async fn history(&self, owner_id: Option<&str>) -> Result<Vec<Job>, ControllerError> {
        self.store
            .list(owner_id)
            .await
            .map_err(|e| ControllerError::PollFetchFailed(format!("failed to list jobs: {e}")))
    }

    // ---- private helpers ----

    /// Error returned by a submit superseded by a newer operation.
    fn cancelled() -> ControllerError {
        ControllerError::SubmissionFailed("request cancelled".into())
    }

    /// Cancel the outstanding poll (if any) and install a fresh token.
    async fn replace_token(&self) -> CancellationToken {
        let mut guard = self.cancel.lock().await;
        guard.cancel();
        *guard = CancellationToken::new();
        guard.clone()
    }

    /// Transition local state to failed, unless this operation has been
    /// superseded (its token cancelled) and no longer owns the state.
    fn fail_local(&self, token: &CancellationToken, err: &ControllerError) {
        if token.is_cancelled() {
            return;
        }
        self.state_tx.send_modify(|state| {
            state.loading = false;
            state.image_url = None;
            state.error = Some(err.reason());
        });
    }

    /// Record an error in state without touching the loading flag or
    /// result. Used by operations that run outside a submission.
    fn record_error(&self, err: &ControllerError) {
        tracing::warn!(error = %err, "Operation failed");
        self.state_tx
            .send_modify(|state| state.error = Some(err.reason()));
    }

    /// Best-effort write-back of a failure onto the stored record.
    async fn mark_failed_remote(&self, job_id: JobId, err: &ControllerError) {
        if let Err(update_err) = self.store.update(job_id, JobPatch::failed(err.reason())).await {
            tracing::warn!(%job_id, error = %update_err, "Failed to record failure on job record");
        }
    }
}
