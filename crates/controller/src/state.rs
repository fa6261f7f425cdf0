//! Local controller state observed by presentation layers.

use promptpix_core::JobId;

/// Snapshot of the controller's local state.
///
/// Within a submission, `error` and `image_url` are mutually
/// exclusive: every terminal transition that sets one clears the
/// other. Operations outside a submission (deletion, listing) record
/// an error without disturbing a previously displayed result.
/// `Default` is the initial state — not loading, nothing tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationState {
    /// True from submission until a terminal outcome is reached.
    pub loading: bool,
    /// Human-readable failure reason for the last terminal failure.
    pub error: Option<String>,
    /// Result locator of the last completed generation.
    pub image_url: Option<String>,
    /// The job currently tracked by this controller instance.
    pub current_job_id: Option<JobId>,
}

impl GenerationState {
    /// State at the start of a submission: loading, nothing else set.
    pub(crate) fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}
