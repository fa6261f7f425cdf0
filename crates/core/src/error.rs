//! Controller-level error taxonomy.
//!
//! Every variant carries a human-readable reason. The controller
//! converts each into local state (loading cleared, error populated)
//! before returning it, so presentation layers never have to unwind
//! anything — they observe a message and a cleared loading flag.

/// Terminal failures surfaced by the job controller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ControllerError {
    /// Record creation or generation-function invocation was rejected.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// A status fetch errored or the record disappeared mid-poll.
    #[error("Status fetch failed: {0}")]
    PollFetchFailed(String),

    /// The generation function reported a terminal failure.
    #[error("Generation failed: {0}")]
    RemoteGenerationFailed(String),

    /// The attempt budget ran out while the job was still active.
    #[error("Generation timed out after {attempts} attempts")]
    TimedOut {
        /// Number of status fetches issued before giving up.
        attempts: u32,
    },

    /// Deleting the job record or its artifact failed.
    #[error("Deletion failed: {0}")]
    DeletionFailed(String),
}

impl ControllerError {
    /// The message shown to the user, mirroring [`std::fmt::Display`].
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_reason_mentions_timeout() {
        let err = ControllerError::TimedOut { attempts: 30 };
        assert!(err.reason().contains("timed out"));
        assert!(err.reason().contains("30"));
    }

    #[test]
    fn reasons_carry_the_message() {
        let err = ControllerError::RemoteGenerationFailed("quota exceeded".into());
        assert!(err.reason().contains("quota exceeded"));
    }
}
