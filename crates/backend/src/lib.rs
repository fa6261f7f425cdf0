//! HTTP client library for the promptpix backend-as-a-service.
//!
//! Each external collaborator the controller depends on is expressed as
//! a trait with a [`reqwest`]-backed implementation:
//!
//! - [`JobStore`] / [`RestJobStore`] — CRUD on the job table via the
//!   PostgREST-style `/rest/v1` endpoint.
//! - [`GenerateFn`] / [`EdgeFunction`] — the remote generation function
//!   at `/functions/v1/<name>`.
//! - [`ArtifactStore`] / [`StorageApi`] — binary object deletion via
//!   `/storage/v1`.
//! - [`SessionProvider`] — bearer-token source for authorizing the
//!   generation call, with a service-key fallback.
//!
//! Clients are explicitly constructed and cheap to clone; nothing here
//! is a process-wide singleton, so tests can substitute any seam.

pub mod config;
pub mod generate;
pub mod session;
pub mod storage;
pub mod store;

pub use config::BackendConfig;
pub use generate::{EdgeFunction, GenerateFn, InvokeRequest, InvokeResponse};
pub use session::{NoSession, SessionProvider, StaticSession};
pub use storage::{ArtifactStore, StorageApi};
pub use store::{JobStore, RestJobStore};

/// Errors from the backend HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend returned an empty result where a row was expected.
    #[error("Backend returned no rows where one was expected")]
    EmptyResult,
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`BackendError::Api`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(BackendError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), BackendError> {
    ensure_success(response).await?;
    Ok(())
}
