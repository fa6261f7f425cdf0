//! Client for the remote image-generation function.
//!
//! The function runs server-side at `/functions/v1/<name>`; it receives
//! the prompt and the pre-created job id, performs the generation, and
//! updates the job record itself as it progresses. The controller calls
//! it exactly once per submitted job.

use async_trait::async_trait;
use promptpix_core::JobId;
use serde::{Deserialize, Serialize};

use crate::{parse_response, BackendConfig, BackendError};

/// Request body sent to the generation function.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub prompt: String,
    pub job_id: JobId,
}

/// Response returned by the generation function.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    /// Whether the function accepted and completed its part of the work.
    pub success: bool,
    /// Result locator, when the function reports one directly.
    pub image_url: Option<String>,
    /// Failure reason, when `success` is false.
    pub error: Option<String>,
}

/// The remote generation compute, behind a seam for test substitution.
#[async_trait]
pub trait GenerateFn: Send + Sync {
    /// Invoke the generation function, authorized with `bearer`.
    async fn invoke(
        &self,
        request: InvokeRequest,
        bearer: &str,
    ) -> Result<InvokeResponse, BackendError>;
}

/// [`GenerateFn`] implementation calling the hosted edge function.
pub struct EdgeFunction {
    client: reqwest::Client,
    config: BackendConfig,
}

impl EdgeFunction {
    /// Create a function client with its own connection pool.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a function client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: BackendConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl GenerateFn for EdgeFunction {
    async fn invoke(
        &self,
        request: InvokeRequest,
        bearer: &str,
    ) -> Result<InvokeResponse, BackendError> {
        let url = format!("{}/functions/v1/{}", self.config.url, self.config.function);

        tracing::debug!(job_id = %request.job_id, function = %self.config.function, "Invoking generation function");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(bearer)
            .json(&request)
            .send()
            .await?;

        parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_request_uses_camel_case() {
        let req = InvokeRequest {
            prompt: "a red bicycle".into(),
            job_id: uuid::Uuid::nil(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("jobId").is_some());
        assert!(v.get("job_id").is_none());
    }

    #[test]
    fn invoke_response_parses_partial_body() {
        let resp: InvokeResponse =
            serde_json::from_str(r#"{"success": false, "error": "model overloaded"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("model overloaded"));
        assert!(resp.image_url.is_none());
    }
}
