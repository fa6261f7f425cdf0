//! REST client for the job table.
//!
//! Wraps the PostgREST-style `/rest/v1/<table>` endpoint. Row filters
//! use the `column=eq.value` query convention; writes that need the
//! created row back send `Prefer: return=representation`.

use async_trait::async_trait;
use promptpix_core::{Job, JobId, JobPatch, NewJob};

use crate::{check_status, parse_response, BackendConfig, BackendError};

/// CRUD access to generation job records.
///
/// The controller only ever talks to this trait, so tests swap in an
/// in-memory implementation.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a new job record; the store assigns id and timestamps.
    async fn create(&self, job: NewJob) -> Result<Job, BackendError>;

    /// Fetch a job by id. `Ok(None)` means the record does not exist.
    async fn get(&self, id: JobId) -> Result<Option<Job>, BackendError>;

    /// Apply a partial update to an existing record.
    async fn update(&self, id: JobId, patch: JobPatch) -> Result<(), BackendError>;

    /// Delete a job record.
    async fn delete(&self, id: JobId) -> Result<(), BackendError>;

    /// List jobs for an owner (or the anonymous pool), newest first.
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<Job>, BackendError>;
}

/// [`JobStore`] implementation backed by the hosted REST endpoint.
pub struct RestJobStore {
    client: reqwest::Client,
    config: BackendConfig,
}

impl RestJobStore {
    /// Create a store client with its own connection pool.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a store client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across the backend clients).
    pub fn with_client(client: reqwest::Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    /// Base URL of the job table endpoint.
    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }

    /// Attach the api-key and bearer headers every REST call needs.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }
}

#[async_trait]
impl JobStore for RestJobStore {
    async fn create(&self, job: NewJob) -> Result<Job, BackendError> {
        let response = self
            .authorize(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&job)
            .send()
            .await?;

        // The REST endpoint returns the representation as a one-element
        // array even for single-row inserts.
        let mut rows: Vec<Job> = parse_response(response).await?;
        rows.pop().ok_or(BackendError::EmptyResult)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, BackendError> {
        let response = self
            .authorize(self.client.get(self.table_url()))
            .query(&[("id", format!("eq.{id}")), ("select", "*".into())])
            .send()
            .await?;

        let mut rows: Vec<Job> = parse_response(response).await?;
        Ok(rows.pop())
    }

    async fn update(&self, id: JobId, patch: JobPatch) -> Result<(), BackendError> {
        let response = self
            .authorize(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await?;

        check_status(response).await
    }

    async fn delete(&self, id: JobId) -> Result<(), BackendError> {
        let response = self
            .authorize(self.client.delete(self.table_url()))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        check_status(response).await
    }

    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<Job>, BackendError> {
        let owner_filter = match owner_id {
            Some(owner) => format!("eq.{owner}"),
            None => "is.null".to_string(),
        };

        let response = self
            .authorize(self.client.get(self.table_url()))
            .query(&[
                ("select", "*".to_string()),
                ("owner_id", owner_filter),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        parse_response(response).await
    }
}
