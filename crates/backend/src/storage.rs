//! Client for the binary object store.
//!
//! Deletion of a job cleans up its stored artifact first. Artifact
//! removal is best effort: the caller logs and continues when it fails,
//! so a dangling object may be left behind.

use async_trait::async_trait;

use crate::{check_status, BackendConfig, BackendError};

/// Binary artifact storage, behind a seam for test substitution.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Remove the object at `path` inside the configured bucket.
    async fn remove(&self, path: &str) -> Result<(), BackendError>;
}

/// [`ArtifactStore`] implementation calling the hosted storage API.
pub struct StorageApi {
    client: reqwest::Client,
    config: BackendConfig,
}

impl StorageApi {
    /// Create a storage client with its own connection pool.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a storage client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: BackendConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ArtifactStore for StorageApi {
    async fn remove(&self, path: &str) -> Result<(), BackendError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.bucket, path
        );

        let response = self
            .client
            .delete(url)
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .send()
            .await?;

        check_status(response).await
    }
}
