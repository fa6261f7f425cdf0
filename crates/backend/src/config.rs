/// Backend connection settings loaded from environment variables.
///
/// `url` and `service_key` have no sensible defaults and must be set.
/// The remaining fields default to the names used by the hosted
/// deployment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project, e.g. `https://proj.example.co`.
    pub url: String,
    /// Service-level API key; also the bearer fallback when no user
    /// session exists.
    pub service_key: String,
    /// Job table name (default: `generated_images`).
    pub table: String,
    /// Generation edge-function name (default: `generate-image`).
    pub function: String,
    /// Storage bucket holding generated artifacts (default:
    /// `generated-images`).
    pub bucket: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default            |
    /// |-------------------------|--------------------|
    /// | `PROMPTPIX_URL`         | *(required)*       |
    /// | `PROMPTPIX_SERVICE_KEY` | *(required)*       |
    /// | `PROMPTPIX_TABLE`       | `generated_images` |
    /// | `PROMPTPIX_FUNCTION`    | `generate-image`   |
    /// | `PROMPTPIX_BUCKET`      | `generated-images` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let url =
            std::env::var("PROMPTPIX_URL").map_err(|_| ConfigError::Missing("PROMPTPIX_URL"))?;
        let service_key = std::env::var("PROMPTPIX_SERVICE_KEY")
            .map_err(|_| ConfigError::Missing("PROMPTPIX_SERVICE_KEY"))?;

        let table =
            std::env::var("PROMPTPIX_TABLE").unwrap_or_else(|_| "generated_images".into());
        let function =
            std::env::var("PROMPTPIX_FUNCTION").unwrap_or_else(|_| "generate-image".into());
        let bucket =
            std::env::var("PROMPTPIX_BUCKET").unwrap_or_else(|_| "generated-images".into());

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            table,
            function,
            bucket,
        })
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
}
