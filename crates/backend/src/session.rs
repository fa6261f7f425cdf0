//! Bearer-token source for the generation-function call.
//!
//! A real deployment plugs in its auth provider here. When no user
//! session exists the controller falls back to the service key from
//! [`BackendConfig`](crate::BackendConfig).

use async_trait::async_trait;

/// Supplies the current user's access token, if a session exists.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session's access token, or `None` when signed out.
    async fn access_token(&self) -> Option<String>;
}

/// Session provider for service-key-only deployments: never a session.
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn access_token(&self) -> Option<String> {
        None
    }
}

/// Session provider returning a fixed token. Useful for tests and for
/// tools that already hold a long-lived user token.
pub struct StaticSession(pub String);

#[async_trait]
impl SessionProvider for StaticSession {
    async fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_session_yields_none() {
        assert!(NoSession.access_token().await.is_none());
    }

    #[tokio::test]
    async fn static_session_yields_its_token() {
        let session = StaticSession("user-token".into());
        assert_eq!(session.access_token().await.as_deref(), Some("user-token"));
    }
}
