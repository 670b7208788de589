//! Token exchange against the SIEM manager

use crate::endpoint::SiemEndpoint;
use async_trait::async_trait;
use flowsiem_core::{Error, Result};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// User name and password for the manager API
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer credential for one run
///
/// There is no refresh: a token that expires mid-run shows up as failed
/// batches, not as a retried exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Exchanges credentials for an [`AuthToken`]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken>;
}

/// Authenticator for the manager's `/security/user/authenticate` endpoint
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    client: reqwest::Client,
    endpoint: SiemEndpoint,
}

impl TokenAuthenticator {
    pub fn new(client: reqwest::Client, endpoint: SiemEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken> {
        let url = self.endpoint.authenticate_url();
        debug!("Authenticating as {} against {}", credentials.user, url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&credentials.user, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| Error::authentication(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::authentication(format!(
                "{} answered {}",
                self.endpoint, status
            )));
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| Error::authentication(format!("malformed response: {}", e)))?;

        let token = body
            .data
            .and_then(|data| data.token)
            .ok_or_else(|| Error::authentication("response carries no data.token"))?;

        info!("Authenticated against {}", self.endpoint);
        Ok(AuthToken::new(token))
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    data: Option<AuthData>,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_redacted() {
        let credentials = Credentials::new("wazuh", "hunter2");
        let token = AuthToken::new("eyJhbGciOi");

        assert!(!format!("{:?}", credentials).contains("hunter2"));
        assert!(!format!("{:?}", token).contains("eyJ"));
    }

    #[test]
    fn test_response_shapes() {
        let ok: AuthResponse =
            serde_json::from_str(r#"{"data":{"token":"abc"},"error":0}"#).unwrap();
        assert_eq!(ok.data.and_then(|d| d.token).as_deref(), Some("abc"));

        let missing: AuthResponse = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert!(missing.data.and_then(|d| d.token).is_none());
    }
}
