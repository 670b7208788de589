//! Authenticated connection to the SIEM manager

use crate::auth::{Authenticator, Credentials, TokenAuthenticator};
use crate::endpoint::{SiemConfig, SiemEndpoint};
use crate::sink::{EventSink, HttpEventSink};
use async_trait::async_trait;
use flowsiem_core::Result;

/// Authenticates once and yields a sink bound to the resulting token
#[async_trait]
pub trait SiemConnector: Send + Sync {
    type Sink: EventSink;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Sink>;
}

/// Connector for the manager's REST API
#[derive(Debug, Clone)]
pub struct HttpConnector {
    client: reqwest::Client,
    endpoint: SiemEndpoint,
}

impl HttpConnector {
    pub fn new(config: &SiemConfig, host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            endpoint: config.endpoint(host),
        })
    }

    pub fn endpoint(&self) -> &SiemEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl SiemConnector for HttpConnector {
    type Sink = HttpEventSink;

    async fn connect(&self, credentials: &Credentials) -> Result<HttpEventSink> {
        let authenticator = TokenAuthenticator::new(self.client.clone(), self.endpoint.clone());
        let token = authenticator.authenticate(credentials).await?;
        Ok(HttpEventSink::new(
            self.client.clone(),
            self.endpoint.clone(),
            token,
        ))
    }
}
