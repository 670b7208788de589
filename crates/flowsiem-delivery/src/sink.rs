//! Event ingestion sink
//!
//! Delivery is best-effort per batch: whatever status the manager answers
//! with is handed back as a [`DeliveryReport`] and the caller moves on. Only
//! a request that never got an answer is an error.

use crate::auth::AuthToken;
use crate::endpoint::SiemEndpoint;
use async_trait::async_trait;
use flowsiem_core::{Batch, Error, Result, SerializedEvent};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Outcome of one batch delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// HTTP status code returned by the ingestion endpoint
    pub status: u16,

    /// Response body, verbatim
    pub body: String,
}

impl DeliveryReport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the endpoint accepted the batch (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Destination for batches of security events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one batch in a single call
    async fn send_batch(&self, batch: &Batch) -> Result<DeliveryReport>;
}

#[async_trait]
impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    async fn send_batch(&self, batch: &Batch) -> Result<DeliveryReport> {
        (**self).send_batch(batch).await
    }
}

#[async_trait]
impl<S: EventSink + ?Sized> EventSink for Box<S> {
    async fn send_batch(&self, batch: &Batch) -> Result<DeliveryReport> {
        (**self).send_batch(batch).await
    }
}

/// Sink posting to the manager's `/events` endpoint with a bearer token
#[derive(Debug, Clone)]
pub struct HttpEventSink {
    client: reqwest::Client,
    endpoint: SiemEndpoint,
    token: AuthToken,
}

impl HttpEventSink {
    pub fn new(client: reqwest::Client, endpoint: SiemEndpoint, token: AuthToken) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }
}

#[derive(Serialize)]
struct EventsPayload<'a> {
    events: &'a [SerializedEvent],
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn send_batch(&self, batch: &Batch) -> Result<DeliveryReport> {
        let url = self.endpoint.events_url();
        debug!("Posting {} events to {}", batch.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.as_str())
            .json(&EventsPayload {
                events: batch.events(),
            })
            .send()
            .await
            .map_err(|e| Error::delivery(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::delivery(format!("failed to read response body: {}", e)))?;

        Ok(DeliveryReport::new(status, body))
    }
}
