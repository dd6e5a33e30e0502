//! Request/response transport for decision services
//!
//! The client only needs "POST this JSON, give me status and body". Keeping
//! that behind a trait lets the simulation run against scripted services.

use crate::core::error::DecisionError;
use reqwest::Client;
use std::time::Duration;
use tokio::runtime::Handle;

/// Raw reply from a decision service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One synchronous POST of a JSON body
///
/// Implementations report a timeout as [`DecisionError::Timeout`] and any
/// other failure to get a reply as [`DecisionError::Connection`]. Non-2xx
/// replies are returned as replies; classifying them is the caller's job.
pub trait DecisionTransport: Send + Sync {
    fn post(
        &self,
        endpoint: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<TransportReply, DecisionError>;
}

/// HTTP transport over reqwest
///
/// Requests run on the given tokio runtime and the caller blocks until the
/// reply (or timeout). Must not be called from inside an async task.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    runtime: Handle,
}

impl HttpTransport {
    pub fn new(runtime: Handle) -> Self {
        Self {
            client: Client::new(),
            runtime,
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<TransportReply, DecisionError> {
        let response = self
            .client
            .post(endpoint)
            .header("content-type", "application/json")
            .timeout(timeout)
            .body(body.to_string())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportReply { status, body })
    }
}

impl DecisionTransport for HttpTransport {
    fn post(
        &self,
        endpoint: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<TransportReply, DecisionError> {
        self.runtime.block_on(self.send(endpoint, body, timeout))
    }
}

fn classify(error: reqwest::Error) -> DecisionError {
    if error.is_timeout() {
        DecisionError::Timeout
    } else {
        DecisionError::Connection(error.to_string())
    }
}
