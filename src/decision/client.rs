//! Decision client with bounded retry
//!
//! One call runs the request state machine to completion:
//! `Requesting(attempt) -> Applied | Failed`. Timeouts, connection failures
//! and 5xx replies are retried after a fixed delay until the attempt budget
//! is spent. 4xx replies and undecodable bodies fail immediately.

use crate::core::config::DecisionConfig;
use crate::core::error::DecisionError;
use crate::decision::context::DecisionRequest;
use crate::decision::response::{parse_response, DecisionResponse};
use crate::decision::transport::{DecisionTransport, HttpTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DecisionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Result of one request including its retries
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub result: Result<DecisionResponse, DecisionError>,
    pub attempts: u32,
}

#[derive(Clone)]
pub struct DecisionClient {
    transport: Arc<dyn DecisionTransport>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl DecisionClient {
    pub fn new(transport: Arc<dyn DecisionTransport>, config: &DecisionConfig) -> Self {
        Self {
            transport,
            policy: RetryPolicy::from_config(config),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Client talking HTTP through the given runtime
    pub fn http(runtime: Handle, config: &DecisionConfig) -> Self {
        Self::new(Arc::new(HttpTransport::new(runtime)), config)
    }

    /// Send `request` to `endpoint`, retrying per policy. Blocks the caller.
    pub fn request(&self, endpoint: Option<&str>, request: &DecisionRequest) -> DecisionOutcome {
        let Some(endpoint) = endpoint else {
            tracing::warn!(npc = %request.npc_name, "no decision endpoint configured");
            return DecisionOutcome {
                result: Err(DecisionError::NotConfigured),
                attempts: 0,
            };
        };

        let body = match serde_json::to_string(request) {
            Ok(body) => body,
            Err(e) => {
                return DecisionOutcome {
                    result: Err(DecisionError::Encode(e.to_string())),
                    attempts: 0,
                }
            }
        };
        tracing::debug!(npc = %request.npc_name, %endpoint, payload = %body, "decision payload");

        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::info!(
                npc = %request.npc_name,
                event = %request.event_trigger.kind,
                attempt,
                "requesting decision"
            );

            let result = self.attempt(endpoint, &body);
            let retry = match &result {
                Ok(response) => {
                    tracing::info!(
                        npc = %request.npc_name,
                        actions = response.actions.len(),
                        speech = response.speech.is_some(),
                        "decision received"
                    );
                    false
                }
                Err(error) if error.is_retryable() && attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        npc = %request.npc_name,
                        attempt,
                        %error,
                        "decision request failed, retrying"
                    );
                    true
                }
                Err(error) => {
                    tracing::error!(
                        npc = %request.npc_name,
                        attempts = attempt,
                        %error,
                        "decision request failed"
                    );
                    false
                }
            };

            if !retry {
                return DecisionOutcome {
                    result,
                    attempts: attempt,
                };
            }
            std::thread::sleep(self.policy.delay);
        }
    }

    fn attempt(&self, endpoint: &str, body: &str) -> Result<DecisionResponse, DecisionError> {
        let reply = self.transport.post(endpoint, body, self.timeout)?;
        if !reply.is_success() {
            return Err(DecisionError::Status(reply.status));
        }
        parse_response(&reply.body)
    }
}
