//! Shared fixtures for integration tests

#![allow(dead_code)]

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use village_sim::core::config::SimulationConfig;
use village_sim::core::error::DecisionError;
use village_sim::decision::{DecisionClient, DecisionTransport, Dispatcher, TransportReply};
use village_sim::simulation::World;

/// A request the fake service received
#[derive(Debug, Clone)]
pub struct Call {
    pub at: Instant,
    pub endpoint: String,
    pub body: Value,
}

/// Decision service that plays back scripted replies, then a fallback
pub struct Scripted {
    replies: Mutex<VecDeque<Result<TransportReply, DecisionError>>>,
    fallback: Result<TransportReply, DecisionError>,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
}

impl Scripted {
    pub fn always(reply: Result<TransportReply, DecisionError>) -> Arc<Self> {
        Self::sequence(Vec::new(), reply)
    }

    pub fn answering(body: &str) -> Arc<Self> {
        Self::always(Ok(TransportReply::ok(body)))
    }

    pub fn sequence(
        replies: Vec<Result<TransportReply, DecisionError>>,
        fallback: Result<TransportReply, DecisionError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(body: &str, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Ok(TransportReply::ok(body)),
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bodies_for(&self, npc: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .map(|c| c.body)
            .filter(|b| b["npc_name"] == npc)
            .collect()
    }
}

impl DecisionTransport for Scripted {
    fn post(&self, endpoint: &str, body: &str, _: Duration) -> Result<TransportReply, DecisionError> {
        self.calls.lock().unwrap().push(Call {
            at: Instant::now(),
            endpoint: endpoint.to_string(),
            body: serde_json::from_str(body).unwrap(),
        });
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Blocking-dispatch world talking to `transport`
pub fn world_with(config: SimulationConfig, transport: Arc<Scripted>) -> World {
    let client = DecisionClient::new(transport, &config.decision);
    World::new(config, client, Dispatcher::blocking()).unwrap()
}

/// Default village with nobody thinking periodically and no energy decay
pub fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.needs.energy_decay_per_game_second = 0.0;
    config
}
