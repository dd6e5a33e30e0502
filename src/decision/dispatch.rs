//! Scheduling decision requests relative to the tick
//!
//! `Blocking` runs the request (with retries) inline and hands the outcome
//! straight back. `Background` runs it on the tokio blocking pool; outcomes
//! arrive through a completion queue drained at the start of later ticks.

use crate::core::config::DispatchMode;
use crate::core::types::EntityId;
use crate::decision::client::{DecisionClient, DecisionOutcome};
use crate::decision::context::DecisionRequest;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// A request bound to the NPC instance that issued it
#[derive(Debug, Clone)]
pub struct DecisionJob {
    pub npc_name: String,
    pub npc_id: EntityId,
    pub endpoint: Option<String>,
    pub request: DecisionRequest,
}

/// Outcome tagged with the instance it belongs to
#[derive(Debug, Clone)]
pub struct Completion {
    pub npc_name: String,
    pub npc_id: EntityId,
    pub outcome: DecisionOutcome,
}

pub enum Dispatcher {
    Blocking,
    Background {
        runtime: Handle,
        sender: UnboundedSender<Completion>,
        receiver: UnboundedReceiver<Completion>,
        in_flight: usize,
    },
}

impl Dispatcher {
    pub fn blocking() -> Self {
        Dispatcher::Blocking
    }

    pub fn background(runtime: Handle) -> Self {
        let (sender, receiver) = unbounded_channel();
        Dispatcher::Background {
            runtime,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Background dispatch needs a runtime; without one this falls back to blocking
    pub fn for_mode(mode: DispatchMode, runtime: Option<Handle>) -> Self {
        match (mode, runtime) {
            (DispatchMode::Background, Some(runtime)) => Self::background(runtime),
            (DispatchMode::Background, None) => {
                tracing::warn!("background dispatch requested without a runtime, using blocking");
                Self::blocking()
            }
            (DispatchMode::Blocking, _) => Self::blocking(),
        }
    }

    pub fn mode(&self) -> DispatchMode {
        match self {
            Dispatcher::Blocking => DispatchMode::Blocking,
            Dispatcher::Background { .. } => DispatchMode::Background,
        }
    }

    /// Run or enqueue `job`. Blocking mode returns the completion immediately.
    pub fn submit(&mut self, client: &DecisionClient, job: DecisionJob) -> Option<Completion> {
        match self {
            Dispatcher::Blocking => Some(run_job(client, job)),
            Dispatcher::Background {
                runtime,
                sender,
                in_flight,
                ..
            } => {
                let client = client.clone();
                let sender = sender.clone();
                *in_flight += 1;
                runtime.spawn_blocking(move || {
                    let completion = run_job(&client, job);
                    if sender.send(completion).is_err() {
                        tracing::debug!("completion queue closed, dropping decision");
                    }
                });
                None
            }
        }
    }

    /// Completions that arrived since the last drain
    pub fn drain(&mut self) -> Vec<Completion> {
        match self {
            Dispatcher::Blocking => Vec::new(),
            Dispatcher::Background {
                receiver,
                in_flight,
                ..
            } => {
                let mut done = Vec::new();
                while let Ok(completion) = receiver.try_recv() {
                    *in_flight = in_flight.saturating_sub(1);
                    done.push(completion);
                }
                done
            }
        }
    }

    /// Requests submitted but not yet drained
    pub fn in_flight(&self) -> usize {
        match self {
            Dispatcher::Blocking => 0,
            Dispatcher::Background { in_flight, .. } => *in_flight,
        }
    }
}

fn run_job(client: &DecisionClient, job: DecisionJob) -> Completion {
    let outcome = client.request(job.endpoint.as_deref(), &job.request);
    Completion {
        npc_name: job.npc_name,
        npc_id: job.npc_id,
        outcome,
    }
}
