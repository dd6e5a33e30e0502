//! External decision service: snapshot, transport, retry and dispatch

pub mod client;
pub mod context;
pub mod dispatch;
pub mod response;
pub mod transport;

pub use client::{DecisionClient, DecisionOutcome, RetryPolicy};
pub use context::{DecisionEvent, DecisionRequest, SnapshotSources};
pub use dispatch::{Completion, DecisionJob, Dispatcher};
pub use response::{parse_response, DecisionResponse};
pub use transport::{DecisionTransport, HttpTransport, TransportReply};
