//! Presentation collaborators: speech bubbles and the communication log

pub mod comm_log;
pub mod speech;
pub mod state;

pub use comm_log::{CommLog, LogEntry};
pub use speech::{SpeechBubble, SpeechBubbles};
pub use state::GameUi;
