//! Presentation state fed by the simulation core
//!
//! The core calls [`GameUi::add_speech_bubble`] and [`GameUi::add_to_comm_log`];
//! a front end reads the bubbles and log back out to draw them.

use crate::core::config::UiConfig;
use crate::core::types::{EntityId, Rgb, WallMillis};
use crate::ui::comm_log::CommLog;
use crate::ui::speech::SpeechBubbles;

#[derive(Debug, Clone)]
pub struct GameUi {
    pub bubbles: SpeechBubbles,
    pub comm_log: CommLog,
    /// Whether the log panel is shown
    pub show_comm_log: bool,
}

impl GameUi {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            bubbles: SpeechBubbles::new(config.speech_bubble_ms),
            comm_log: CommLog::new(config.comm_log_capacity),
            show_comm_log: false,
        }
    }

    pub fn add_speech_bubble(
        &mut self,
        speaker: EntityId,
        speaker_name: &str,
        text: &str,
        now_ms: WallMillis,
    ) {
        self.bubbles.add(speaker, speaker_name, text, now_ms);
    }

    pub fn add_to_comm_log(&mut self, timestamp: &str, text: impl Into<String>, color: Rgb) {
        let text = text.into();
        tracing::debug!(%timestamp, %text, "comm log");
        self.comm_log.add(timestamp, text, color);
    }

    pub fn toggle_comm_log(&mut self) {
        self.show_comm_log = !self.show_comm_log;
    }
}

impl Default for GameUi {
    fn default() -> Self {
        Self::new(&UiConfig::default())
    }
}
