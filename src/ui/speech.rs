//! Transient speech bubbles above NPCs

use crate::core::types::{EntityId, WallMillis};

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechBubble {
    pub speaker: EntityId,
    pub speaker_name: String,
    pub text: String,
    pub created_ms: WallMillis,
}

#[derive(Debug, Clone)]
pub struct SpeechBubbles {
    bubbles: Vec<SpeechBubble>,
    duration_ms: u64,
}

impl SpeechBubbles {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            bubbles: Vec::new(),
            duration_ms,
        }
    }

    /// Show `text` above the speaker. Empty text is ignored.
    pub fn add(&mut self, speaker: EntityId, speaker_name: &str, text: &str, now_ms: WallMillis) {
        if text.is_empty() {
            return;
        }
        self.bubbles.push(SpeechBubble {
            speaker,
            speaker_name: speaker_name.to_string(),
            text: text.to_string(),
            created_ms: now_ms,
        });
    }

    /// Forget bubbles older than the display duration
    pub fn expire(&mut self, now_ms: WallMillis) {
        let duration = self.duration_ms;
        self.bubbles
            .retain(|b| now_ms.saturating_sub(b.created_ms) < duration);
    }

    /// Bubbles to draw right now
    ///
    /// `is_active` reports whether a speaker instance is still active;
    /// bubbles of inactive speakers are hidden but not removed.
    pub fn visible<'a>(
        &'a self,
        now_ms: WallMillis,
        is_active: impl Fn(EntityId) -> bool + 'a,
    ) -> impl Iterator<Item = &'a SpeechBubble> + 'a {
        let duration = self.duration_ms;
        self.bubbles.iter().filter(move |b| {
            now_ms.saturating_sub(b.created_ms) < duration && is_active(b.speaker)
        })
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}
