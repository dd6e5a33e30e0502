//! Communication log: a short ring buffer of who said what

use crate::core::types::Rgb;
use std::collections::VecDeque;

/// An entry in the communication log
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Game time label, `HH:MM`
    pub timestamp: String,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone)]
pub struct CommLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl CommLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, dropping the oldest once full
    pub fn add(&mut self, timestamp: impl Into<String>, text: impl Into<String>, color: Rgb) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: timestamp.into(),
            text: text.into(),
            color,
        });
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
