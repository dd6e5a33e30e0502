//! Per-entity FIFO of pending directives

use crate::entity::directive::Directive;
use std::collections::VecDeque;

/// Queue of directives for an entity
///
/// Strictly first-in first-out. New plans are appended behind whatever is
/// still pending, never replacing it.
#[derive(Debug, Clone, Default)]
pub struct DirectiveQueue {
    queued: VecDeque<Directive>,
}

impl DirectiveQueue {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
        }
    }

    pub fn push(&mut self, directive: Directive) {
        self.queued.push_back(directive);
    }

    pub fn extend(&mut self, directives: impl IntoIterator<Item = Directive>) {
        self.queued.extend(directives);
    }

    pub fn pop(&mut self) -> Option<Directive> {
        self.queued.pop_front()
    }

    pub fn peek(&self) -> Option<&Directive> {
        self.queued.front()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}
