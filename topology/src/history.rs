//! Shared undo history.
//!
//! Every mutation applied to the diagram, local or remote, is appended in
//! the order it was applied. The pointer marks how much of the history is in
//! effect: entries before it are applied, entries at or after it have been
//! undone and can be redone. Appending while the pointer is behind the end
//! drops the redo tail.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use frames::{Message, Stamp};

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Message>,
    pointer: usize,
    limit: usize,
}

impl History {
    /// Empty history keeping at most `limit` entries.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { entries: Vec::new(), pointer: 0, limit: limit.max(1) }
    }

    #[must_use]
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether nothing is waiting to be redone.
    #[must_use]
    pub fn at_present(&self) -> bool {
        self.pointer == self.entries.len()
    }

    /// Append the mutations carried by `message`.
    ///
    /// A composite is flattened into its parts so each part can be undone on
    /// its own. Non-mutating messages are ignored.
    pub fn record(&mut self, message: &Message) {
        match message {
            Message::MultipleMessage(multiple) => {
                for part in &multiple.messages {
                    self.record(part);
                }
            }
            m if m.is_mutation() => self.push(m.clone()),
            _ => {}
        }
    }

    /// Whether `message` was already recorded, judged by the stamp of its
    /// last mutation. Unstamped messages are never considered seen.
    #[must_use]
    pub fn has_recorded(&self, message: &Message) -> bool {
        let Some(stamp) = last_stamp(message) else {
            return false;
        };
        stamp.message_id != 0 && self.entries.iter().rev().any(|e| e.stamp() == Some(stamp))
    }

    fn push(&mut self, message: Message) {
        self.entries.truncate(self.pointer);
        self.entries.push(message);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.pointer = self.entries.len();
    }

    /// Move the pointer back one entry and return the entry to invert.
    pub fn step_back(&mut self) -> Option<Message> {
        if self.pointer == 0 {
            return None;
        }
        self.rewind();
        self.entries.get(self.pointer).cloned()
    }

    /// Return the entry at the pointer to re-apply and move past it.
    pub fn step_forward(&mut self) -> Option<Message> {
        let entry = self.entries.get(self.pointer).cloned()?;
        self.advance();
        Some(entry)
    }

    /// Move the pointer back without reading the entry.
    pub fn rewind(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    /// Move the pointer forward without reading the entry.
    pub fn advance(&mut self) {
        self.pointer = (self.pointer + 1).min(self.entries.len());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = 0;
    }
}

fn last_stamp(message: &Message) -> Option<&Stamp> {
    match message {
        Message::MultipleMessage(multiple) => multiple.messages.iter().rev().find_map(last_stamp),
        m if m.is_mutation() => m.stamp(),
        _ => None,
    }
}
