//! Identifier sequencers.
//!
//! Each resource class draws ids from its own monotonically increasing
//! counter. Ids minted elsewhere (remote creates, snapshots) push the counter
//! forward so a later local allocation never collides with them.

#[cfg(test)]
#[path = "seq_test.rs"]
mod seq_test;

/// Monotonic id counter. The first id handed out is `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    /// A sequence whose next id is `last + 1`.
    #[must_use]
    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Most recently issued (or observed) id.
    #[must_use]
    pub fn last(self) -> u64 {
        self.last
    }

    /// Restart so the next id is `max + 1`, even if that moves backwards.
    pub fn reseed(&mut self, max: u64) {
        self.last = max;
    }

    /// Record an id issued elsewhere; never moves the counter backwards.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }
}

/// One sequence per shared resource class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequencers {
    pub device: IdSequence,
    pub link: IdSequence,
    pub group: IdSequence,
    /// Stamps outbound message ids.
    pub message: IdSequence,
}
