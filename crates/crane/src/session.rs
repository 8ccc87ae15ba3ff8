use serde::{Deserialize, Serialize};

/// Remaining attempts for the current crane session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    remaining: u32,
    max: u32,
}

impl PlaySession {
    /// Fresh session with every play available.
    pub fn new(max_plays: u32) -> Self {
        Self {
            remaining: max_plays,
            max: max_plays,
        }
    }

    /// Plays left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Plays granted at the start of the session.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether no plays remain.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Use up one play, never going below zero. Returns what is left.
    pub fn consume(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    /// Start over with `max_plays`.
    pub fn reset(&mut self, max_plays: u32) {
        *self = Self::new(max_plays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn consume_floors_at_zero() {
        let mut session = PlaySession::new(1);
        assert_eq!(session.consume(), 0);
        assert!(session.is_exhausted());
        assert_eq!(session.consume(), 0);
    }

    #[test]
    fn reset_restores_max() {
        let mut session = PlaySession::new(3);
        session.consume();
        session.reset(5);
        assert_eq!(session.remaining(), 5);
        assert_eq!(session.max(), 5);
    }

    proptest! {
        #[test]
        fn each_consume_removes_at_most_one(max in 0u32..50, uses in 0usize..80) {
            let mut session = PlaySession::new(max);
            for _ in 0..uses {
                let before = session.remaining();
                let after = session.consume();
                prop_assert!(before - after <= 1);
            }
            prop_assert_eq!(session.remaining(), max.saturating_sub(uses as u32));
        }
    }
}
