//! Nullable clock: deterministic time-units for testing.

use rider_types::Timestamp;
use std::cell::Cell;

/// A deterministic clock counting abstract time-units (e.g. blocks).
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of units, saturating at the end of time.
    pub fn advance(&self, units: u64) {
        self.current.set(self.current.get().saturating_add(units));
    }

    /// Set the time to a specific value.
    pub fn set(&self, units: u64) {
        self.current.set(units);
    }

    /// Return the current time, then advance by one unit.
    ///
    /// Models a chain where every transaction lands in its own block.
    pub fn tick(&self) -> Timestamp {
        let now = self.now();
        self.advance(1);
        now
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_and_set() {
        let clock = NullClock::new(5);
        assert_eq!(clock.now(), Timestamp::new(5));
        clock.advance(3);
        assert_eq!(clock.now(), Timestamp::new(8));
        clock.set(2);
        assert_eq!(clock.now(), Timestamp::new(2));
    }

    #[test]
    fn tick_returns_then_advances() {
        let clock = NullClock::default();
        assert_eq!(clock.tick(), Timestamp::new(0));
        assert_eq!(clock.tick(), Timestamp::new(1));
        assert_eq!(clock.now(), Timestamp::new(2));
    }

    #[test]
    fn advance_saturates() {
        let clock = NullClock::new(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now(), Timestamp::new(u64::MAX));
    }
}
