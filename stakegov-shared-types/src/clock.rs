//! Epoch arithmetic shared by every participant.

use serde::{Deserialize, Serialize};

use crate::{Epoch, Timestamp};

/// Maps chain timestamps onto accounting epochs.
///
/// Epoch 0 covers everything before `start_time`; epoch `n >= 1` covers
/// `[start_time + (n-1)*period, start_time + n*period)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    pub start_time: Timestamp,
    pub epoch_period: u64,
}

impl EpochClock {
    pub fn new(start_time: Timestamp, epoch_period: u64) -> Self {
        Self { start_time, epoch_period }
    }

    /// Epoch containing timestamp `t`.
    pub fn epoch_at(&self, t: Timestamp) -> Epoch {
        if t < self.start_time || self.epoch_period == 0 {
            return 0;
        }
        (t - self.start_time) / self.epoch_period + 1
    }

    /// First second of `epoch`. Epoch 0 has no well-defined start and maps to 0.
    pub fn epoch_start(&self, epoch: Epoch) -> Timestamp {
        if epoch == 0 {
            return 0;
        }
        self.start_time + (epoch - 1) * self.epoch_period
    }

    /// Last second of `epoch`.
    pub fn epoch_end(&self, epoch: Epoch) -> Timestamp {
        (self.start_time + epoch * self.epoch_period).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_boundaries() {
        let clock = EpochClock::new(1_000, 500);
        assert_eq!(clock.epoch_at(0), 0);
        assert_eq!(clock.epoch_at(999), 0);
        assert_eq!(clock.epoch_at(1_000), 1);
        assert_eq!(clock.epoch_at(1_499), 1);
        assert_eq!(clock.epoch_at(1_500), 2);
        assert_eq!(clock.epoch_start(2), 1_500);
        assert_eq!(clock.epoch_end(2), 1_999);
        assert_eq!(clock.epoch_end(0), 999);
    }

    #[test]
    fn test_start_and_end_belong_to_their_epoch() {
        let clock = EpochClock::new(10, 7);
        for epoch in 1..50 {
            assert_eq!(clock.epoch_at(clock.epoch_start(epoch)), epoch);
            assert_eq!(clock.epoch_at(clock.epoch_end(epoch)), epoch);
        }
    }
}
