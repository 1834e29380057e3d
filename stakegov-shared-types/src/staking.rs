//! Per-epoch staker records.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount};

/// Stake, stake delegated in by others, and the chosen representative of one
/// staker at one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerData {
    pub stake: Amount,
    pub delegated_stake: Amount,
    pub representative: Address,
}

impl StakerData {
    /// The record of a staker that has never interacted with the protocol.
    pub fn genesis(staker: Address) -> Self {
        Self {
            stake: Amount::zero(),
            delegated_stake: Amount::zero(),
            representative: staker,
        }
    }

    /// Voting power of `staker` given this record. A staker that delegated
    /// away only votes with what others delegated to it.
    pub fn voting_power(&self, staker: Address) -> Amount {
        if self.representative == staker {
            self.stake + self.delegated_stake
        } else {
            self.delegated_stake
        }
    }
}
