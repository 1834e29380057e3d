//! Deliberate deviations that can be switched on in [`crate::LocalChain`] to
//! check that a differential run notices them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fault {
    /// Withdrawals still lower the epoch's points but leave the tallies of
    /// running campaigns untouched.
    SkipVoteAdjustment,
    /// Changing a vote adds the new weight without removing the old one.
    DoubleCountRevote,
    /// Deposits are not credited to the depositor's representative.
    IgnoreDelegatedDeposit,
    /// A tie for the most votes goes to the lowest option id.
    TieGoesToFirst,
}

impl Fault {
    pub const ALL: [Fault; 4] = [
        Fault::SkipVoteAdjustment,
        Fault::DoubleCountRevote,
        Fault::IgnoreDelegatedDeposit,
        Fault::TieGoesToFirst,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fault::SkipVoteAdjustment => "skip-vote-adjustment",
            Fault::DoubleCountRevote => "double-count-revote",
            Fault::IgnoreDelegatedDeposit => "ignore-delegated-deposit",
            Fault::TieGoesToFirst => "tie-goes-to-first",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fault '{0}'")]
pub struct ParseFaultError(pub String);

impl FromStr for Fault {
    type Err = ParseFaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fault::ALL
            .into_iter()
            .find(|fault| fault.name() == s.trim())
            .ok_or_else(|| ParseFaultError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_names_parse_back() {
        for fault in Fault::ALL {
            assert_eq!(fault.to_string().parse::<Fault>(), Ok(fault));
        }
        assert_eq!(
            "flip-coin".parse::<Fault>(),
            Err(ParseFaultError("flip-coin".to_string()))
        );
    }
}
