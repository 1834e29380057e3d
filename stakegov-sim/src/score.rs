//! Pass counts of a fuzz run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::action::ActionKind;

/// `success` counts actions the protocol accepted (or campaigns that produced
/// a winner); `fail` counts expected rejections (or campaigns without one).
/// Both are passing outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub success: u64,
    pub fail: u64,
}

impl Tally {
    pub fn record(&mut self, success: bool) {
        if success {
            self.success += 1;
        } else {
            self.fail += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.fail
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBoard {
    pub iterations: u64,
    pub actions: BTreeMap<ActionKind, Tally>,
    pub campaign_outcomes: Tally,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ActionKind, success: bool) {
        self.actions.entry(kind).or_default().record(success);
    }

    pub fn record_campaign(&mut self, has_winner: bool) {
        self.campaign_outcomes.record(has_winner);
    }

    pub fn tally(&self, kind: ActionKind) -> Tally {
        self.actions.get(&kind).copied().unwrap_or_default()
    }

    pub fn total_actions(&self) -> u64 {
        self.actions.values().map(Tally::total).sum()
    }
}

impl fmt::Display for ScoreBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- FUZZ RESULTS ---")?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        for kind in ActionKind::ALL {
            let tally = self.tally(kind);
            writeln!(f, "{}: success = {}, fails = {}", kind, tally.success, tally.fail)?;
        }
        writeln!(
            f,
            "campaign has winning option: success = {}, fails = {}",
            self.campaign_outcomes.success, self.campaign_outcomes.fail
        )?;
        write!(f, "--------------------")
    }
}
