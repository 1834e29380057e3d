//! State dumps written when a run diverges.

use serde::Serialize;
use stakegov_shared_types::{Address, Epoch, StakerData, Timestamp};

use crate::action::{Action, Outcome};

/// One participant's staker records as seen by one side, for the current
/// epoch, the next epoch and the latest write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub role: String,
    pub address: Address,
    pub current: StakerData,
    pub next: StakerData,
    pub latest: StakerData,
    pub inited_current: bool,
    pub inited_next: bool,
}

impl ParticipantView {
    /// Same records, ignoring role labels.
    pub fn same_state(&self, other: &ParticipantView) -> bool {
        self.address == other.address
            && self.current == other.current
            && self.next == other.next
            && self.latest == other.latest
            && self.inited_current == other.inited_current
            && self.inited_next == other.inited_next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateDump {
    pub loop_index: u64,
    pub timestamp: Timestamp,
    pub epoch: Epoch,
    pub action: Option<Action>,
    pub expected: Option<Outcome>,
    /// Authoritative views taken before the action was sent.
    pub before: Vec<ParticipantView>,
    /// Authoritative views after the action. Empty if they could not be read.
    pub after: Vec<ParticipantView>,
    /// Reference model views after the action.
    pub model: Vec<ParticipantView>,
    pub notes: Vec<String>,
}

impl StateDump {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| format!("{{\"error\": \"{}\"}}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_renders_as_json() {
        let staker = Address::derive("s");
        let view = ParticipantView {
            role: "staker".to_string(),
            address: staker,
            current: StakerData::genesis(staker),
            next: StakerData::genesis(staker),
            latest: StakerData::genesis(staker),
            inited_current: true,
            inited_next: true,
        };
        let dump = StateDump {
            loop_index: 12,
            epoch: 3,
            before: vec![view.clone()],
            model: vec![view],
            notes: vec!["stake mismatch".to_string()],
            ..StateDump::default()
        };
        let json: serde_json::Value = serde_json::from_str(&dump.to_json_pretty()).unwrap();
        assert_eq!(json["loop_index"], 12);
        assert_eq!(json["before"][0]["role"], "staker");
        assert_eq!(json["notes"][0], "stake mismatch");
        assert!(json["action"].is_null());
    }
}
