//! Staking and governance reference model
//!
//! This crate re-derives staking, delegation, campaign vote tallying, winning
//! option resolution and reward shares from first principles, generates
//! weighted random actions, and checks an authoritative implementation against
//! the model one action at a time.

pub mod action;
pub mod action_generator;
pub mod campaign_registry;
pub mod config;
pub mod error;
pub mod fixed_point;
pub mod harness;
pub mod model;
pub mod reward_accounting;
pub mod score;
pub mod snapshot;
pub mod stake_ledger;

pub use action::{Action, ActionKind, GeneratedAction, Outcome};
pub use action_generator::ActionGenerator;
pub use campaign_registry::{CampaignRegistry, CampaignRules, InitialParameters, VoteReceipt};
pub use config::{ActionWeights, FuzzRunConfig};
pub use error::{ConfigError, HarnessError};
pub use harness::DifferentialHarness;
pub use model::ReferenceModel;
pub use reward_accounting::RewardAccounting;
pub use score::{ScoreBoard, Tally};
pub use snapshot::{ParticipantView, StateDump};
pub use stake_ledger::{StakeLedger, WithdrawalEffect};

// Re-export the shared records so callers need a single import
pub use stakegov_shared_types as types;
