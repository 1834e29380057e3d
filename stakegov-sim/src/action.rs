//! Generated actions and the outcome predicted for them.

use serde::Serialize;
use stakegov_shared_types::{Address, Amount, CampaignId, CampaignParams, RejectReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Deposit,
    Withdraw,
    Delegate,
    SubmitCampaign,
    CancelCampaign,
    Vote,
    ClaimReward,
    NoAction,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Deposit,
        ActionKind::Withdraw,
        ActionKind::Delegate,
        ActionKind::SubmitCampaign,
        ActionKind::CancelCampaign,
        ActionKind::Vote,
        ActionKind::ClaimReward,
        ActionKind::NoAction,
    ];
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActionKind::Deposit => "deposit",
            ActionKind::Withdraw => "withdraw",
            ActionKind::Delegate => "delegate",
            ActionKind::SubmitCampaign => "submit campaign",
            ActionKind::CancelCampaign => "cancel campaign",
            ActionKind::Vote => "vote",
            ActionKind::ClaimReward => "claim reward",
            ActionKind::NoAction => "no action",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositAction {
    pub staker: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawAction {
    pub staker: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegateAction {
    pub staker: Address,
    pub representative: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitCampaignAction {
    pub creator: Address,
    pub params: CampaignParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelCampaignAction {
    pub creator: Address,
    pub campaign_id: CampaignId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteAction {
    pub staker: Address,
    pub campaign_id: CampaignId,
    pub option: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Deposit(DepositAction),
    Withdraw(WithdrawAction),
    Delegate(DelegateAction),
    SubmitCampaign(SubmitCampaignAction),
    CancelCampaign(CancelCampaignAction),
    Vote(VoteAction),
    ClaimReward,
    NoAction,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Deposit(_) => ActionKind::Deposit,
            Action::Withdraw(_) => ActionKind::Withdraw,
            Action::Delegate(_) => ActionKind::Delegate,
            Action::SubmitCampaign(_) => ActionKind::SubmitCampaign,
            Action::CancelCampaign(_) => ActionKind::CancelCampaign,
            Action::Vote(_) => ActionKind::Vote,
            Action::ClaimReward => ActionKind::ClaimReward,
            Action::NoAction => ActionKind::NoAction,
        }
    }
}

/// Whether the authoritative system must accept an action, and if not, why
/// it must refuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub valid: bool,
    pub reason: Option<RejectReason>,
}

impl Outcome {
    pub fn accepted() -> Self {
        Self { valid: true, reason: None }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Outcome predicted by one of the reference model's checks.
    pub fn from_check<T>(check: Result<T, RejectReason>) -> Self {
        match check {
            Ok(_) => Self::accepted(),
            Err(reason) => Self::rejected(reason),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            None => write!(f, "accepted"),
            Some(reason) => write!(f, "rejected ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedAction {
    pub action: Action,
    pub expected: Outcome,
    pub description: String,
}

impl GeneratedAction {
    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}
