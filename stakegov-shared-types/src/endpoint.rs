//! The boundary between the harness and the authoritative staking + DAO system.
//!
//! Every call is a blocking request/response from the harness' point of view:
//! it awaits completion before doing anything else, and a call either returns
//! its full result or an [`EndpointError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    Address, Amount, BrrData, CampaignDetails, CampaignId, CampaignParams, CampaignVoteData, Epoch,
    NetworkFeeData, RejectReason, StakerData, Timestamp, WinningOption,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The command was executed and refused; carries the revert message.
    #[error("reverted: {0}")]
    Reverted(String),
    /// The call never produced a protocol-level answer.
    #[error("transport error: {0}")]
    Transport(String),
}

impl EndpointError {
    /// Classifies a revert. Transport failures and unknown messages give `None`.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            EndpointError::Reverted(message) => RejectReason::from_revert_message(message),
            EndpointError::Transport(_) => None,
        }
    }
}

pub type EndpointResult<T> = Result<T, EndpointError>;

/// Commands and queries the harness issues against the authoritative system.
///
/// Commands are sent "as" the given identity and are mined at the block
/// timestamp scheduled through [`ChainClock`].
#[async_trait]
pub trait DaoEndpoint: Send + Sync {
    async fn deposit(&mut self, staker: Address, amount: Amount) -> EndpointResult<()>;
    async fn withdraw(&mut self, staker: Address, amount: Amount) -> EndpointResult<()>;
    async fn delegate(&mut self, staker: Address, representative: Address) -> EndpointResult<()>;
    async fn submit_campaign(&mut self, creator: Address, params: &CampaignParams) -> EndpointResult<CampaignId>;
    async fn cancel_campaign(&mut self, creator: Address, campaign_id: CampaignId) -> EndpointResult<()>;
    async fn vote(&mut self, staker: Address, campaign_id: CampaignId, option: u64) -> EndpointResult<()>;

    async fn current_epoch(&self) -> EndpointResult<Epoch>;
    async fn campaign_ids(&self, epoch: Epoch) -> EndpointResult<Vec<CampaignId>>;
    async fn campaign_details(&self, campaign_id: CampaignId) -> EndpointResult<Option<CampaignDetails>>;
    async fn campaign_vote_data(&self, campaign_id: CampaignId) -> EndpointResult<CampaignVoteData>;
    /// Staker record for an arbitrary epoch, carried forward from the last
    /// epoch the staker was touched in.
    async fn staker_data(&self, staker: Address, epoch: Epoch) -> EndpointResult<StakerData>;
    async fn latest_staker_data(&self, staker: Address) -> EndpointResult<StakerData>;
    /// Whether the staker's record for `epoch` was explicitly written.
    async fn has_inited(&self, staker: Address, epoch: Epoch) -> EndpointResult<bool>;
    async fn winning_option(&self, campaign_id: CampaignId) -> EndpointResult<WinningOption>;
    async fn total_epoch_points(&self, epoch: Epoch) -> EndpointResult<Amount>;
    async fn current_reward_percentage(&self, staker: Address) -> EndpointResult<Amount>;
    async fn past_reward_percentage(&self, staker: Address, epoch: Epoch) -> EndpointResult<Amount>;
    async fn network_fee(&self) -> EndpointResult<NetworkFeeData>;
    /// Same as [`DaoEndpoint::network_fee`] but also stores the result as the
    /// fallback for later epochs.
    async fn refresh_network_fee(&mut self) -> EndpointResult<NetworkFeeData>;
    async fn brr_data(&self) -> EndpointResult<BrrData>;
    async fn refresh_brr_data(&mut self) -> EndpointResult<BrrData>;
    async fn token_balance(&self, holder: Address) -> EndpointResult<Amount>;
    async fn token_total_supply(&self) -> EndpointResult<Amount>;
}

/// Block time control of the chain hosting the authoritative system.
#[async_trait]
pub trait ChainClock: Send + Sync {
    /// Timestamp of the latest mined block.
    async fn block_time(&self) -> EndpointResult<Timestamp>;
    /// Pins the timestamp of the next state-changing call.
    async fn set_next_block_timestamp(&mut self, timestamp: Timestamp) -> EndpointResult<()>;
    /// Mines an empty block at `timestamp`.
    async fn mine_block_at(&mut self, timestamp: Timestamp) -> EndpointResult<()>;
}
