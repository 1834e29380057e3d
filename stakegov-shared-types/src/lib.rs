//! Types shared between the reference model, the authoritative backends and the
//! fuzz driver.
//!
//! Everything that crosses the boundary between the harness and the system under
//! test lives here: addresses and amounts, per-epoch staker records, campaign
//! records, the FeeBRR option codec, revert reasons and the endpoint traits.

use serde::{Deserialize, Serialize};

pub mod campaign;
pub mod clock;
pub mod endpoint;
pub mod reject;
pub mod staking;

pub use campaign::{
    decode_brr_option, encode_brr_option, BrrData, CampaignDetails, CampaignParams, CampaignType,
    CampaignVoteData, NetworkFeeData, WinningOption,
};
pub use clock::EpochClock;
pub use endpoint::{ChainClock, DaoEndpoint, EndpointError, EndpointResult};
pub use reject::RejectReason;
pub use staking::StakerData;

/// Token amounts, voting power and fixed-point values.
pub type Amount = primitive_types::U256;
/// Seconds since the unix epoch, as seen by the chain.
pub type Timestamp = u64;
/// Accounting period index. Epoch 0 is everything before the start time.
pub type Epoch = u64;
/// Campaign identifier. Ids start at 1; 0 means "no campaign".
pub type CampaignId = u64;

/// 1e18, the unit of every percentage expressed "in precision".
pub const PRECISION: u128 = 1_000_000_000_000_000_000;
/// Basis point denominator.
pub const BPS: u64 = 10_000;
/// Network fee options must be strictly below this value.
pub const MAX_NETWORK_FEE_BPS: u64 = BPS / 2;
/// Upper bound on options per campaign.
pub const MAX_CAMPAIGN_OPTIONS: usize = 8;
/// Upper bound on live campaigns per epoch.
pub const MAX_EPOCH_CAMPAIGNS: usize = 10;

/// `PRECISION` as an [`Amount`].
pub fn precision() -> Amount {
    Amount::from(PRECISION)
}

/// 2^128, the shift used to pack two basis point values into one option.
pub fn power_128() -> Amount {
    Amount::one() << 128
}

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address. Never a valid representative.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derives a stable address from a label, e.g. `"staker-3"`.
    pub fn derive(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
