//! In-memory staking and DAO contracts on a controllable single-node chain.
//!
//! [`LocalChain`] is a self-contained authoritative backend: it keeps the
//! contracts' own storage layout (per-epoch init flags, accumulated epoch
//! points, swap-remove campaign lists) and answers with the contracts' revert
//! messages. [`Fault`] switches on known deviations.

pub mod chain;
pub mod dao;
pub mod error;
pub mod fault;
pub mod staking;
pub mod token;

pub use chain::{LocalChain, LocalChainConfig};
pub use error::{ContractError, ContractResult};
pub use fault::{Fault, ParseFaultError};
