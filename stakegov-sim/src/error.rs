use stakegov_shared_types::{Amount, EndpointError, RejectReason};
use thiserror::Error;

use crate::action::{ActionKind, Outcome};
use crate::snapshot::StateDump;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least 2 stakers are required, got {0}")]
    TooFewStakers(usize),
    #[error("campaign creator index {index} is out of range for {num_stakers} stakers")]
    CreatorOutOfRange { index: usize, num_stakers: usize },
    #[error("epoch period of {0}s is too short")]
    EpochPeriodTooShort(u64),
    #[error("step of {step}s must be positive and shorter than the {epoch_period}s epoch")]
    InvalidStep { step: u64, epoch_period: u64 },
    #[error("initial balance must be positive")]
    ZeroBalance,
    #[error("initial balance {balance} for {num_stakers} stakers overflows the fixed-point range")]
    SupplyOverflow { balance: Amount, num_stakers: usize },
    #[error("early phase ratio {0} is outside [0, 1]")]
    InvalidPhaseRatio(f64),
    #[error("{phase} action weights sum to {sum}, expected 100")]
    WeightsDoNotSum { phase: &'static str, sum: u32 },
    #[error("initial network fee or reward/rebate split out of range")]
    InvalidInitialParameters,
}

/// Fatal outcomes of a differential run. Every divergence carries the state
/// around it so the run can be diagnosed after the fact.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invariant violation after {context}: {detail}")]
    InvariantViolation {
        context: String,
        detail: String,
        dump: Box<StateDump>,
    },
    #[error("{kind} expected to be {expected} but the authoritative system rejected it: {actual}")]
    UnexpectedRejection {
        kind: ActionKind,
        expected: Outcome,
        actual: String,
        dump: Box<StateDump>,
    },
    #[error("{kind} expected to be rejected ({expected}) but the authoritative system accepted it")]
    UnexpectedAcceptance {
        kind: ActionKind,
        expected: RejectReason,
        dump: Box<StateDump>,
    },
    #[error("endpoint failure during {context}: {source}")]
    Endpoint {
        context: String,
        #[source]
        source: EndpointError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HarnessError {
    pub fn dump(&self) -> Option<&StateDump> {
        match self {
            HarnessError::InvariantViolation { dump, .. }
            | HarnessError::UnexpectedRejection { dump, .. }
            | HarnessError::UnexpectedAcceptance { dump, .. } => Some(dump),
            HarnessError::Endpoint { .. } | HarnessError::Config(_) => None,
        }
    }

    /// `true` when the authoritative system and the model disagree, as
    /// opposed to the run failing to execute.
    pub fn is_divergence(&self) -> bool {
        self.dump().is_some()
    }
}
