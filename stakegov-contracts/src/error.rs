use stakegov_shared_types::EndpointError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The call reverted with the given message; no state was changed.
    #[error("{0}")]
    Revert(&'static str),
}

impl From<ContractError> for EndpointError {
    fn from(err: ContractError) -> Self {
        EndpointError::Reverted(err.to_string())
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Reverts with `message` unless `condition` holds.
pub(crate) fn require(condition: bool, message: &'static str) -> ContractResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ContractError::Revert(message))
    }
}
