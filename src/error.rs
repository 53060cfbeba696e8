use crate::{
    chain::{
        Address,
        RequestId,
    },
    units::Amount,
};
use thiserror::Error;

/// Errors surfaced by the chain access layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("user rejected the transaction")]
    UserRejected,
    #[error("insufficient funds: have {available}, need {requested}")]
    InsufficientFunds {
        available: Amount,
        requested: Amount,
    },
    #[error("contract rejected the call: {0}")]
    ContractRejected(String),
    #[error("unknown token contract {0}")]
    UnknownToken(Address),
    #[error("unknown bet request {0}")]
    UnknownRequest(RequestId),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors surfaced by the coordinator and the rest of the client.
///
/// `ResolutionTimeout` is not a failure of the bet itself: the bet stays
/// tracked as pending and the event channel may still resolve it later.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("user rejected the transaction")]
    UserRejected,
    #[error("insufficient balance: have {available}, tried to bet {requested}")]
    InsufficientBalance {
        available: Amount,
        requested: Amount,
    },
    #[error("bet of {amount} is below the minimum bet of {minimum}")]
    BelowMinimumBet { amount: Amount, minimum: Amount },
    #[error("bet submission rejected: {0}")]
    SubmissionRejected(String),
    #[error("no result for bet {request_id} within {timeout_ms}ms; still waiting")]
    ResolutionTimeout {
        request_id: RequestId,
        timeout_ms: u64,
    },
    #[error("chain access failed: {0}")]
    Chain(#[from] ChainError),
}
