use cosmwasm_std::{CheckedMultiplyRatioError, OverflowError, StdError, Uint128};
use thiserror::Error;

/// Broad class of a failure, used by clients to decide whether resubmitting
/// with different arguments, a different payment or later in time can help.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Precondition,
    Payment,
    Authorization,
    Reentrancy,
    Internal,
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    MultiplyRatio(#[from] CheckedMultiplyRatioError),

    // Validation
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Deadline must be in the future")]
    DeadlineInPast {},

    #[error("Invalid option index {index}, poll has {option_count} options")]
    InvalidOption { index: u32, option_count: u32 },

    #[error("Winner must be one of the bet parties")]
    InvalidWinner {},

    // Precondition
    #[error("Bet {id} is not open")]
    BetNotOpen { id: u64 },

    #[error("Bet {id} is not accepted")]
    BetNotAccepted { id: u64 },

    #[error("Bet {id} is already resolved")]
    AlreadyResolved { id: u64 },

    #[error("Bet deadline has passed")]
    BetExpired {},

    #[error("Bet deadline has not passed yet")]
    DeadlineNotReached {},

    #[error("Creator cannot accept their own bet")]
    SelfAcceptance {},

    #[error("Poll is closed")]
    PollClosed {},

    #[error("Poll is still open")]
    PollStillOpen {},

    #[error("Already voted")]
    AlreadyVoted {},

    #[error("Raffle is closed")]
    RaffleClosed {},

    #[error("Raffle has not ended yet")]
    RaffleNotEnded {},

    #[error("Raffle {id} already has a pending randomness request")]
    DrawPending { id: u64 },

    #[error("Stake position already exists")]
    PositionExists {},

    #[error("No stake position for this address")]
    NoPosition {},

    #[error("Stake has not matured yet, unlocks at {unlocks_at}")]
    NotMatured { unlocks_at: u64 },

    #[error("Stake already withdrawn")]
    AlreadyWithdrawn {},

    #[error("Stake exceeds pool maximum of {max}")]
    StakeAboveMax { max: Uint128 },

    #[error("Lock duration is shorter than the pool minimum of {min} seconds")]
    LockTooShort { min: u64 },

    #[error("Reward reserve too low: need {needed}, available {available}")]
    InsufficientReserve { needed: Uint128, available: Uint128 },

    #[error("Unknown randomness request {id}")]
    UnknownRequest { id: u64 },

    #[error("Randomness request {id} was already fulfilled")]
    DuplicateFulfillment { id: u64 },

    // Payment
    #[error("Attached value must be greater than zero")]
    NoFunds {},

    #[error("Payment mismatch: expected {expected}, received {received}")]
    PaymentMismatch { expected: Uint128, received: Uint128 },

    #[error("Only {denom} is accepted")]
    WrongDenom { denom: String },

    #[error("Send exactly one coin")]
    MultipleDenoms {},

    #[error("This entry point does not accept funds")]
    UnexpectedFunds {},

    // Authorization
    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Reentrant call rejected")]
    Reentrancy {},
}

impl ContractError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ContractError::InvalidArgument { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        use ContractError::*;
        match self {
            Std(StdError::NotFound { .. }) => ErrorKind::Precondition,
            Std(_) | Overflow(_) | MultiplyRatio(_) => ErrorKind::Internal,
            InvalidArgument { .. } | DeadlineInPast {} | InvalidOption { .. } | InvalidWinner {} => {
                ErrorKind::Validation
            }
            NoFunds {}
            | PaymentMismatch { .. }
            | WrongDenom { .. }
            | MultipleDenoms {}
            | UnexpectedFunds {} => ErrorKind::Payment,
            Unauthorized {} => ErrorKind::Authorization,
            Reentrancy {} => ErrorKind::Reentrancy,
            _ => ErrorKind::Precondition,
        }
    }
}
