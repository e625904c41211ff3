use pokerdb_types::{Money, RegistryError, TypeError};

/// Errors produced by session ledger and settlement operations.
///
/// A failed operation leaves both the ledger and the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("{0} is already in the session")]
    AlreadyParticipant(String),

    #[error("player not in session: {0}")]
    NotParticipant(String),

    #[error("amount must not be negative: {0}")]
    NegativeAmount(Money),

    #[error("cannot finalize a session with no participants")]
    EmptySession,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("final stacks did not balance after {attempts} attempt(s); off by {difference}")]
    Unbalanced { attempts: u32, difference: Money },

    #[error("input error: {0}")]
    Input(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
