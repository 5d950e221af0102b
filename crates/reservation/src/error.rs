use thiserror::Error;

/// Expected, recoverable outcomes of contract calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    #[error("train {0} not found")]
    TrainNotFound(String),
    #[error("insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },
    #[error("insufficient payment: fare is {required}, offered {offered}")]
    InsufficientPayment { required: f64, offered: f64 },
    #[error("ticket {0} not found")]
    TicketNotFound(String),
    #[error("train {0} is already registered")]
    TrainAlreadyRegistered(String),
    #[error("ticket {0} is already cancelled")]
    TicketAlreadyCancelled(String),
}

/// Failures of the orchestration layer around the contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("user {0} already exists")]
    UserAlreadyExists(String),
    #[error("user {0} is not registered")]
    UserNotRegistered(String),
    #[error("admin authentication failed")]
    AdminAuthenticationFailed,
    #[error(transparent)]
    Contract(#[from] ContractError),
}
