//! Railway reservations on top of [`railway_ledger_core`].
//!
//! [`ReservationContract`] enforces seat inventory, payment and refund rules
//! and turns each accepted intent into ledger events. [`ReservationSystem`]
//! adds user accounts and seals after every reservation or cancellation.

pub mod contract;
pub mod directory;
pub mod error;
pub mod refund;
pub mod system;

pub use contract::{
    ticket_id, BookingReceipt, CancellationReceipt, ContractPolicy, ReservationContract,
    TicketLookup, TrainSchedule, TrainSummary,
};
pub use directory::{InMemoryUserDirectory, PersonalInfo, UserAccount, UserDirectory};
pub use error::{ContractError, ServiceError};
pub use system::{LedgerStats, ReservationSystem, TrainDetails};
