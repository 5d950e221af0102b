//! Append-only, tamper-evident ledger of railway reservation events.
//!
//! Events are buffered with [`Ledger::add_event`] and sealed into blocks by a
//! proof-of-work search in [`Ledger::seal_pending`]. Each block hashes a
//! sorted-key JSON encoding of its content and links to the previous block's
//! hash, so [`Ledger::is_valid`] can detect any later edit.

pub mod block;
pub mod clock;
pub mod config;
pub mod constants;
pub mod event;
pub mod ledger;
pub mod pow;

pub use block::Block;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LedgerConfig};
pub use event::{
    EventRecord, MiningReward, PassengerInfo, TicketBooked, TicketCancelled, TicketStatus,
    TrainRegistered, UserRegistered,
};
pub use ledger::{genesis_block, Ledger};

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}
