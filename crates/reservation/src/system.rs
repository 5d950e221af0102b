//! Account-aware front end over the contract.
//!
//! Reservations and cancellations made here are sealed immediately, with the
//! acting user as the reward beneficiary. Callers sharing one system across
//! threads must serialize access behind a single lock.

use railway_ledger_core::{PassengerInfo, TicketBooked, UserRegistered};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::contract::{
    BookingReceipt, CancellationReceipt, ReservationContract, TicketLookup, TrainSummary,
};
use crate::directory::{InMemoryUserDirectory, PersonalInfo, UserDirectory};
use crate::error::{ContractError, ServiceError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainDetails {
    pub train_id: String,
    pub route: Vec<String>,
    pub seats: u32,
    pub fare_per_seat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerStats {
    pub blocks: usize,
    pub pending: usize,
    pub difficulty: usize,
    pub valid: bool,
}

#[derive(Debug)]
pub struct ReservationSystem<D = InMemoryUserDirectory> {
    contract: ReservationContract,
    directory: D,
}

impl<D: UserDirectory> ReservationSystem<D> {
    pub fn new(contract: ReservationContract, directory: D) -> Self {
        Self {
            contract,
            directory,
        }
    }

    /// Creates the account and queues a `UserRegistered` event.
    pub fn register_user(
        &mut self,
        username: &str,
        password: &str,
        personal_info: PersonalInfo,
    ) -> Result<(), ServiceError> {
        let now = self.contract.ledger().now();
        self.directory.register(username, password, personal_info, now)?;
        self.contract.ledger_mut().add_event(UserRegistered {
            username: username.to_string(),
            registration_time: now,
        });
        info!(username, "user registered");
        Ok(())
    }

    pub fn authenticate_user(&self, username: &str, password: &str) -> bool {
        self.directory.authenticate(username, password)
    }

    /// Registers a train on behalf of an admin. Nothing is sealed.
    pub fn admin_add_train(
        &mut self,
        admin_username: &str,
        admin_password: &str,
        details: TrainDetails,
    ) -> Result<(), ServiceError> {
        if !self.directory.verify_admin(admin_username, admin_password) {
            return Err(ServiceError::AdminAuthenticationFailed);
        }
        self.contract.register_train(
            details.train_id,
            details.route,
            details.seats,
            details.fare_per_seat,
        )?;
        Ok(())
    }

    pub fn search_trains(&self, source: &str, destination: &str) -> Vec<TrainSummary> {
        self.contract.search_trains(source, destination)
    }

    /// Books for a registered user, paying exactly the fare, then seals.
    /// The booking is recorded under `username` whatever `passenger.user` says.
    pub fn make_reservation(
        &mut self,
        username: &str,
        train_id: &str,
        num_seats: u32,
        mut passenger: PassengerInfo,
    ) -> Result<BookingReceipt, ServiceError> {
        self.require_user(username)?;
        let fare_per_seat = self
            .contract
            .train(train_id)
            .map(|train| train.fare_per_seat)
            .ok_or_else(|| ContractError::TrainNotFound(train_id.to_string()))?;

        passenger.user = username.to_string();
        let payment = fare_per_seat * num_seats as f64;
        let receipt = self.contract.book_ticket(passenger, train_id, num_seats, payment)?;
        self.contract.seal_pending(username);
        Ok(receipt)
    }

    pub fn check_pnr_status(&self, ticket_id: &str) -> Option<TicketLookup> {
        self.contract.find_ticket(ticket_id)
    }

    /// Cancels for a registered user, then seals.
    pub fn cancel_reservation(
        &mut self,
        username: &str,
        ticket_id: &str,
        reason: &str,
    ) -> Result<CancellationReceipt, ServiceError> {
        self.require_user(username)?;
        let receipt = self.contract.cancel_ticket(ticket_id, reason)?;
        self.contract.seal_pending(username);
        Ok(receipt)
    }

    pub fn user_bookings(&self, username: &str) -> Vec<&TicketBooked> {
        self.contract.find_bookings_for(username)
    }

    pub fn validate_integrity(&self) -> bool {
        self.contract.ledger().is_valid()
    }

    pub fn stats(&self) -> LedgerStats {
        let ledger = self.contract.ledger();
        LedgerStats {
            blocks: ledger.block_count(),
            pending: ledger.pending().len(),
            difficulty: ledger.difficulty(),
            valid: ledger.is_valid(),
        }
    }

    pub fn seal_pending(&mut self, beneficiary: &str) -> String {
        self.contract.seal_pending(beneficiary)
    }

    pub fn contract(&self) -> &ReservationContract {
        &self.contract
    }

    pub fn contract_mut(&mut self) -> &mut ReservationContract {
        &mut self.contract
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    fn require_user(&self, username: &str) -> Result<(), ServiceError> {
        if self.directory.contains(username) {
            Ok(())
        } else {
            Err(ServiceError::UserNotRegistered(username.to_string()))
        }
    }
}
