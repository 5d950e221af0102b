//! Reservation rules over the ledger.
//!
//! The contract keeps a live projection of every registered train's seat
//! count. Each successful call updates the projection and queues the matching
//! event in the same step, so the projection always equals a replay of the
//! sealed and pending events. Ticket lookups read the sealed chain only.

use railway_ledger_core::{
    sha256_hex, EventRecord, Ledger, PassengerInfo, TicketBooked, TicketCancelled, TicketStatus,
    TrainRegistered,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::error::ContractError;
use crate::refund::{self, PROCESSING_TIME};

pub const TICKET_ID_LEN: usize = 12;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainSchedule {
    pub route: Vec<String>,
    pub total_seats: u32,
    /// Always within `0..=total_seats`.
    pub available_seats: u32,
    pub fare_per_seat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainSummary {
    pub train_id: String,
    pub route: Vec<String>,
    pub available_seats: u32,
    pub fare_per_seat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingReceipt {
    pub ticket_id: String,
    pub fare_paid: f64,
    /// Payment minus fare.
    pub change: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CancellationReceipt {
    pub ticket_id: String,
    pub refund_amount: f64,
    pub processing_time: &'static str,
}

/// A sealed booking and where it lives in the chain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TicketLookup {
    pub booking: TicketBooked,
    pub block_index: u64,
    pub block_hash: String,
    pub block_timestamp: u64,
    /// A sealed cancellation references this ticket.
    pub cancelled: bool,
}

/// Opt-in guards. Both default to off, which keeps re-registration as an
/// overwrite and lets a ticket be cancelled more than once.
///
/// Even unguarded, a repeat cancellation never lifts `available_seats` above
/// `total_seats`; restored seats saturate at capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContractPolicy {
    pub reject_duplicate_trains: bool,
    pub reject_repeat_cancellation: bool,
}

#[derive(Debug)]
pub struct ReservationContract {
    ledger: Ledger,
    train_schedules: BTreeMap<String, TrainSchedule>,
    policy: ContractPolicy,
}

impl ReservationContract {
    /// Starts with an empty projection, whatever the ledger already holds.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            train_schedules: BTreeMap::new(),
            policy: ContractPolicy::default(),
        }
    }

    /// Rebuilds the projection by replaying sealed, then pending, events.
    pub fn from_ledger(ledger: Ledger) -> Self {
        let mut contract = Self::new(ledger);
        let mut bookings: HashMap<String, (String, u32)> = HashMap::new();

        let sealed = contract.ledger.sealed_events().map(|(_, record)| record);
        let records: Vec<&EventRecord> = sealed.chain(contract.ledger.pending()).collect();
        let mut schedules = BTreeMap::new();
        for record in records {
            match record {
                EventRecord::TrainRegistration(train) => {
                    schedules.insert(train.train_id.clone(), schedule_for(train));
                }
                EventRecord::TicketBooking(booking) => {
                    if let Some(train) = schedules.get_mut(&booking.train_id) {
                        train.available_seats =
                            train.available_seats.saturating_sub(booking.num_seats);
                    }
                    bookings
                        .entry(booking.ticket_id.clone())
                        .or_insert_with(|| (booking.train_id.clone(), booking.num_seats));
                }
                EventRecord::TicketCancellation(cancellation) => {
                    let original = bookings.get(&cancellation.original_ticket_id);
                    if let Some((train_id, seats)) = original {
                        restore_seats(&mut schedules, train_id, *seats);
                    }
                }
                _ => {}
            }
        }
        contract.train_schedules = schedules;
        info!(trains = contract.train_schedules.len(), "projection rebuilt from ledger");
        contract
    }

    pub fn with_policy(mut self, policy: ContractPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ContractPolicy {
        self.policy
    }

    /// Adds a train to the projection and queues a `TrainRegistered` event.
    ///
    /// Registering an existing id replaces its schedule, seat count included,
    /// unless [`ContractPolicy::reject_duplicate_trains`] is set.
    pub fn register_train(
        &mut self,
        train_id: impl Into<String>,
        route: Vec<String>,
        seats: u32,
        fare_per_seat: f64,
    ) -> Result<(), ContractError> {
        let train_id = train_id.into();
        if self.train_schedules.contains_key(&train_id) {
            if self.policy.reject_duplicate_trains {
                return Err(ContractError::TrainAlreadyRegistered(train_id));
            }
            warn!(%train_id, "train re-registered, previous schedule overwritten");
        }

        let event = TrainRegistered {
            train_id: train_id.clone(),
            route,
            total_seats: seats,
            fare_per_seat,
            timestamp: self.ledger.now(),
        };
        self.train_schedules.insert(train_id.clone(), schedule_for(&event));
        self.ledger.add_event(event);
        info!(%train_id, seats, fare_per_seat, "train registered");
        Ok(())
    }

    /// Books `num_seats` on `train_id`, takes them from the projection and
    /// queues a confirmed `TicketBooked` event.
    pub fn book_ticket(
        &mut self,
        passenger_info: PassengerInfo,
        train_id: &str,
        num_seats: u32,
        payment_amount: f64,
    ) -> Result<BookingReceipt, ContractError> {
        let now = self.ledger.now();
        let train = self
            .train_schedules
            .get_mut(train_id)
            .ok_or_else(|| ContractError::TrainNotFound(train_id.to_string()))?;

        let total_fare = train.fare_per_seat * num_seats as f64;
        if train.available_seats < num_seats {
            return Err(ContractError::InsufficientSeats {
                requested: num_seats,
                available: train.available_seats,
            });
        }
        if payment_amount < total_fare {
            return Err(ContractError::InsufficientPayment {
                required: total_fare,
                offered: payment_amount,
            });
        }

        // Collisions are possible and not retried.
        let ticket_id = ticket_id(&passenger_info.name, train_id, now);
        train.available_seats -= num_seats;

        self.ledger.add_event(TicketBooked {
            ticket_id: ticket_id.clone(),
            passenger_info,
            train_id: train_id.to_string(),
            num_seats,
            total_fare,
            booking_time: now,
            status: TicketStatus::Confirmed,
        });
        info!(%ticket_id, train_id, num_seats, total_fare, "ticket booked");

        Ok(BookingReceipt {
            ticket_id,
            fare_paid: total_fare,
            change: payment_amount - total_fare,
        })
    }

    /// Cancels a sealed booking: refunds by the tiered policy, gives the seats
    /// back and queues a `TicketCancelled` event.
    ///
    /// Bookings still in the pending buffer cannot be cancelled.
    pub fn cancel_ticket(
        &mut self,
        ticket_id: &str,
        reason: impl Into<String>,
    ) -> Result<CancellationReceipt, ContractError> {
        let booking = self
            .sealed_booking(ticket_id)
            .cloned()
            .ok_or_else(|| ContractError::TicketNotFound(ticket_id.to_string()))?;

        if self.has_cancellation(ticket_id) {
            if self.policy.reject_repeat_cancellation {
                return Err(ContractError::TicketAlreadyCancelled(ticket_id.to_string()));
            }
            warn!(ticket_id, "ticket cancelled again");
        }

        let now = self.ledger.now();
        let refund_amount = refund::refund_amount(booking.total_fare, booking.booking_time, now);
        restore_seats(&mut self.train_schedules, &booking.train_id, booking.num_seats);

        self.ledger.add_event(TicketCancelled {
            original_ticket_id: ticket_id.to_string(),
            cancellation_time: now,
            refund_amount,
            reason: reason.into(),
        });
        info!(ticket_id, refund_amount, "ticket cancelled");

        Ok(CancellationReceipt {
            ticket_id: ticket_id.to_string(),
            refund_amount,
            processing_time: PROCESSING_TIME,
        })
    }

    /// First sealed booking with this id.
    pub fn find_ticket(&self, ticket_id: &str) -> Option<TicketLookup> {
        self.ledger.sealed_events().find_map(|(block, record)| {
            let booking = record.as_booking().filter(|b| b.ticket_id == ticket_id)?;
            Some(TicketLookup {
                booking: booking.clone(),
                block_index: block.index,
                block_hash: block.hash.clone(),
                block_timestamp: block.timestamp,
                cancelled: self.sealed_cancellation_exists(ticket_id),
            })
        })
    }

    /// Every sealed booking made by `user`, in chain order.
    pub fn find_bookings_for(&self, user: &str) -> Vec<&TicketBooked> {
        self.ledger
            .sealed_events()
            .filter_map(|(_, record)| record.as_booking())
            .filter(|booking| booking.passenger_info.user == user)
            .collect()
    }

    /// Trains whose route visits `source` strictly before `destination`.
    pub fn search_trains(&self, source: &str, destination: &str) -> Vec<TrainSummary> {
        self.train_schedules
            .iter()
            .filter(|(_, train)| {
                let from = train.route.iter().position(|station| station == source);
                let to = train.route.iter().position(|station| station == destination);
                matches!((from, to), (Some(from), Some(to)) if from < to)
            })
            .map(|(train_id, train)| TrainSummary {
                train_id: train_id.clone(),
                route: train.route.clone(),
                available_seats: train.available_seats,
                fare_per_seat: train.fare_per_seat,
            })
            .collect()
    }

    pub fn train(&self, train_id: &str) -> Option<&TrainSchedule> {
        self.train_schedules.get(train_id)
    }

    /// Registered trains ordered by id.
    pub fn trains(&self) -> impl Iterator<Item = (&String, &TrainSchedule)> + '_ {
        self.train_schedules.iter()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Seals everything queued so far. See [`Ledger::seal_pending`].
    pub fn seal_pending(&mut self, beneficiary: impl Into<String>) -> String {
        self.ledger.seal_pending(beneficiary)
    }

    /// Earliest sealed booking with this id. When ids collide, cancellation acts
    /// on that booking, the same one [`ReservationContract::find_ticket`] reports,
    /// rather than on the latest.
    fn sealed_booking(&self, ticket_id: &str) -> Option<&TicketBooked> {
        self.ledger
            .sealed_events()
            .filter_map(|(_, record)| record.as_booking())
            .find(|booking| booking.ticket_id == ticket_id)
    }

    fn sealed_cancellation_exists(&self, ticket_id: &str) -> bool {
        self.ledger
            .sealed_events()
            .filter_map(|(_, record)| record.as_cancellation())
            .any(|cancellation| cancellation.original_ticket_id == ticket_id)
    }

    fn has_cancellation(&self, ticket_id: &str) -> bool {
        self.sealed_cancellation_exists(ticket_id)
            || self
                .ledger
                .pending()
                .iter()
                .filter_map(EventRecord::as_cancellation)
                .any(|cancellation| cancellation.original_ticket_id == ticket_id)
    }
}

/// First twelve hex characters of SHA-256 over name, train id and booking time.
pub fn ticket_id(passenger_name: &str, train_id: &str, booking_time: u64) -> String {
    let mut id = sha256_hex(format!("{passenger_name}{train_id}{booking_time}"));
    id.truncate(TICKET_ID_LEN);
    id
}

fn schedule_for(event: &TrainRegistered) -> TrainSchedule {
    TrainSchedule {
        route: event.route.clone(),
        total_seats: event.total_seats,
        available_seats: event.total_seats,
        fare_per_seat: event.fare_per_seat,
    }
}

/// Gives seats back to a train that is still registered, never above its capacity.
fn restore_seats(schedules: &mut BTreeMap<String, TrainSchedule>, train_id: &str, seats: u32) {
    if let Some(train) = schedules.get_mut(train_id) {
        train.available_seats = train
            .available_seats
            .saturating_add(seats)
            .min(train.total_seats);
    }
}
