//! Records stored in block payloads.
//!
//! Every record is self-describing: it carries enough fields to be read without
//! any live state, so the chain alone is enough to rebuild the reservation view.

use serde::{Deserialize, Serialize};

/// Who a ticket was booked for, and by which account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassengerInfo {
    /// Account that made the booking.
    pub user: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl PassengerInfo {
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            age: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Confirmed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainRegistered {
    pub train_id: String,
    pub route: Vec<String>,
    pub total_seats: u32,
    pub fare_per_seat: f64,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketBooked {
    pub ticket_id: String,
    pub passenger_info: PassengerInfo,
    pub train_id: String,
    pub num_seats: u32,
    pub total_fare: f64,
    pub booking_time: u64,
    pub status: TicketStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketCancelled {
    pub original_ticket_id: String,
    pub cancellation_time: u64,
    pub refund_amount: f64,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub username: String,
    pub registration_time: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiningReward {
    pub amount: f64,
    pub to: String,
}

/// A payload element. Serialized with a `type` tag so the record stands on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    Genesis { message: String },
    TrainRegistration(TrainRegistered),
    TicketBooking(TicketBooked),
    TicketCancellation(TicketCancelled),
    UserRegistration(UserRegistered),
    MiningReward(MiningReward),
}

impl EventRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            EventRecord::Genesis { .. } => "genesis",
            EventRecord::TrainRegistration(_) => "train_registration",
            EventRecord::TicketBooking(_) => "ticket_booking",
            EventRecord::TicketCancellation(_) => "ticket_cancellation",
            EventRecord::UserRegistration(_) => "user_registration",
            EventRecord::MiningReward(_) => "mining_reward",
        }
    }

    pub fn as_booking(&self) -> Option<&TicketBooked> {
        match self {
            EventRecord::TicketBooking(booking) => Some(booking),
            _ => None,
        }
    }

    pub fn as_cancellation(&self) -> Option<&TicketCancelled> {
        match self {
            EventRecord::TicketCancellation(cancellation) => Some(cancellation),
            _ => None,
        }
    }
}

impl From<TrainRegistered> for EventRecord {
    fn from(value: TrainRegistered) -> Self {
        EventRecord::TrainRegistration(value)
    }
}

impl From<TicketBooked> for EventRecord {
    fn from(value: TicketBooked) -> Self {
        EventRecord::TicketBooking(value)
    }
}

impl From<TicketCancelled> for EventRecord {
    fn from(value: TicketCancelled) -> Self {
        EventRecord::TicketCancellation(value)
    }
}

impl From<UserRegistered> for EventRecord {
    fn from(value: UserRegistered) -> Self {
        EventRecord::UserRegistration(value)
    }
}

impl From<MiningReward> for EventRecord {
    fn from(value: MiningReward) -> Self {
        EventRecord::MiningReward(value)
    }
}
