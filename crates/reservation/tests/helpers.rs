use std::sync::Arc;

use railway_ledger_core::{Ledger, LedgerConfig, ManualClock};
use railway_reservation::{
    InMemoryUserDirectory, PersonalInfo, ReservationContract, ReservationSystem, TrainDetails,
};
use tracing_subscriber::EnvFilter;

pub const START: u64 = 1_700_000_000_000;
pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "railway-admin";

pub fn init_tracing() {
    // Several tests share one process; only the first init wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn create_system() -> (ReservationSystem, ManualClock) {
    init_tracing();
    let clock = ManualClock::new(START);
    let config = LedgerConfig::default().with_difficulty(2);
    let ledger = Ledger::with_clock(config, Arc::new(clock.clone())).expect("valid config");
    let directory = InMemoryUserDirectory::new().with_admin(ADMIN, ADMIN_PASSWORD);
    (
        ReservationSystem::new(ReservationContract::new(ledger), directory),
        clock,
    )
}

pub fn personal_info(name: &str) -> PersonalInfo {
    PersonalInfo {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-0100".to_string(),
    }
}

pub fn sample_trains() -> Vec<TrainDetails> {
    vec![
        TrainDetails {
            train_id: "EXP001".to_string(),
            route: vec!["Mumbai".into(), "Pune".into(), "Bangalore".into()],
            seats: 100,
            fare_per_seat: 250.0,
        },
        TrainDetails {
            train_id: "RAJ002".to_string(),
            route: vec!["Delhi".into(), "Jaipur".into(), "Mumbai".into()],
            seats: 150,
            fare_per_seat: 300.0,
        },
    ]
}
