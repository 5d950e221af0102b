use criterion::{criterion_group, criterion_main, Criterion};
use railway_ledger_core::{Block, EventRecord, PassengerInfo, TicketBooked, TicketStatus};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn payload() -> Vec<EventRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..10)
        .map(|i| {
            let seats = rng.gen_range(1..5);
            TicketBooked {
                ticket_id: format!("{:012x}", rng.gen::<u64>() & 0xffff_ffff_ffff),
                passenger_info: PassengerInfo::new(format!("user-{i}"), format!("Passenger {i}")),
                train_id: "EXP001".into(),
                num_seats: seats,
                total_fare: 250.0 * seats as f64,
                booking_time: 1_600_000_000_000 + i,
                status: TicketStatus::Confirmed,
            }
            .into()
        })
        .collect()
}

fn bench_seal(c: &mut Criterion) {
    let block = Block::new(1, 1_600_000_000_000, payload(), "0");

    c.bench_function("seal_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            candidate.seal(3);
        });
    });

    c.bench_function("seal_parallel_difficulty_4", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            candidate.seal_parallel(4);
        });
    });
}

criterion_group!(benches, bench_seal);
criterion_main!(benches);
