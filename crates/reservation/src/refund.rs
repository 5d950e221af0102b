//! Tiered cancellation refunds.

use railway_ledger_core::constants::MILLIS_PER_HOUR;

pub const PROCESSING_TIME: &str = "3-5 business days";

/// Hours between booking and cancellation. A booking time ahead of `now` counts as zero.
pub fn hours_elapsed(booking_time: u64, now: u64) -> f64 {
    now.saturating_sub(booking_time) as f64 / MILLIS_PER_HOUR as f64
}

/// Share of the fare returned: 90% after more than 24 hours, 50% after more
/// than 12, otherwise 10%.
pub fn refund_percentage(hours: f64) -> f64 {
    if hours > 24.0 {
        0.9
    } else if hours > 12.0 {
        0.5
    } else {
        0.1
    }
}

pub fn refund_amount(total_fare: f64, booking_time: u64, now: u64) -> f64 {
    total_fare * refund_percentage(hours_elapsed(booking_time, now))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    fn hours_ago(hours: f64) -> u64 {
        NOW - (hours * MILLIS_PER_HOUR as f64).round() as u64
    }

    #[test]
    fn tiers() {
        assert_eq!(refund_percentage(25.0), 0.9);
        assert_eq!(refund_percentage(13.0), 0.5);
        assert_eq!(refund_percentage(1.0), 0.1);
        assert_eq!(refund_percentage(0.0), 0.1);
    }

    #[test]
    fn boundaries_are_exclusive_on_the_lower_side() {
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(24.0001), NOW)), 0.9);
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(24.0), NOW)), 0.5);
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(23.9999), NOW)), 0.5);
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(12.0001), NOW)), 0.5);
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(12.0), NOW)), 0.1);
        assert_eq!(refund_percentage(hours_elapsed(hours_ago(11.9999), NOW)), 0.1);
    }

    #[test]
    fn future_booking_time_counts_as_zero_hours() {
        assert_eq!(hours_elapsed(NOW + 10_000, NOW), 0.0);
        assert_eq!(refund_amount(100.0, NOW + 10_000, NOW), 100.0 * 0.1);
    }

    #[test]
    fn refund_amount_scales_fare() {
        assert_eq!(refund_amount(200.0, hours_ago(25.0), NOW), 200.0 * 0.9);
        assert_eq!(refund_amount(200.0, hours_ago(13.0), NOW), 100.0);
    }
}
