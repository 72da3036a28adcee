//! Human-readable reference generation for bookings and orders.
//!
//! References look like `BKG-20250601-042137` (prefix, date, six random
//! digits). Uniqueness is guaranteed by the store's unique index; callers
//! retry generation a bounded number of times on collision instead of
//! probing forever.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix used for booking references
pub const BOOKING_PREFIX: &str = "BKG";

/// Prefix used for order numbers
pub const ORDER_PREFIX: &str = "ORD";

/// How many collisions a caller tolerates before giving up with an
/// internal error. Six random digits per day make even one collision rare.
pub const MAX_ATTEMPTS: u32 = 8;

/// Generates one candidate reference: `PREFIX-YYYYMMDD-NNNNNN`.
#[must_use]
pub fn generate(prefix: &str, now: DateTime<Utc>) -> String {
    let date_part = now.format("%Y%m%d");
    let random_part: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{prefix}-{date_part}-{random_part:06}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reference_format() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let reference = generate(BOOKING_PREFIX, now);
        assert!(reference.starts_with("BKG-20250601-"));
        assert_eq!(reference.len(), "BKG-20250601-".len() + 6);
        let suffix = &reference["BKG-20250601-".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn order_numbers_use_their_own_prefix() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        assert!(generate(ORDER_PREFIX, now).starts_with("ORD-"));
    }
}
