//! Timestamps at the precision the store keeps.
//!
//! Stored timestamps carry microseconds. Anything that is persisted or
//! compared against persisted values goes through here first, so a value
//! reads back exactly as it was written.

use chrono::{DateTime, SubsecRound, Utc};

/// Sub-second digits kept by the store.
pub const STORED_SUBSEC_DIGITS: u16 = 6;

/// `dt` truncated to stored precision.
pub fn stored(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// The current time at stored precision.
pub fn now() -> DateTime<Utc> {
    stored(Utc::now())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn drops_sub_microsecond_digits() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_500);
        assert_eq!(stored(dt).nanosecond(), 1_000);
    }

    #[test]
    fn now_has_no_sub_microsecond_digits() {
        assert_eq!(now().nanosecond() % 1_000, 0);
    }
}
