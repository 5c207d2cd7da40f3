use crate::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current timestamp in nanoseconds.
#[must_use]
pub fn timestamp() -> Timestamp {
    from_system_time(SystemTime::now())
}

/// Converts a [`SystemTime`] into signed nanoseconds since the Unix epoch.
///
/// Points in time before the epoch become negative. Values outside of
/// the `i64` range saturate.
#[must_use]
pub fn from_system_time(time: SystemTime) -> Timestamp {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => i64::try_from(since.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |nanos| -nanos),
    }
}

/// Rounds a timestamp down to the start of its bucket.
///
/// Uses a flooring modulo, so timestamps before the epoch round towards
/// negative infinity: with 1s buckets, `-1ns` belongs to the bucket at `-1s`.
///
/// Timestamps whose floored key would lie below `i64::MIN` saturate to the
/// lowest key that can be represented, which is the bucket right after it.
///
/// `quantization` must be positive.
#[must_use]
pub fn round_down(ts: Timestamp, quantization: i64) -> Timestamp {
    debug_assert!(quantization > 0, "quantization must be positive");

    let offset = ts.rem_euclid(quantization);

    // NOTE: quantization - offset is in (0, quantization], so this cannot overflow near i64::MIN
    ts.checked_sub(offset)
        .unwrap_or_else(|| ts + (quantization - offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Duration;
    use test_log::test;

    const SECOND: i64 = Duration::seconds(1);

    #[test]
    fn round_down_positive() {
        assert_eq!(0, round_down(0, SECOND));
        assert_eq!(0, round_down(SECOND - 1, SECOND));
        assert_eq!(SECOND, round_down(SECOND, SECOND));
        assert_eq!(3 * SECOND, round_down(3 * SECOND + 17, SECOND));
    }

    #[test]
    fn round_down_floors_before_epoch() {
        assert_eq!(-SECOND, round_down(-1, SECOND));
        assert_eq!(-SECOND, round_down(-SECOND, SECOND));
        assert_eq!(-2 * SECOND, round_down(-SECOND - 1, SECOND));
        assert_eq!(-10, round_down(-7, 5));
    }

    #[test]
    fn round_down_is_idempotent() {
        for q in [1, 3, 7, 1_000, SECOND] {
            for ts in [-SECOND * 5 - 3, -q, -1, 0, 1, q - 1, q, 123_456_789] {
                let rounded = round_down(ts, q);
                assert_eq!(rounded, round_down(rounded, q));
                assert_eq!(0, rounded.rem_euclid(q));
                assert!(rounded <= ts);
                assert!(ts - rounded < q);
            }
        }
    }

    #[test]
    fn round_down_at_i64_limits() {
        for q in [1, 2, 3, 7, 1_000, SECOND, Duration::weeks(1)] {
            let lowest = round_down(i64::MIN, q);
            assert_eq!(0, lowest.rem_euclid(q));
            assert_eq!(lowest, round_down(lowest, q));
            assert!(i128::from(lowest) - i128::from(i64::MIN) < i128::from(q));

            // NOTE: the whole partial bucket below `lowest` saturates to it
            if lowest > i64::MIN {
                assert_eq!(lowest, round_down(lowest - 1, q));
            }

            let highest = round_down(i64::MAX, q);
            assert_eq!(0, highest.rem_euclid(q));
            assert!(highest <= i64::MAX);
            assert!(i64::MAX - highest < q);
        }

        assert_eq!(i64::MIN, round_down(i64::MIN, 1));
        assert_eq!(i64::MIN, round_down(i64::MIN, 2));
        assert_eq!(-9_223_372_036_000_000_000, round_down(i64::MIN, SECOND));
        assert_eq!(9_223_372_036_000_000_000, round_down(i64::MAX, SECOND));
    }

    #[test]
    fn far_past_system_time_can_be_rounded() {
        let far_past = UNIX_EPOCH - std::time::Duration::from_secs(400 * 365 * 86_400);
        let ts = from_system_time(far_past);
        assert_eq!(i64::MIN, ts);
        assert_eq!(-9_223_372_036_000_000_000, round_down(ts, SECOND));
    }

    #[test]
    fn system_time_conversion() {
        let after = UNIX_EPOCH + std::time::Duration::from_nanos(1_500);
        assert_eq!(1_500, from_system_time(after));

        let before = UNIX_EPOCH - std::time::Duration::from_nanos(1_500);
        assert_eq!(-1_500, from_system_time(before));

        assert_eq!(0, from_system_time(UNIX_EPOCH));
    }

    #[test]
    fn timestamp_is_after_epoch() {
        assert!(timestamp() > 0);
    }
}
