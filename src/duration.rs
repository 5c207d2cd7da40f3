/// Helpers for calculating durations
///
/// All functions return a nanosecond count, which is the unit
/// bucket widths and timestamps are expressed in.
///
/// ```
/// use bucketsum::{Accumulator, Duration};
///
/// let counter = Accumulator::new(Duration::minutes(1))?;
///
/// counter.add(Duration::minutes(3), 5);
/// counter.add(Duration::minutes(3) + Duration::seconds(20), 2);
///
/// assert_eq!(7, counter.sum(0, Duration::minutes(10))?);
///
/// // 7 spread over two 5-minute periods
/// assert_eq!(3, counter.avg(0, Duration::minutes(10), Duration::minutes(5))?);
/// #
/// # Ok::<(), bucketsum::Error>(())
/// ```
pub struct Duration;

const MICRO: i64 = 1_000;
const MILLI: i64 = 1_000 * MICRO;
const SECOND: i64 = 1_000 * MILLI;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

impl Duration {
    /// `n` weeks in signed nanoseconds.
    #[must_use]
    pub const fn weeks(n: i64) -> i64 {
        n * 7 * DAY
    }

    /// `n` days in signed nanoseconds.
    #[must_use]
    pub const fn days(n: i64) -> i64 {
        n * DAY
    }

    /// `n` hours in signed nanoseconds.
    #[must_use]
    pub const fn hours(n: i64) -> i64 {
        n * HOUR
    }

    /// `n` minutes in signed nanoseconds, e.g. as a bucket width.
    #[must_use]
    pub const fn minutes(n: i64) -> i64 {
        n * MINUTE
    }

    /// `n` seconds in signed nanoseconds.
    ///
    /// Negative values are offsets into the past.
    #[must_use]
    pub const fn seconds(n: i64) -> i64 {
        n * SECOND
    }

    /// `n` milliseconds in signed nanoseconds.
    #[must_use]
    pub const fn millis(n: i64) -> i64 {
        n * MILLI
    }

    /// `n` microseconds in signed nanoseconds.
    #[must_use]
    pub const fn micros(n: i64) -> i64 {
        n * MICRO
    }

    /// Identity, for symmetry with the other units.
    #[must_use]
    pub const fn nanos(n: i64) -> i64 {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn units() {
        assert_eq!(1_000, Duration::micros(1));
        assert_eq!(1_000_000_000, Duration::seconds(1));
        assert_eq!(Duration::seconds(3_600), Duration::hours(1));
        assert_eq!(Duration::days(14), Duration::weeks(2));
        assert_eq!(-Duration::millis(5), Duration::millis(-5));
    }
}
