use crate::{builder::Builder, time, Duration, Error, Timestamp, Value};
use std::collections::{hash_map::Entry, BTreeMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Buckets = crate::HashMap<Timestamp, Value>;

/// Half-open range of bucket keys `[start, end)`.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: Timestamp,
    end: Timestamp,

    /// Amount of buckets covered by the span
    len: u64,
}

impl Span {
    fn nanos(self) -> i128 {
        i128::from(self.end) - i128::from(self.start)
    }

    fn contains(self, key: Timestamp) -> bool {
        (self.start..self.end).contains(&key)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn keys(self, quantization: i64) -> impl Iterator<Item = Timestamp> {
        // NOTE: Every key stays inside [start, end), so the cast cannot truncate
        (0..self.len).map(move |idx| {
            (i128::from(self.start) + i128::from(idx) * i128::from(quantization)) as i64
        })
    }

    /// Whether stepping through the span is cheaper than walking every stored bucket.
    fn is_dense(self, stored: usize) -> bool {
        self.len <= stored as u64
    }
}

/// A time-bucketed integer accumulator.
///
/// Values are added at a timestamp (nanoseconds since the Unix epoch), which is rounded
/// down to a multiple of the quantization interval. Every bucket holds the sum of all
/// values added to it. Buckets are only stored once written to, unwritten buckets read as 0.
///
/// All range queries take a half-open range `[from, to)`, after rounding both bounds down
/// to their bucket.
///
/// The accumulator is internally synchronized with a reader-writer lock,
/// so it can be shared between threads (e.g. using an `Arc`).
pub struct Accumulator {
    quantization: i64,
    buckets: RwLock<Buckets>,
}

impl std::fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("quantization", &self.quantization)
            .field("buckets", &self.len())
            .finish()
    }
}

impl Accumulator {
    /// Creates an accumulator with the given bucket width in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns error if the quantization is not a positive amount of nanoseconds.
    pub fn new(quantization: i64) -> crate::Result<Self> {
        Self::builder().quantization(quantization).build()
    }

    /// Creates a builder to configure an accumulator.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_parts(quantization: i64, capacity: usize) -> Self {
        Self {
            quantization,
            buckets: RwLock::new(Buckets::with_capacity_and_hasher(
                capacity,
                rustc_hash::FxBuildHasher,
            )),
        }
    }

    #[allow(clippy::expect_used)]
    fn read(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().expect("lock is poisoned")
    }

    #[allow(clippy::expect_used)]
    fn write(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().expect("lock is poisoned")
    }

    fn span(&self, from: Timestamp, to: Timestamp) -> crate::Result<Span> {
        let start = self.round_down(from);
        let end = self.round_down(to);

        if start > end {
            log::debug!("rejecting inverted range [{start}, {end})");
            return Err(Error::InvalidRange {
                from: start,
                to: end,
            });
        }

        let len = (i128::from(end) - i128::from(start)) / i128::from(self.quantization);

        Ok(Span {
            start,
            end,
            len: u64::try_from(len).unwrap_or(u64::MAX),
        })
    }

    /// Iterates over the stored buckets inside the span, in no particular order.
    fn stored_in<'a>(
        &self,
        buckets: &'a Buckets,
        span: Span,
    ) -> Box<dyn Iterator<Item = (Timestamp, Value)> + 'a> {
        if span.is_dense(buckets.len()) {
            Box::new(
                span.keys(self.quantization)
                    .filter_map(move |key| buckets.get(&key).map(|&value| (key, value))),
            )
        } else {
            Box::new(
                buckets
                    .iter()
                    .filter(move |(key, _)| span.contains(**key))
                    .map(|(&key, &value)| (key, value)),
            )
        }
    }

    fn bounds(buckets: &Buckets) -> Option<(Timestamp, Timestamp)> {
        let mut keys = buckets.keys().copied();
        let first = keys.next()?;
        Some(keys.fold((first, first), |(lo, hi), key| (lo.min(key), hi.max(key))))
    }

    fn sum_span(&self, span: Span) -> Value {
        let buckets = self.read();
        self.stored_in(&buckets, span)
            .fold(0, |sum, (_, value)| sum.saturating_add(value))
    }

    /// Returns the bucket width in nanoseconds.
    #[must_use]
    pub fn quantization(&self) -> i64 {
        self.quantization
    }

    /// Returns the amount of stored buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no bucket has been written to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rounds a timestamp down to the key of the bucket it falls into.
    #[must_use]
    pub fn round_down(&self, ts: Timestamp) -> Timestamp {
        time::round_down(ts, self.quantization)
    }

    /// Adds a value to the bucket the timestamp falls into.
    ///
    /// Values accumulate, negative values decrement the bucket.
    /// A bucket saturates at `i64::MIN`/`i64::MAX` instead of overflowing.
    pub fn add(&self, ts: Timestamp, value: Value) {
        let key = self.round_down(ts);

        match self.write().entry(key) {
            Entry::Occupied(mut entry) => {
                let bucket = entry.get_mut();
                *bucket = bucket.saturating_add(value);
            }
            Entry::Vacant(entry) => {
                log::trace!("creating bucket {key}");
                entry.insert(value);
            }
        }
    }

    /// Adds a value to the bucket of the current time.
    pub fn add_now(&self, value: Value) {
        self.add(time::timestamp(), value);
    }

    /// Sums all buckets in `[from, to)`.
    ///
    /// The sum saturates at `i64::MIN`/`i64::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `from` rounds to a later bucket than `to`.
    pub fn sum(&self, from: Timestamp, to: Timestamp) -> crate::Result<Value> {
        let span = self.span(from, to)?;
        Ok(self.sum_span(span))
    }

    /// Averages the sum of `[from, to)` over periods of `quant` nanoseconds.
    ///
    /// The amount of periods is the rounded range width divided by `quant`
    /// (truncated), but at least 1. `quant` does not need to relate to the
    /// bucket width of the accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `from` rounds to a later bucket than `to`,
    /// and [`Error::InvalidQuantization`] if `quant` is not positive.
    #[allow(clippy::cast_possible_truncation)]
    pub fn avg(&self, from: Timestamp, to: Timestamp, quant: i64) -> crate::Result<Value> {
        if quant <= 0 {
            return Err(Error::InvalidQuantization(quant));
        }

        let span = self.span(from, to)?;
        let periods = (span.nanos() / i128::from(quant)).max(1);
        let sum = self.sum_span(span);

        // NOTE: periods >= 1, so the quotient is never larger than the sum
        Ok((i128::from(sum) / periods) as Value)
    }

    /// Averages the sum of `[from, to)` per second.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `from` rounds to a later bucket than `to`.
    pub fn avg_per_second(&self, from: Timestamp, to: Timestamp) -> crate::Result<Value> {
        self.avg(from, to, Duration::seconds(1))
    }

    /// Returns the value of every bucket in `[from, to)` in chronological order.
    ///
    /// Unwritten buckets are filled with 0, so index `i` is the bucket
    /// `i` quantization steps after `from`'s bucket.
    ///
    /// Returns an empty list for empty or inverted ranges.
    ///
    /// # Panics
    ///
    /// Panics if the range covers more buckets than can be allocated.
    #[must_use]
    pub fn interval_slice(&self, from: Timestamp, to: Timestamp) -> Vec<Value> {
        let Ok(span) = self.span(from, to) else {
            return vec![];
        };

        let mut serie = Vec::with_capacity(usize::try_from(span.len).unwrap_or(usize::MAX));

        let buckets = self.read();
        serie.extend(
            span.keys(self.quantization)
                .map(|key| buckets.get(&key).copied().unwrap_or_default()),
        );

        serie
    }

    /// Returns the stored buckets in `[from, to)`, keyed by bucket timestamp.
    ///
    /// Unlike [`Accumulator::interval_slice`], unwritten buckets are left out.
    ///
    /// Returns an empty map for empty or inverted ranges.
    #[must_use]
    pub fn interval_map(&self, from: Timestamp, to: Timestamp) -> BTreeMap<Timestamp, Value> {
        let Ok(span) = self.span(from, to) else {
            return BTreeMap::new();
        };

        let buckets = self.read();
        self.stored_in(&buckets, span).collect()
    }

    /// Returns the keys of the earliest and the latest stored bucket.
    ///
    /// Returns `None` if no bucket has been written to.
    #[must_use]
    pub fn first_last(&self) -> Option<(Timestamp, Timestamp)> {
        Self::bounds(&self.read())
    }

    /// Removes all buckets in `[from, to)`.
    ///
    /// Does nothing for empty or inverted ranges.
    pub fn clear_interval(&self, from: Timestamp, to: Timestamp) {
        let Ok(span) = self.span(from, to) else {
            return;
        };

        let mut buckets = self.write();
        let before = buckets.len();

        if span.is_dense(before) {
            for key in span.keys(self.quantization) {
                buckets.remove(&key);
            }
        } else {
            buckets.retain(|&key, _| !span.contains(key));
        }

        log::trace!(
            "cleared {} buckets in [{}, {})",
            before - buckets.len(),
            span.start,
            span.end,
        );
    }

    /// Removes all buckets.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns a human-readable dump of all buckets between the first and the
    /// last stored bucket.
    ///
    /// Buckets holding 0 are skipped, unless `show_zeroes` is set.
    ///
    /// ```
    /// use bucketsum::{Accumulator, Duration};
    ///
    /// let counter = Accumulator::new(Duration::seconds(1))?;
    /// counter.add(Duration::seconds(1), 4);
    /// counter.add(Duration::seconds(3), 2);
    ///
    /// assert_eq!(
    ///     "[\n    1000000000: 4\n    3000000000: 2\n]",
    ///     counter.pretty(false).to_string(),
    /// );
    /// #
    /// # Ok::<(), bucketsum::Error>(())
    /// ```
    #[must_use]
    pub fn pretty(&self, show_zeroes: bool) -> Pretty<'_> {
        Pretty {
            accumulator: self,
            show_zeroes,
        }
    }

    /// Prints [`Accumulator::pretty`] to stdout.
    pub fn pretty_print(&self, show_zeroes: bool) {
        println!("{}", self.pretty(show_zeroes));
    }
}

/// Display adapter returned by [`Accumulator::pretty`].
pub struct Pretty<'a> {
    accumulator: &'a Accumulator,
    show_zeroes: bool,
}

impl std::fmt::Display for Pretty<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quantization = self.accumulator.quantization;

        // NOTE: Copy out, so writers are not blocked while formatting
        let mut stored = self
            .accumulator
            .read()
            .iter()
            .map(|(&key, &value)| (key, value))
            .collect::<Vec<_>>();
        stored.sort_unstable_by_key(|&(key, _)| key);

        writeln!(f, "[")?;

        if !self.show_zeroes {
            for (key, value) in stored.into_iter().filter(|&(_, value)| value != 0) {
                writeln!(f, "    {key}: {value}")?;
            }
            return write!(f, "]");
        }

        if let (Some(&(first, _)), Some(&(last, _))) = (stored.first(), stored.last()) {
            // NOTE: Inclusive of the last bucket
            let steps = (i128::from(last) - i128::from(first)) / i128::from(quantization) + 1;

            let span = Span {
                start: first,
                end: last,
                len: u64::try_from(steps).unwrap_or(u64::MAX),
            };

            let mut stored = stored.into_iter().peekable();

            for key in span.keys(quantization) {
                let value = stored
                    .next_if(|&(stored_key, _)| stored_key == key)
                    .map_or(0, |(_, value)| value);

                writeln!(f, "    {key}: {value}")?;
            }
        }

        write!(f, "]")
    }
}
