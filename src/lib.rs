//! A concurrent, time-bucketed integer accumulator.
//!
//! Values are added at a point in time (nanoseconds since the Unix epoch) and accumulate
//! in fixed-width buckets. The bucket width ("quantization") is chosen once, when creating the
//! [`Accumulator`]. Only buckets that were written to are stored, so sparse counters stay cheap.
//!
//! Range queries (sum, average, dense and sparse extraction) operate on half-open ranges
//! `[from, to)`, after rounding both bounds down to their bucket. Timestamps before the epoch
//! round towards negative infinity.
//!
//! ```
//! use bucketsum::{Accumulator, Duration};
//!
//! let requests = Accumulator::new(Duration::seconds(1))?;
//!
//! let t = Duration::seconds(100);
//!
//! requests.add(t, 10);
//! requests.add(t + Duration::millis(300), 15);
//! requests.add(t + Duration::seconds(1), 15);
//! requests.add(t + Duration::seconds(4), 45);
//!
//! let from = t - Duration::seconds(1);
//! let to = t + Duration::seconds(7);
//!
//! // Dense, one entry per bucket
//! assert_eq!(
//!     vec![0, 25, 15, 0, 0, 45, 0, 0],
//!     requests.interval_slice(from, to),
//! );
//!
//! // Sparse, only buckets that were written to
//! assert_eq!(3, requests.interval_map(from, to).len());
//!
//! // 85 over 8 seconds
//! assert_eq!(10, requests.avg_per_second(from, to)?);
//!
//! // Inverted ranges are rejected
//! assert!(requests.sum(to, from).is_err());
//!
//! requests.pretty_print(false);
//! #
//! # Ok::<(), bucketsum::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![warn(clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod accumulator;
mod builder;
mod duration;
mod error;
mod time;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use accumulator::{Accumulator, Pretty};
pub use builder::Builder;
pub use duration::Duration;
pub use error::{Error, Result};
pub use time::{from_system_time, round_down, timestamp};

/// Nanoseconds since the Unix epoch, negative before it.
pub type Timestamp = i64;

/// Value stored in a bucket
pub type Value = i64;
