use crate::{Accumulator, Duration, Error};

/// Builder for [`Accumulator`].
pub struct Builder {
    quantization: i64,
    capacity: usize,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            quantization: Duration::seconds(1),
            capacity: 0,
        }
    }

    /// Sets the bucket width in nanoseconds.
    ///
    /// Default = 1 second
    #[must_use]
    pub fn quantization(mut self, nanos: i64) -> Self {
        self.quantization = nanos;
        self
    }

    /// Pre-allocates room for the given amount of buckets.
    ///
    /// Default = 0
    #[must_use]
    pub fn capacity(mut self, buckets: usize) -> Self {
        self.capacity = buckets;
        self
    }

    /// Creates the accumulator.
    ///
    /// # Errors
    ///
    /// Returns error if the quantization is not a positive amount of nanoseconds.
    pub fn build(self) -> crate::Result<Accumulator> {
        if self.quantization <= 0 {
            return Err(Error::InvalidQuantization(self.quantization));
        }

        log::debug!(
            "creating accumulator with {}ns buckets (capacity={})",
            self.quantization,
            self.capacity,
        );

        Ok(Accumulator::from_parts(self.quantization, self.capacity))
    }
}
