use crate::Timestamp;

/// Error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The start of a range rounds to a later bucket than its end.
    ///
    /// Both bounds are reported as bucket keys (already rounded down).
    InvalidRange {
        /// Bucket key of the range start
        from: Timestamp,

        /// Bucket key of the range end
        to: Timestamp,
    },

    /// A quantization (bucket width or averaging period) that is not
    /// a positive number of nanoseconds.
    InvalidQuantization(i64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { from, to } => {
                write!(f, "InvalidRange: {from} is after {to}")
            }
            Self::InvalidQuantization(q) => {
                write!(f, "InvalidQuantization: {q}ns")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn display_invalid_range() {
        let err = Error::InvalidRange { from: 20, to: 10 };
        assert_eq!("InvalidRange: 20 is after 10", err.to_string());
    }

    #[test_log::test]
    fn display_invalid_quantization() {
        assert_eq!(
            "InvalidQuantization: -5ns",
            Error::InvalidQuantization(-5).to_string(),
        );
    }
}
