//! Crate error type.
//!
//! Every fallible operation in this crate rejects its input at the
//! boundary, before any random draws are made, so a single error kind is
//! enough: the call either fully succeeds or returns
//! [`Error::InvalidArgument`].

use thiserror::Error;

/// Errors returned by simulations and distribution constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A count, probability, or distribution parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Shorthand for `Result<T, u_stochastic::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = Error::invalid("step_count must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "invalid argument: step_count must be positive, got 0"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&Error::invalid("x"));
    }
}
