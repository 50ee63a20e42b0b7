//! Route mutation errors.
//!
//! Every variant is a recoverable condition reported to whoever asked for the
//! mutation. None of them are allowed to take down the listener.

use thiserror::Error;

/// Error returned by route table and router mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Empty pattern, or a pattern without a path part.
    #[error("invalid pattern {0:?}")]
    InvalidPattern(String),

    /// No backend was supplied for the pattern.
    #[error("no backend supplied for {0:?}")]
    NilBackend(String),

    /// An explicit entry already exists for the pattern.
    #[error("multiple registrations for {0:?}")]
    DuplicateRegistration(String),

    /// Nothing is registered at the pattern.
    #[error("pattern {0:?} is not handled")]
    UnknownPattern(String),

    /// The destination could not be parsed or is not routable.
    #[error("invalid destination {destination:?}: {reason}")]
    InvalidDestination { destination: String, reason: String },
}

impl RouteError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::InvalidPattern(_) => "invalid_pattern",
            RouteError::NilBackend(_) => "nil_backend",
            RouteError::DuplicateRegistration(_) => "duplicate_registration",
            RouteError::UnknownPattern(_) => "unknown_pattern",
            RouteError::InvalidDestination { .. } => "invalid_destination",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_pattern() {
        let err = RouteError::DuplicateRegistration("/foo/".into());
        assert_eq!(err.to_string(), "multiple registrations for \"/foo/\"");
        assert_eq!(err.kind(), "duplicate_registration");
    }

    #[test]
    fn invalid_destination_carries_reason() {
        let err = RouteError::InvalidDestination {
            destination: "ftp://x".into(),
            reason: "unsupported scheme".into(),
        };
        assert!(err.to_string().contains("unsupported scheme"));
        assert_eq!(err.kind(), "invalid_destination");
    }
}
