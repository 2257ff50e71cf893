//! Error types for the entity cache.

use std::fmt;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the entity cache and its read-through manager.
///
/// Absence is never an error: lookups and removals on unknown ids or keys return
/// `None` or do nothing. Errors are reserved for contract violations and for
/// failures of the collaborators around the cache.
#[derive(Debug, Clone)]
pub enum Error {
    /// An entity without a primary id was handed to `put`.
    ///
    /// Only entities carrying the server-assigned id can be stored. This is a
    /// caller bug in the write-through path and is surfaced immediately.
    NonIdentifiableEntity(String),

    /// Serialization failed when writing a snapshot.
    SerializationError(String),

    /// Deserialization failed when reading a snapshot.
    ///
    /// The payload is truncated or was produced for another entity layout.
    DeserializationError(String),

    /// Snapshot bytes are not a bridge-cache snapshot, or belong to another store.
    ///
    /// Returned when:
    /// - The magic header is not `b"BRDG"`
    /// - The snapshot was exported from a store of a different entity kind
    InvalidSnapshot(String),

    /// Snapshot schema version differs from the one compiled in.
    ///
    /// **Recovery:** discard the snapshot, the cache refills on demand.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from the snapshot)
        found: u32,
    },

    /// The entity source (HTTP + XML layer) failed to produce an entity.
    ///
    /// Common causes:
    /// - Connection refused or reset
    /// - Server returned an error response
    /// - Response XML could not be mapped to an entity
    ///
    /// **Recovery:** retried by the manager when `OperationConfig::retry_count > 0`.
    SourceError(String),

    /// A fetch from the entity source exceeded the configured timeout.
    Timeout(String),

    /// Invalid configuration.
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// Whether retrying the same operation could succeed.
    ///
    /// Only failures of the remote side qualify; contract violations never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::SourceError(_) | Error::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NonIdentifiableEntity(msg) => write!(f, "Non-identifiable entity: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Snapshot version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::SourceError(msg) => write!(f, "Source error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NonIdentifiableEntity("member has no id".to_string());
        assert_eq!(err.to_string(), "Non-identifiable entity: member has no id");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::SourceError("reset".to_string()).is_retryable());
        assert!(Error::Timeout("slow".to_string()).is_retryable());
        assert!(!Error::NonIdentifiableEntity("x".to_string()).is_retryable());
        assert!(!Error::VersionMismatch {
            expected: 1,
            found: 2
        }
        .is_retryable());
    }

    #[test]
    fn test_error_from_json() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
