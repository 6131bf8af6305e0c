//! Transport error handling
//!
//! Two layers of errors: `AttemptError` describes why a single HTTP attempt
//! failed, `ApiError` is what callers see once retries are exhausted and the
//! last failure has been classified.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single request attempt, as reported by an `HttpHandler`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The request never produced a response (connection refused, DNS, reset)
    #[error("Failed to fetch: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body was not valid JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl AttemptError {
    /// Whether this is a 5xx response
    pub fn is_server_error(&self) -> bool {
        matches!(self, AttemptError::Status { status, .. } if (500..=599).contains(status))
    }
}

/// Coarse classification of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Network,
    Server,
    Unknown,
}

/// Errors surfaced by the API layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// The attempt did not finish within the configured timeout
    #[error("Request timed out. Please try again.")]
    Timeout { after: Duration },

    /// Network-level failure after all retries
    #[error("Network error occurred. Please check your internet connection.")]
    Network {
        #[source]
        source: AttemptError,
    },

    /// 5xx response after all retries
    #[error("Server error occurred. Please try again later.")]
    Server {
        #[source]
        source: AttemptError,
    },

    /// Any other failure after all retries
    #[error("An unknown error occurred. Please try again.")]
    Unknown {
        #[source]
        source: AttemptError,
    },

    /// Creating a user failed
    #[error("Failed to create user. Please try again.")]
    Create {
        #[source]
        source: Box<ApiError>,
    },

    /// Updating a user failed
    #[error("Failed to update user. Please try again.")]
    Update {
        id: i64,
        #[source]
        source: Box<ApiError>,
    },

    /// Deleting a user failed
    #[error("Failed to delete user. Please try again.")]
    Delete {
        id: i64,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Classify the last failed attempt once retries are exhausted
    pub fn classify(error: AttemptError) -> Self {
        match error {
            AttemptError::Network(_) => ApiError::Network { source: error },
            _ if error.is_server_error() => ApiError::Server { source: error },
            _ => ApiError::Unknown { source: error },
        }
    }

    /// A response arrived but could not be mapped onto the expected type
    pub fn decode(details: impl std::fmt::Display) -> Self {
        ApiError::Unknown {
            source: AttemptError::Decode(details.to_string()),
        }
    }

    /// Classification of the underlying transport failure
    ///
    /// Mutation wrappers report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Unknown { .. } => ErrorKind::Unknown,
            ApiError::Create { source }
            | ApiError::Update { source, .. }
            | ApiError::Delete { source, .. } => source.kind(),
        }
    }

    /// Check if the user should be offered a retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::Server
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::Timeout => Some("The server is slow to respond. Try again in a moment."),
            ErrorKind::Network => Some("Check your internet connection and the configured API URL."),
            ErrorKind::Server => Some("The API is having trouble. Try again later."),
            ErrorKind::Unknown => None,
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        let err = ApiError::classify(AttemptError::Network("connection refused".into()));
        assert!(matches!(err, ApiError::Network { .. }));
        assert!(err.is_retryable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_server_classification() {
        let err = ApiError::classify(AttemptError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_client_status_is_unknown() {
        let err = ApiError::classify(AttemptError::Status {
            status: 404,
            reason: "Not Found".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_is_unknown() {
        let err = ApiError::classify(AttemptError::Decode("expected value".into()));
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_mutation_wrapper_keeps_kind() {
        let err = ApiError::Delete {
            id: 3,
            source: Box::new(ApiError::Timeout {
                after: Duration::from_secs(10),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Failed to delete user. Please try again.");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::classify(AttemptError::Network("dns".into()));
        assert!(err.to_string().contains("Network error"));

        let attempt = AttemptError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(attempt.to_string(), "HTTP 500: Internal Server Error");
    }
}
