use std::time::Duration;
use thiserror::Error;

/// Outcome of every fetch operation: the payload, or a [`FetchError`].
pub type FetchResult<T> = Result<T, FetchError>;

/// Failure taxonomy shared by every source adapter and the task runner.
///
/// Adapters recover every fault locally and exit through this type; no
/// transport or parse error is allowed to cross an adapter or task boundary
/// in any other shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// A required credential is absent or still a placeholder value.
    /// Raised before any network I/O.
    #[error("credential not configured: {0}")]
    NotConfigured(String),

    /// The identifier was rejected before any request was built.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream answered, but the identifier has no matching entity.
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    /// Connection failure, timeout or a non-2xx status.
    #[error("{0}")]
    Transport(String),

    /// Anything else caught at the adapter or task boundary.
    #[error("{0}")]
    Unexpected(String),
}

impl FetchError {
    pub fn not_configured(credential: impl Into<String>) -> Self {
        Self::NotConfigured(credential.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Transport-class error for a unit of work that exceeded its deadline.
    pub fn timeout(limit: Duration) -> Self {
        Self::Transport(format!("timed out after {limit:?}"))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Transport(format!("request timed out: {error}"))
        } else if error.is_decode() {
            Self::Unexpected(format!("malformed upstream payload: {error}"))
        } else {
            Self::Transport(format!("request failed: {error}"))
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Unexpected(format!("failed to parse upstream JSON: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_identifier() {
        let error = FetchError::not_found("coin", "invalidcoin");
        assert_eq!(error.to_string(), "coin not found: invalidcoin");
    }

    #[test]
    fn not_configured_message_names_credential() {
        let error = FetchError::not_configured("OPENWEATHERMAP_API_KEY");
        let message = error.to_string();
        assert!(message.contains("credential not configured"));
        assert!(message.contains("OPENWEATHERMAP_API_KEY"));
    }

    #[test]
    fn timeout_is_a_transport_error() {
        let error = FetchError::timeout(Duration::from_secs(5));
        assert!(matches!(error, FetchError::Transport(_)));
        assert!(error.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn json_errors_map_to_unexpected() {
        let parse_error = serde_json::from_str::<u32>("not json").unwrap_err();
        let error = FetchError::from(parse_error);
        assert!(matches!(error, FetchError::Unexpected(_)));
    }
}
