//! Client-side error taxonomy.

use graphura_core::DomainError;
use serde::Serialize;

/// Broad class of a failure, which decides how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad credentials or an invalid/expired token.
    AuthFailure,
    /// The request never completed.
    NetworkFailure,
    /// The server answered with an error or an unreadable payload.
    ServerFailure,
    /// Local form validation; never sent anywhere.
    ValidationFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Validation(#[from] DomainError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::NetworkFailure,
            ApiError::Unauthorized { .. } => ErrorKind::AuthFailure,
            ApiError::Api { .. } | ApiError::Parse(_) => ErrorKind::ServerFailure,
            ApiError::Validation(_) => ErrorKind::ValidationFailure,
        }
    }

    /// Whether a page should offer a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(ApiError::Network("refused".into()).kind(), ErrorKind::NetworkFailure);
        assert_eq!(
            ApiError::Unauthorized {
                message: "Incorrect email or password".into()
            }
            .kind(),
            ErrorKind::AuthFailure
        );
        assert_eq!(ApiError::Parse("eof".into()).kind(), ErrorKind::ServerFailure);
        assert_eq!(
            ApiError::from(DomainError::validation("Passwords do not match!")).kind(),
            ErrorKind::ValidationFailure
        );
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(ApiError::Network("timeout".into()).is_retryable());
        assert!(
            ApiError::Api {
                status: 503,
                message: "unavailable".into()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Api {
                status: 404,
                message: "not found".into()
            }
            .is_retryable()
        );
        assert!(!ApiError::Unauthorized { message: "expired".into() }.is_retryable());
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = ApiError::from(DomainError::validation("Passwords do not match!"));
        assert_eq!(err.to_string(), "Passwords do not match!");
    }
}
