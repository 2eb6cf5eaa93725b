use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer credential issued by `/api/auth/login`.
///
/// The client never inspects the token; it only stores it and sends it back in
/// the `Authorization` header. `Debug` is redacted so it cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,

    #[error("token contains whitespace")]
    Whitespace,
}

impl AuthToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty);
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(TokenError::Whitespace);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw credential, for the `Authorization` header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl TryFrom<String> for AuthToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}
