//! Value objects: equality by value, validated on construction.
//!
//! Forms build these before anything is sent to the API, so a malformed
//! email or a mismatched password confirmation is recovered locally and never
//! reaches session state.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// the same value. They are immutable; to "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A syntactically plausible email address (`local@domain.tld`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(DomainError::validation("Please enter a valid email address."));
        };

        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());

        if local.is_empty() || !domain_ok || trimmed.contains(char::is_whitespace) {
            return Err(DomainError::validation("Please enter a valid email address."));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A new password together with its confirmation.
///
/// Construction fails unless both are identical and non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordPair {
    password: String,
    confirm: String,
}

impl PasswordPair {
    pub fn new(password: impl Into<String>, confirm: impl Into<String>) -> DomainResult<Self> {
        let password = password.into();
        let confirm = confirm.into();

        if password.is_empty() {
            return Err(DomainError::validation("Password must not be empty."));
        }
        if password != confirm {
            return Err(DomainError::validation("Passwords do not match!"));
        }

        Ok(Self { password, confirm })
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm(&self) -> &str {
        &self.confirm
    }
}

// Never print the secret itself.
impl core::fmt::Debug for PasswordPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordPair").finish_non_exhaustive()
    }
}

impl ValueObject for PasswordPair {}
