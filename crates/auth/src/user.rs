//! The signed-in user as returned by `/api/users/me` and `/api/auth/login`.

use serde::{Deserialize, Serialize};

use graphura_core::UserId;

use crate::{Role, RoleClaim};

/// Avatar shown when a user has no photo (or only a blank one).
pub const DEFAULT_AVATAR: &str = "/Assets/default-avatar.png";

/// Identity of an authenticated user.
///
/// The role is fixed for the lifetime of a session; a role change on the
/// server only takes effect after the user signs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: RoleClaim,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Optional profile fields the API may or may not include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: impl Into<RoleClaim>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role: role.into(),
            profile: UserProfile::default(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role.role()
    }

    pub fn avatar_url(&self) -> &str {
        match self.profile.photo.as_deref() {
            Some(photo) if !photo.trim().is_empty() => photo,
            _ => DEFAULT_AVATAR,
        }
    }
}
