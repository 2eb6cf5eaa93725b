//! Client-side record of whether, and as whom, the user is signed in.

use serde::Serialize;

use crate::{AuthToken, RoleClaim, User};

/// Coarse session state, as every consumer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// `token` is the credential being validated, if validation has started.
    Loading { token: Option<AuthToken> },
    Unauthenticated,
    Authenticated { token: AuthToken, user: User },
}

/// Session state container.
///
/// # Invariants
/// - a user is present iff the status is `Authenticated`;
/// - a token is present iff the status is `Authenticated` or a validation is
///   in flight.
///
/// Both hold by construction: the fields live inside the state variants and
/// the transition methods below are the only mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: State,
}

impl Session {
    /// A fresh session: loading, nothing validated yet.
    pub fn new() -> Self {
        Self {
            state: State::Loading { token: None },
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            state: State::Unauthenticated,
        }
    }

    pub fn authenticated(token: AuthToken, user: User) -> Self {
        Self {
            state: State::Authenticated { token, user },
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            State::Loading { .. } => SessionStatus::Loading,
            State::Unauthenticated => SessionStatus::Unauthenticated,
            State::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, State::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&AuthToken> {
        match &self.state {
            State::Loading { token } => token.as_ref(),
            State::Unauthenticated => None,
            State::Authenticated { token, .. } => Some(token),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            State::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<&RoleClaim> {
        self.user().map(|u| &u.role)
    }

    /// Enter `Loading` while `token` is checked against the API.
    pub fn begin_validation(&mut self, token: AuthToken) {
        self.state = State::Loading { token: Some(token) };
    }

    pub fn authenticate(&mut self, token: AuthToken, user: User) {
        self.state = State::Authenticated { token, user };
    }

    /// Drop every field and become `Unauthenticated`. Idempotent.
    pub fn clear(&mut self) {
        self.state = State::Unauthenticated;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use graphura_core::UserId;

    fn user() -> User {
        User::new(UserId::new("u-7").unwrap(), "Meera", "meera@graphura.in", Role::Manager)
    }

    fn token() -> AuthToken {
        AuthToken::new("tok-123").unwrap()
    }

    #[test]
    fn new_session_is_loading_without_token() {
        let session = Session::new();
        assert_eq!(session.status(), SessionStatus::Loading);
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn validation_in_flight_carries_token_but_no_user() {
        let mut session = Session::new();
        session.begin_validation(token());
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.token(), Some(&token()));
        assert!(session.user().is_none());
    }

    #[test]
    fn authenticate_then_clear() {
        let mut session = Session::new();
        session.authenticate(token(), user());
        assert!(session.is_authenticated());
        assert_eq!(session.role(), Some(&RoleClaim::Known(Role::Manager)));

        session.clear();
        assert_eq!(session, Session::unauthenticated());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut once = Session::authenticated(token(), user());
        once.clear();
        let mut twice = once.clone();
        twice.clear();
        assert_eq!(once, twice);
    }
}
