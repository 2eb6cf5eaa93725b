//! Session Store: the single owner of the session and its persisted token.
//!
//! Every consumer reads the session through this store, and all transitions
//! (initialize, login, logout) go through it. The persisted token and the
//! in-memory session are updated together.

use graphura_auth::{AuthToken, Session, SessionStatus, User};
use thiserror::Error;

use crate::api::IdentityProvider;
use crate::error::ApiError;
use crate::token_store::{StoreError, TokenStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already initialized")]
    AlreadyInitialized,

    #[error("no token validation in progress")]
    NotValidating,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Outcome of [`SessionStore::begin_initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStep {
    /// Nothing to validate; the session settled immediately.
    Resolved(SessionStatus),
    /// The caller must resolve this token with a whoami call and pass the
    /// result to [`SessionStore::complete_initialize`].
    Validate(AuthToken),
}

#[derive(Debug)]
pub struct SessionStore<S: TokenStore> {
    session: Session,
    tokens: S,
    initialized: bool,
}

impl<S: TokenStore> SessionStore<S> {
    /// A store in `Loading`, before any initialization.
    pub fn new(tokens: S) -> Self {
        Self {
            session: Session::new(),
            tokens,
            initialized: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    /// First half of initialization: read the persisted token.
    ///
    /// An unreadable store counts as "no token"; a corrupt token is also
    /// removed. Runs at most once per store.
    pub fn begin_initialize(&mut self) -> Result<InitStep, SessionError> {
        if self.initialized {
            return Err(SessionError::AlreadyInitialized);
        }
        self.initialized = true;

        let persisted = match self.tokens.load() {
            Ok(token) => token,
            Err(err @ StoreError::Corrupt(_)) => {
                tracing::warn!(error = %err, "discarding corrupt persisted token");
                if let Err(store_err) = self.tokens.clear() {
                    tracing::warn!(error = %store_err, "could not remove corrupt token");
                }
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted token");
                None
            }
        };

        match persisted {
            Some(token) => {
                tracing::debug!("validating persisted token");
                self.session.begin_validation(token.clone());
                Ok(InitStep::Validate(token))
            }
            None => {
                self.session.clear();
                tracing::info!("no persisted token; signed out");
                Ok(InitStep::Resolved(SessionStatus::Unauthenticated))
            }
        }
    }

    /// Second half of initialization: apply the whoami result.
    ///
    /// Any failure, not just a 401, discards the persisted token.
    pub fn complete_initialize(&mut self, outcome: Result<User, ApiError>) -> Result<SessionStatus, SessionError> {
        let token = match (self.session.status(), self.session.token()) {
            (SessionStatus::Loading, Some(token)) => token.clone(),
            _ => return Err(SessionError::NotValidating),
        };

        match outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                self.session.authenticate(token, user);
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "persisted token rejected");
                if let Err(store_err) = self.tokens.clear() {
                    tracing::warn!(error = %store_err, "could not remove rejected token");
                }
                self.session.clear();
            }
        }

        Ok(self.session.status())
    }

    /// Restore the session from the persisted token, calling whoami at most
    /// once.
    pub async fn initialize<P>(&mut self, identity: &P) -> Result<SessionStatus, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        match self.begin_initialize()? {
            InitStep::Resolved(status) => Ok(status),
            InitStep::Validate(token) => {
                let outcome = identity.whoami(&token).await;
                self.complete_initialize(outcome)
            }
        }
    }

    /// Persist `token` and authenticate as `user`.
    ///
    /// If persisting fails the session is left untouched.
    pub fn login(&mut self, user: User, token: AuthToken) -> Result<(), SessionError> {
        self.tokens.save(&token)?;
        tracing::info!(user_id = %user.id, role = %user.role, "logged in");
        self.session.authenticate(token, user);
        self.initialized = true;
        Ok(())
    }

    /// Remove the persisted token and clear the session. Idempotent.
    ///
    /// A storage failure is logged; the in-memory session is cleared anyway.
    pub fn logout(&mut self) {
        if let Err(err) = self.tokens.clear() {
            tracing::warn!(error = %err, "could not remove persisted token");
        }
        if self.session.is_authenticated() {
            tracing::info!("logged out");
        }
        self.session.clear();
        self.initialized = true;
    }
}
