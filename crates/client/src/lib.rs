//! `graphura-client`
//!
//! **Responsibility:** everything that talks to the outside world on behalf of
//! the session core.
//!
//! This crate provides:
//! - `ApiClient`, a thin REST client for the Graphura API
//! - `TokenStore` implementations for the persisted credential
//! - `SessionStore`, the single owner of the session and its transitions
//!
//! The API remains the authority for every business rule; this crate only
//! fetches and submits.

pub mod api;
pub mod error;
pub mod session_store;
pub mod token_store;
pub mod types;

pub use api::{ApiClient, IdentityProvider};
pub use error::{ApiError, ErrorKind};
pub use session_store::{InitStep, SessionError, SessionStore};
pub use token_store::{AUTH_TOKEN_KEY, MemoryTokenStore, StoreError, TokenStore};

#[cfg(not(target_arch = "wasm32"))]
pub use token_store::FileTokenStore;
