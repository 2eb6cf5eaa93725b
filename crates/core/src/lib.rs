//! `graphura-core`: shared building blocks for the Graphura dashboard client.
//!
//! This crate contains **pure** primitives (no HTTP, no storage): identifiers,
//! the domain error model and the small value objects forms validate against.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{ProjectId, ReviewId, TeamId, UserId};
pub use value_object::{Email, PasswordPair, ValueObject};
