//! Business logic and port definitions for despedida.
//!
//! This crate defines the "ports" (repository and authenticator traits) that
//! the infrastructure layer implements, the session/message service that
//! enforces cross-entity invariants, and the pure statistics engine. It
//! depends only on `despedida-types` -- never on `despedida-infra` or any
//! database/IO crate.

pub mod auth;
pub mod repository;
pub mod service;
pub mod stats;
