//! Shared domain types for the despedida farewell-message board.
//!
//! This crate contains the core domain types used across the service:
//! Session, Message, their request shapes, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod error;
pub mod message;
pub mod session;
