//! Core abstractions shared by every crate of the finance supervisor
//!
//! This crate defines the `Agent` trait implemented by the supervisor, the
//! per-turn `Context` that identifies a conversation thread, and the common
//! error type the other crates convert into at their boundaries.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
