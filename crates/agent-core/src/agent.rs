//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// An addressable actor that turns one user input into one response.
///
/// The supervisor implements this trait so callers can drive a full turn
/// (routing, delegation, hand-back) through a single `process` call. The
/// context carries the thread identity used to look up conversation memory.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process one user input within the thread described by `context`
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
