//! Execution events
//!
//! Handlers receive every message appended to a conversation as it happens,
//! which is how the CLI prints a turn incrementally.

use agent_llm::Message;
use async_trait::async_trait;
use serde_json::Value;

/// Callbacks fired by the supervisor and the worker executors
///
/// All methods default to no-ops.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// A message was appended to the shared history
    async fn on_message(&self, _message: &Message) {}

    /// Control moved between agents
    async fn on_handoff(&self, _from: &str, _to: &str) {}

    /// A worker is about to run a tool
    async fn on_tool_start(&self, _agent: &str, _id: &str, _name: &str, _input: &Value) {}

    /// A tool finished; `Err` carries the error text sent back to the model
    async fn on_tool_done(
        &self,
        _agent: &str,
        _id: &str,
        _name: &str,
        _result: Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// The turn produced its final answer
    async fn on_complete(&self, _answer: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl EventHandler for NoOpEventHandler {}
