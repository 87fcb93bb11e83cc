//! LLM provider abstraction layer
//!
//! Provider-agnostic types for talking to a chat-completions model:
//!
//! - Message types with per-agent authorship
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The `LLMProvider` trait and an OpenAI-compatible implementation

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role, ToolCall};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(feature = "openai")]
pub mod providers;
