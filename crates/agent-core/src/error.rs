//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent or runtime construction failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// Tool arguments did not match the tool's input schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// No tool with this name is registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The tool exists but is outside the calling agent's capability set
    #[error("Tool '{tool}' is not permitted for agent '{agent}'")]
    ToolNotPermitted { agent: String, tool: String },

    /// A hand-off named an agent the supervisor does not manage
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Conversation thread identity is missing or incomplete
    #[error("Missing thread identity: {0}")]
    MissingThread(&'static str),

    /// Checkpoint store failure
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Language model call failed
    #[error("LLM error: {0}")]
    Llm(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_permitted_message_names_both_sides() {
        let err = Error::ToolNotPermitted {
            agent: "fundamental".to_string(),
            tool: "wikipedia_tool".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tool 'wikipedia_tool' is not permitted for agent 'fundamental'"
        );
    }
}
