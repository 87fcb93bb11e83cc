//! Message types for LLM communication
//!
//! Messages form the append-only conversation history shared by the
//! supervisor and its worker agents. Besides role and content, every message
//! may carry the `name` of the agent that authored it, so that one history can
//! interleave output from several agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Handled separately by most providers
    System,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// Tool call requested by the assistant
    ToolUse {
        /// Call identifier, echoed back by the matching result
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool output sent back to the model
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Author of the message (e.g. `supervisor`, `fundamental`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Borrowed view of a tool call inside an assistant message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolCall<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a serde_json::Value,
}

impl Message {
    fn text_with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(text.into())),
            name: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text_with_role(Role::System, text)
    }

    /// Assistant message made of arbitrary blocks
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
            name: None,
        }
    }

    /// Assistant message with optional text and a single tool call
    pub fn tool_call(
        text: Option<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        let mut blocks = Vec::with_capacity(2);
        if let Some(text) = text {
            blocks.push(ContentBlock::Text { text });
        }
        blocks.push(ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        });
        Self::assistant_blocks(blocks)
    }

    /// Successful tool result, sent with the user role
    pub fn tool_result(tool_use_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self::result_block(tool_use_id.into(), result.into(), None)
    }

    /// Failed tool result, sent with the user role
    pub fn tool_error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self::result_block(tool_use_id.into(), error.into(), Some(true))
    }

    fn result_block(tool_use_id: String, content: String, is_error: Option<bool>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            }])),
            name: None,
        }
    }

    /// Tag the message with its author
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// First text content of the message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    /// Tool use blocks of an assistant message
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.blocks()
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
            .collect()
    }

    /// Tool calls of an assistant message, in request order
    pub fn tool_calls(&self) -> Vec<ToolCall<'_>> {
        self.blocks()
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall { id, name, input }),
                _ => None,
            })
            .collect()
    }

    pub fn has_tool_uses(&self) -> bool {
        self.blocks()
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Whether this message only carries tool results
    pub fn is_tool_result(&self) -> bool {
        let blocks = self.blocks();
        !blocks.is_empty()
            && blocks
                .iter()
                .all(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }

    fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }
}

impl fmt::Display for Message {
    /// One-line rendering used by console event printers
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let author = self.name.as_deref().unwrap_or(match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        });
        write!(f, "[{author}]")?;

        match &self.content {
            Some(MessageContent::Text(text)) => write!(f, " {text}"),
            Some(MessageContent::Blocks(blocks)) => {
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } if !text.is_empty() => write!(f, " {text}")?,
                        ContentBlock::Text { .. } => {}
                        ContentBlock::ToolUse { name, input, .. } => {
                            write!(f, " -> {name}({input})")?;
                        }
                        ContentBlock::ToolResult {
                            content, is_error, ..
                        } => {
                            let tag = if is_error.unwrap_or(false) { "error" } else { "result" };
                            write!(f, " <- {tag}: {content}")?;
                        }
                    }
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
        assert!(msg.name.is_none());
    }

    #[test]
    fn test_named_assistant_message() {
        let msg = Message::assistant("Current ratio is 1.2").with_name("fundamental");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.name.as_deref(), Some("fundamental"));
    }

    #[test]
    fn test_tool_call_constructor() {
        let msg = Message::tool_call(None, "call_1", "transfer_to_fundamental", json!({}));
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "transfer_to_fundamental");
        assert!(msg.text().is_none());
        assert!(msg.has_tool_uses());
    }

    #[test]
    fn test_tool_result_is_not_tool_use() {
        let msg = Message::tool_result("call_1", "done");
        assert_eq!(msg.role, Role::User);
        assert!(!msg.has_tool_uses());
        assert!(msg.is_tool_result());
        assert!(!Message::user("plain").is_tool_result());
    }

    #[test]
    fn test_name_survives_serialization() {
        let msg = Message::assistant("hi").with_name("market_industry");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);

        // Unnamed messages omit the field entirely
        let json = serde_json::to_value(Message::user("x")).unwrap();
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_display() {
        let msg = Message::tool_call(
            Some("Looking it up".to_string()),
            "c1",
            "wikipedia_tool",
            json!({"query": "DBS Bank"}),
        )
        .with_name("market_industry");
        assert_eq!(
            msg.to_string(),
            r#"[market_industry] Looking it up -> wikipedia_tool({"query":"DBS Bank"})"#
        );

        let err = Message::tool_error("c1", "boom");
        assert_eq!(err.to_string(), "[user] <- error: boom");
    }
}
