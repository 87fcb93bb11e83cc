//! Routing policies for the supervisor
//!
//! A policy looks at the shared history and either hands control to a worker
//! (by emitting a `transfer_to_<agent>` tool call) or answers the user. The
//! supervisor owns everything else: honoring only the first hand-off,
//! recording hand-off messages, and running the chosen worker.

use agent_core::Result;
use agent_llm::{CompletionRequest, LLMProvider, Message, ToolDefinition, tools::schema};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix of the hand-off tools offered to the supervisor model
pub const HANDOFF_PREFIX: &str = "transfer_to_";

/// Tool call a worker emits when it returns control
pub const HANDBACK_TOOL: &str = "transfer_back_to_supervisor";

/// Name of the hand-off tool for `agent`
pub fn handoff_tool_name(agent: &str) -> String {
    format!("{HANDOFF_PREFIX}{agent}")
}

/// Agent targeted by a hand-off tool name
pub fn handoff_target(tool_name: &str) -> Option<&str> {
    tool_name
        .strip_prefix(HANDOFF_PREFIX)
        .filter(|agent| !agent.is_empty())
}

/// Whether the message only exists to move control between agents
pub fn is_handoff_message(message: &Message) -> bool {
    message.has_tool_uses()
        && message
            .tool_calls()
            .iter()
            .all(|call| call.name == HANDBACK_TOOL || handoff_target(call.name).is_some())
}

/// What the supervisor knows about a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
}

impl AgentCard {
    /// Hand-off tool definition for this agent
    pub fn handoff_tool(&self) -> ToolDefinition {
        ToolDefinition::new(
            handoff_tool_name(&self.name),
            format!("Ask agent '{}' for help. {}", self.name, self.description),
            schema::empty_object(),
        )
    }
}

/// Input to one routing step
#[derive(Debug, Clone, Copy)]
pub struct RoutingRequest<'a> {
    /// Full thread history, including the current turn
    pub history: &'a [Message],
    /// Index in `history` of the user message that opened this turn
    pub turn_start: usize,
    pub agents: &'a [AgentCard],
    /// Agents already delegated to during this turn, in order
    pub delegations: &'a [String],
    pub supervisor: &'a str,
}

impl<'a> RoutingRequest<'a> {
    /// Messages of the current turn
    pub fn turn(&self) -> &'a [Message] {
        &self.history[self.turn_start.min(self.history.len())..]
    }

    /// The user input that opened this turn
    pub fn user_input(&self) -> Option<&'a str> {
        self.turn().first().and_then(Message::text)
    }

    /// Latest substantive output of a worker during this turn
    pub fn last_agent_output(&self) -> Option<&'a str> {
        self.turn()
            .iter()
            .rev()
            .filter(|m| m.role == agent_llm::Role::Assistant)
            .filter(|m| m.name.as_deref().is_some_and(|n| n != self.supervisor))
            .filter(|m| !is_handoff_message(m))
            .find_map(|m| m.text().filter(|t| !t.trim().is_empty()))
    }
}

/// One requested hand-off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub call_id: String,
    pub agent: String,
}

/// Outcome of a routing step
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Supervisor message to append to the history
    pub message: Message,
    /// Hand-offs requested by the message, in order
    pub handoffs: Vec<Handoff>,
}

impl RoutingDecision {
    /// Read the hand-offs out of a supervisor message
    ///
    /// Tool calls that are not hand-off tools are kept in the message and
    /// reported with an empty agent name so the supervisor can reject them.
    pub fn from_message(message: Message) -> Self {
        let handoffs = message
            .tool_calls()
            .iter()
            .map(|call| Handoff {
                call_id: call.id.to_string(),
                agent: handoff_target(call.name).unwrap_or_default().to_string(),
            })
            .collect();
        Self { message, handoffs }
    }

    /// Hand control to `agent`
    pub fn delegate(agent: &str) -> Self {
        let call_id = format!("call_{}", uuid::Uuid::new_v4().simple());
        let message = Message::tool_call(
            None,
            call_id.clone(),
            handoff_tool_name(agent),
            serde_json::json!({}),
        );
        Self {
            message,
            handoffs: vec![Handoff {
                call_id,
                agent: agent.to_string(),
            }],
        }
    }

    /// Answer the user directly
    pub fn respond(answer: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(answer),
            handoffs: Vec::new(),
        }
    }

    pub fn is_final(&self) -> bool {
        self.handoffs.is_empty()
    }
}

/// Decides which worker, if any, handles the next step of a turn
#[async_trait]
pub trait RoutingPolicy: Send + Sync {
    async fn decide(&self, request: RoutingRequest<'_>) -> Result<RoutingDecision>;

    /// Policy name, for logs
    fn name(&self) -> &str;
}

/// Routes by asking the model, offering one hand-off tool per worker
pub struct LlmRouter {
    provider: Arc<dyn LLMProvider>,
    model: String,
    instructions: String,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl LlmRouter {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            instructions: instructions.into(),
            max_tokens: 2048,
            temperature: Some(0.0),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl RoutingPolicy for LlmRouter {
    async fn decide(&self, request: RoutingRequest<'_>) -> Result<RoutingDecision> {
        let tools = request.agents.iter().map(AgentCard::handoff_tool).collect();

        let completion = CompletionRequest::builder(&self.model)
            .system(self.instructions.clone())
            .messages(request.history.to_vec())
            .tools(tools)
            .parallel_tool_calls(false)
            .max_tokens(self.max_tokens)
            .maybe_temperature(self.temperature)
            .build();

        debug!(
            messages = request.history.len(),
            delegations = request.delegations.len(),
            "Asking model for a routing decision"
        );
        let response = self.provider.complete(completion).await?;
        let decision = RoutingDecision::from_message(response.message);
        info!(
            handoffs = decision.handoffs.len(),
            is_final = decision.is_final(),
            "Routing decision received"
        );
        Ok(decision)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
