//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the reason/act loop of a worker:
//! 1. Call the LLM with the shared history and the agent's tool set
//! 2. If tools are requested, run them one at a time and loop back
//! 3. Otherwise return the final response
//!
//! Every message the loop produces is tagged with the agent's name and
//! returned to the caller, who appends it to the shared history.

use crate::events::EventHandler;
use agent_core::Result;
use agent_llm::{CompletionRequest, LLMProvider, Message, StopReason, ToolCall, ToolDefinition};
use agent_tools::ToolSet;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Returned when the loop runs out of iterations
pub const MAX_ITERATIONS_MESSAGE: &str = "Max iterations reached without completion";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of model calls per run
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.0),
        }
    }
}

/// Result of one executor run
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Messages produced by the run, in order, ready to append to the history
    pub messages: Vec<Message>,

    /// Final text response
    pub output: String,

    /// Number of model calls made
    pub iterations: usize,
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    name: String,
    provider: Arc<dyn LLMProvider>,
    tools: ToolSet,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn LLMProvider>,
        tools: ToolSet,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            tools,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the loop on top of `history`
    ///
    /// `history` is not modified; the produced messages are returned in
    /// [`AgentRun::messages`].
    pub async fn run(&self, history: &[Message], handler: &dyn EventHandler) -> Result<AgentRun> {
        let mut conversation = history.to_vec();
        let mut produced = Vec::new();
        let tools = self.tool_definitions();

        for iteration in 1..=self.config.max_iterations {
            info!(
                agent = %self.name,
                iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let mut request = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .maybe_temperature(self.config.temperature)
                .tools(tools.clone());
            if let Some(system) = &self.config.system_prompt {
                request = request.system(system.clone());
            }

            let response = self.provider.complete(request.build()).await?;
            info!(
                agent = %self.name,
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let message = response.message.with_name(self.name.clone());
            self.record(message.clone(), &mut conversation, &mut produced, handler)
                .await;

            if message.has_tool_uses() {
                for call in message.tool_calls() {
                    let result = self.execute_tool(call, handler).await;
                    self.record(result, &mut conversation, &mut produced, handler)
                        .await;
                }
                continue;
            }

            let text = message.text().unwrap_or_default().to_string();
            match response.stop_reason {
                StopReason::MaxTokens => {
                    warn!(agent = %self.name, "Hit max tokens in LLM response");
                }
                StopReason::ToolUse => {
                    warn!(agent = %self.name, "ToolUse stop reason without tool calls");
                }
                StopReason::EndTurn | StopReason::StopSequence => {}
            }
            info!(
                agent = %self.name,
                iteration,
                response_length = text.len(),
                "Agent completed"
            );

            return Ok(AgentRun {
                messages: produced,
                output: text,
                iterations: iteration,
            });
        }

        warn!(
            agent = %self.name,
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        let message = Message::assistant(MAX_ITERATIONS_MESSAGE).with_name(self.name.clone());
        self.record(message, &mut conversation, &mut produced, handler)
            .await;

        Ok(AgentRun {
            messages: produced,
            output: MAX_ITERATIONS_MESSAGE.to_string(),
            iterations: self.config.max_iterations,
        })
    }

    async fn record(
        &self,
        message: Message,
        conversation: &mut Vec<Message>,
        produced: &mut Vec<Message>,
        handler: &dyn EventHandler,
    ) {
        handler.on_message(&message).await;
        conversation.push(message.clone());
        produced.push(message);
    }

    /// Tool definitions of the agent's capability set
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run one tool call and turn the outcome into a tool result message
    ///
    /// Unknown or unpermitted tools and invalid arguments become error results
    /// so the model can correct itself; they never abort the run.
    async fn execute_tool(&self, call: ToolCall<'_>, handler: &dyn EventHandler) -> Message {
        let input_preview: String = call.input.to_string().chars().take(500).collect();
        info!(
            agent = %self.name,
            tool_name = %call.name,
            tool_id = %call.id,
            input_preview = %input_preview,
            "Executing tool"
        );
        handler
            .on_tool_start(&self.name, call.id, call.name, call.input)
            .await;

        let start = Instant::now();
        let outcome = match self.tools.resolve(call.name) {
            Ok(tool) => tool.execute(call.input.clone()).await,
            Err(e) => Err(e),
        };
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(result) => {
                let content = render_tool_output(&result);
                debug!(
                    agent = %self.name,
                    tool_name = %call.name,
                    duration_ms,
                    result_length = content.len(),
                    "Tool execution succeeded"
                );
                handler
                    .on_tool_done(&self.name, call.id, call.name, Ok(&result), duration_ms)
                    .await;
                Message::tool_result(call.id, content)
            }
            Err(e) => {
                let error = format!("Error: {e}");
                warn!(
                    agent = %self.name,
                    tool_name = %call.name,
                    duration_ms,
                    error = %e,
                    "Tool execution failed"
                );
                handler
                    .on_tool_done(&self.name, call.id, call.name, Err(error.as_str()), duration_ms)
                    .await;
                Message::tool_error(call.id, error)
            }
        }
    }
}

/// Strings are passed through verbatim, everything else as compact JSON
fn render_tool_output(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventHandler;
    use agent_llm::{CompletionResponse, LLMError};
    use agent_tools::{Tool, ToolRegistry};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Headlines;

    #[async_trait]
    impl Tool for Headlines {
        async fn execute(&self, _params: Value) -> Result<Value> {
            Ok(json!([{"title": "STI closes higher"}]))
        }

        fn name(&self) -> &str {
            "fetch_latest_headlines"
        }

        fn description(&self) -> &str {
            "headlines"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    fn executor(provider: Arc<Scripted>, max_iterations: usize) -> AgentExecutor {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Headlines));
        let tools = registry
            .scope("market_industry", &["fetch_latest_headlines"])
            .unwrap();
        let config = ExecutorConfig {
            max_iterations,
            system_prompt: Some("research".to_string()),
            ..ExecutorConfig::default()
        };
        AgentExecutor::new("market_industry", provider, tools, config)
    }

    fn call(id: &str, name: &str) -> CompletionResponse {
        CompletionResponse::from_message(Message::tool_call(None, id, name, json!({})))
    }

    #[tokio::test]
    async fn test_tool_loop_then_answer() {
        let provider = Scripted::new(vec![
            call("c1", "fetch_latest_headlines"),
            CompletionResponse::text("STI closed higher today."),
        ]);
        let exec = executor(provider.clone(), 5);

        let run = exec
            .run(&[Message::user("news?")], &NoOpEventHandler)
            .await
            .unwrap();

        assert_eq!(run.output, "STI closed higher today.");
        assert_eq!(run.iterations, 2);
        assert_eq!(run.messages.len(), 3);
        assert!(run.messages[1].is_tool_result());
        assert!(
            run.messages
                .iter()
                .filter(|m| m.role == agent_llm::Role::Assistant)
                .all(|m| m.name.as_deref() == Some("market_industry"))
        );

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].system.as_deref(), Some("research"));
        assert_eq!(requests[0].tool_names(), vec!["fetch_latest_headlines"]);
        // Second call sees the tool result
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_unpermitted_tool_becomes_error_result() {
        let provider = Scripted::new(vec![
            call("c1", "get_financial_statement"),
            CompletionResponse::text("I cannot do that."),
        ]);
        let exec = executor(provider, 5);

        let run = exec
            .run(&[Message::user("balance sheet?")], &NoOpEventHandler)
            .await
            .unwrap();

        let rendered = run.messages[1].to_string();
        assert!(rendered.contains("error"), "{rendered}");
        assert!(rendered.contains("not permitted"), "{rendered}");
        assert_eq!(run.output, "I cannot do that.");
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let provider = Scripted::new(vec![
            call("c1", "fetch_latest_headlines"),
            call("c2", "fetch_latest_headlines"),
        ]);
        let exec = executor(provider, 2);

        let run = exec
            .run(&[Message::user("loop")], &NoOpEventHandler)
            .await
            .unwrap();
        assert_eq!(run.output, MAX_ITERATIONS_MESSAGE);
        assert_eq!(run.iterations, 2);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Scripted::new(vec![]);
        let exec = executor(provider, 2);

        let err = exec
            .run(&[Message::user("hi")], &NoOpEventHandler)
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::Llm(_)));
    }

    #[test]
    fn test_render_tool_output() {
        assert_eq!(render_tool_output(&json!("plain")), "plain");
        assert_eq!(render_tool_output(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
