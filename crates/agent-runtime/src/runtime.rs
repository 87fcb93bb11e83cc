//! Runtime holding the shared provider and tool registry
//!
//! The AgentRuntime owns the resources every agent shares and is the factory
//! for workers, so that tool scoping and model settings are applied in one
//! place.

use agent_core::{Error, Result};
use agent_llm::LLMProvider;
use agent_tools::ToolRegistry;
use std::sync::Arc;
use tracing::info;

use crate::agents::{AgentDefinition, WorkerAgent};
use crate::executor::{AgentExecutor, ExecutorConfig};
use crate::routing::LlmRouter;

/// Model settings shared by the supervisor and its workers
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,

    /// Maximum model calls per worker run
    pub max_iterations: usize,

    /// Maximum routing steps per user turn
    pub max_routing_steps: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: Some(0.0),
            max_iterations: 10,
            max_routing_steps: 10,
        }
    }
}

impl RuntimeConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Shared resources and agent factory
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentDefinition, AgentRuntime};
/// use agent_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .tool_registry(Arc::new(ToolRegistry::new()))
///     .build()?;
///
/// let research = runtime.create_worker(
///     AgentDefinition::new("market_industry", "News and research", "Research only.")
///         .with_tools(["wikipedia_tool"]),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Build a worker whose tool set is exactly `definition.tools`
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if a listed tool is not registered.
    pub fn create_worker(&self, definition: AgentDefinition) -> Result<WorkerAgent> {
        let tools = self
            .tool_registry
            .scope(&definition.name, &definition.tools)?;
        info!(
            agent = %definition.name,
            tools = ?tools.names(),
            "Creating worker agent"
        );

        let config = ExecutorConfig {
            max_iterations: self.config.max_iterations,
            model: self.config.model.clone(),
            system_prompt: Some(definition.instructions.clone()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let executor = AgentExecutor::new(
            definition.name.clone(),
            self.provider.clone(),
            tools,
            config,
        );
        Ok(WorkerAgent::new(definition, executor))
    }

    /// Model-backed routing policy using the runtime's model settings
    pub fn llm_router(&self, instructions: impl Into<String>) -> LlmRouter {
        LlmRouter::new(self.provider.clone(), self.config.model.clone(), instructions)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
    }
}

/// Builder for AgentRuntime
#[derive(Default)]
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is set.
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        Ok(AgentRuntime::new(
            provider,
            self.tool_registry
                .unwrap_or_else(|| Arc::new(ToolRegistry::new())),
            self.config,
        ))
    }
}
