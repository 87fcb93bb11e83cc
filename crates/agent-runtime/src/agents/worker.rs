//! Worker agent implementation (wraps AgentExecutor)

use crate::events::{EventHandler, NoOpEventHandler};
use crate::executor::{AgentExecutor, AgentRun};
use crate::routing::AgentCard;
use agent_core::{Agent, Context, Result};
use agent_llm::Message;
use async_trait::async_trait;

/// Static description of a worker: who it is, what it may call, how it behaves
///
/// Immutable once the worker is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub name: String,
    /// One-line summary shown to the supervisor
    pub description: String,
    /// System prompt of the worker
    pub instructions: String,
    /// Names of the tools the worker is permitted to call
    pub tools: Vec<String>,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn card(&self) -> AgentCard {
        AgentCard {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// A worker agent: a reason/act loop restricted to its own tool set
///
/// Created through [`crate::AgentRuntime::create_worker`], which resolves the
/// definition's tool names against the shared registry.
pub struct WorkerAgent {
    definition: AgentDefinition,
    executor: AgentExecutor,
}

impl WorkerAgent {
    pub fn new(definition: AgentDefinition, executor: AgentExecutor) -> Self {
        Self {
            definition,
            executor,
        }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    pub fn card(&self) -> AgentCard {
        self.definition.card()
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    /// Continue the shared conversation until the worker has an answer
    pub async fn run(&self, history: &[Message], handler: &dyn EventHandler) -> Result<AgentRun> {
        self.executor.run(history, handler).await
    }
}

#[async_trait]
impl Agent for WorkerAgent {
    /// Answer a standalone request, outside of any supervisor
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        let run = self
            .executor
            .run(&[Message::user(input)], &NoOpEventHandler)
            .await?;
        Ok(run.output)
    }

    fn name(&self) -> &str {
        &self.definition.name
    }
}
