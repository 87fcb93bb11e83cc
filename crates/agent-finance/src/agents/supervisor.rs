//! Finance supervisor assembly

use agent_core::Result;
use agent_runtime::{AgentRuntime, RoutingPolicy, Supervisor};
use std::sync::Arc;
use tracing::info;

use super::{fundamental, market_industry};
use crate::router::KeywordRouter;

pub const SUPERVISOR_NAME: &str = "supervisor";

pub const SUPERVISOR_INSTRUCTIONS: &str = r#"You are a supervisor managing two agents:
- a fundamental agent. Assign tasks about financial statements, balance sheets, financial ratios and charts of them to this agent
- a market_industry agent. Assign research-related tasks to this agent: recent financial news, factual information about companies or industries, and PDF reports

Assign work to one agent at a time, do not call agents in parallel.
Do not do any work yourself.
When the agents have answered the request, reply to the user with their results.
"#;

/// How the supervisor picks a worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RoutingMode {
    /// Ask the model, offering one hand-off tool per worker
    #[default]
    Llm,
    /// Classify the query by keywords, without a model call
    Keyword,
}

/// Build the two finance workers and a supervisor over them
///
/// # Errors
///
/// Fails if a worker's tools are missing from the runtime's registry.
pub fn build_supervisor(runtime: &AgentRuntime, mode: RoutingMode) -> Result<Supervisor> {
    let fundamental = runtime.create_worker(fundamental::definition())?;
    let market_industry = runtime.create_worker(market_industry::definition())?;

    let policy: Arc<dyn RoutingPolicy> = match mode {
        RoutingMode::Llm => Arc::new(runtime.llm_router(SUPERVISOR_INSTRUCTIONS)),
        RoutingMode::Keyword => Arc::new(KeywordRouter::new()),
    };

    info!(routing = policy.name(), "Building supervisor");

    Supervisor::builder(SUPERVISOR_NAME)
        .add_worker(Arc::new(fundamental))
        .add_worker(Arc::new(market_industry))
        .policy(policy)
        .max_routing_steps(runtime.config().max_routing_steps)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FinanceConfig;
    use crate::tools::register_finance_tools;
    use agent_llm::{CompletionRequest, CompletionResponse, LLMProvider};
    use agent_tools::ToolRegistry;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl LLMProvider for Unused {
        async fn complete(&self, _request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            Err(agent_llm::LLMError::RequestFailed("not used".to_string()))
        }

        fn name(&self) -> &str {
            "unused"
        }
    }

    fn runtime(register: bool) -> AgentRuntime {
        let registry = Arc::new(ToolRegistry::new());
        if register {
            register_finance_tools(&registry, Arc::new(FinanceConfig::default())).unwrap();
        }
        AgentRuntime::builder()
            .provider(Arc::new(Unused))
            .tool_registry(registry)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_supervisor_with_both_modes() {
        let runtime = runtime(true);
        for mode in [RoutingMode::Llm, RoutingMode::Keyword] {
            let supervisor = build_supervisor(&runtime, mode).unwrap();
            assert_eq!(
                supervisor.agent_names(),
                vec![fundamental::NAME, market_industry::NAME]
            );
        }
    }

    #[test]
    fn test_missing_tools_fail() {
        assert!(build_supervisor(&runtime(false), RoutingMode::Keyword).is_err());
    }
}
