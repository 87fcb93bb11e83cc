//! Supervisor agent (routes each turn to one worker at a time)

use crate::agents::WorkerAgent;
use crate::checkpoint::{CheckpointStore, InMemoryCheckpointer, ThreadKey};
use crate::events::{EventHandler, NoOpEventHandler};
use crate::routing::{AgentCard, HANDBACK_TOOL, RoutingPolicy, RoutingRequest};
use agent_core::{Agent, Context, Error, Result};
use agent_llm::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Answer given when the routing step limit is hit before any worker replied
pub const ROUTING_LIMIT_MESSAGE: &str = "Routing limit reached without a final answer";

const PARALLEL_HANDOFF_REJECTED: &str =
    "Only one agent can be called at a time. This transfer was not performed.";

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    /// Waiting for the routing policy to pick a worker or answer
    AwaitingRouting,
    /// A hand-off was accepted; the worker at this index runs next
    AwaitingAgent(usize),
}

/// Result of one user turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final answer for the user
    pub answer: String,
    /// Messages appended to the thread during this turn, user input first
    pub messages: Vec<Message>,
    /// Workers that ran during the turn, in order
    pub delegations: Vec<String>,
    /// Checkpoint step after the turn was saved
    pub checkpoint_step: u64,
}

/// Coordinates worker agents for a conversation thread
///
/// Each user turn loads the thread from the checkpoint store, then alternates
/// between asking the routing policy and running the single worker it picked,
/// until the policy answers. Hand-offs and hand-backs are written into the
/// history as tool-call/tool-result pairs, so later routing steps (and later
/// turns) can see who did what. The supervisor itself never calls domain
/// tools.
///
/// # Example
///
/// ```no_run
/// use agent_core::Context;
/// use agent_runtime::{LlmRouter, NoOpEventHandler, Supervisor, WorkerAgent};
/// use std::sync::Arc;
///
/// # async fn example(
/// #     fundamental: Arc<WorkerAgent>,
/// #     research: Arc<WorkerAgent>,
/// #     router: Arc<LlmRouter>,
/// # ) -> agent_core::Result<()> {
/// let supervisor = Supervisor::builder("supervisor")
///     .add_worker(fundamental)
///     .add_worker(research)
///     .policy(router)
///     .build()?;
///
/// let ctx = Context::for_thread("1", "1");
/// let outcome = supervisor
///     .run_turn("Show me AAPL's current ratio", &ctx, &NoOpEventHandler)
///     .await?;
/// println!("{}", outcome.answer);
/// # Ok(())
/// # }
/// ```
pub struct Supervisor {
    name: String,
    workers: Vec<Arc<WorkerAgent>>,
    cards: Vec<AgentCard>,
    policy: Arc<dyn RoutingPolicy>,
    store: Arc<dyn CheckpointStore>,
    handler: Arc<dyn EventHandler>,
    max_routing_steps: usize,
    turn_lock: Mutex<()>,
}

impl Supervisor {
    pub fn builder(name: impl Into<String>) -> SupervisorBuilder {
        SupervisorBuilder::new(name)
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn store(&self) -> &Arc<dyn CheckpointStore> {
        &self.store
    }

    /// Stored history of a thread (empty for unknown threads)
    pub fn history(&self, key: &ThreadKey) -> Result<Vec<Message>> {
        Ok(self
            .store
            .load(key)?
            .map(|cp| cp.messages)
            .unwrap_or_default())
    }

    fn worker_index(&self, agent: &str) -> Option<usize> {
        self.workers
            .iter()
            .position(|w| w.definition().name == agent)
    }

    async fn append(&self, history: &mut Vec<Message>, message: Message, handler: &dyn EventHandler) {
        handler.on_message(&message).await;
        history.push(message);
    }

    /// Run one user turn on the thread identified by `context`
    ///
    /// Turns are serialized per supervisor. Errors from the model propagate;
    /// delegations completed before the error stay checkpointed.
    pub async fn run_turn(
        &self,
        input: &str,
        context: &Context,
        handler: &dyn EventHandler,
    ) -> Result<TurnOutcome> {
        let _turn = self.turn_lock.lock().await;
        let key = ThreadKey::from_context(context)?;
        let limit = context.routing_limit().unwrap_or(self.max_routing_steps);

        let mut history = self.history(&key)?;
        let turn_start = history.len();
        let mut delegations: Vec<String> = Vec::new();
        let mut steps = 0;

        info!(thread = %key, prior_messages = turn_start, "Supervisor turn started");
        self.append(&mut history, Message::user(input), handler)
            .await;

        let mut state = TurnState::AwaitingRouting;
        let answer = loop {
            match state {
                TurnState::AwaitingRouting => {
                    if steps >= limit {
                        warn!(thread = %key, limit, "Routing step limit reached");
                        let request = self.routing_request(&history, turn_start, &delegations);
                        let answer = request
                            .last_agent_output()
                            .unwrap_or(ROUTING_LIMIT_MESSAGE)
                            .to_string();
                        let message = Message::assistant(answer.clone()).with_name(self.name.clone());
                        self.append(&mut history, message, handler).await;
                        break answer;
                    }
                    steps += 1;

                    let request = self.routing_request(&history, turn_start, &delegations);
                    let decision = self.policy.decide(request).await?;
                    debug!(
                        policy = self.policy.name(),
                        step = steps,
                        handoffs = decision.handoffs.len(),
                        "Routing step decided"
                    );

                    let message = decision.message.with_name(self.name.clone());
                    let text = message.text().unwrap_or_default().to_string();
                    self.append(&mut history, message, handler).await;

                    if decision.handoffs.is_empty() {
                        break text;
                    }
                    state = self
                        .accept_handoffs(&decision.handoffs, &mut history, handler)
                        .await;
                }
                TurnState::AwaitingAgent(index) => {
                    let worker = Arc::clone(&self.workers[index]);
                    let agent = worker.definition().name.clone();

                    info!(thread = %key, agent = %agent, "Delegating to worker");
                    handler.on_handoff(&self.name, &agent).await;

                    let run = worker.run(&history, handler).await?;
                    history.extend(run.messages);
                    self.hand_back(&agent, &mut history, handler).await;
                    handler.on_handoff(&agent, &self.name).await;

                    delegations.push(agent);
                    self.store.save(&key, &history)?;
                    state = TurnState::AwaitingRouting;
                }
            }
        };

        let checkpoint = self.store.save(&key, &history)?;
        handler.on_complete(&answer).await;
        info!(
            thread = %key,
            delegations = delegations.len(),
            routing_steps = steps,
            "Supervisor turn completed"
        );

        Ok(TurnOutcome {
            answer,
            messages: history[turn_start..].to_vec(),
            delegations,
            checkpoint_step: checkpoint.step,
        })
    }

    fn routing_request<'a>(
        &'a self,
        history: &'a [Message],
        turn_start: usize,
        delegations: &'a [String],
    ) -> RoutingRequest<'a> {
        RoutingRequest {
            history,
            turn_start,
            agents: &self.cards,
            delegations,
            supervisor: &self.name,
        }
    }

    /// Answer every requested hand-off; at most the first valid one is accepted
    async fn accept_handoffs(
        &self,
        handoffs: &[crate::routing::Handoff],
        history: &mut Vec<Message>,
        handler: &dyn EventHandler,
    ) -> TurnState {
        let mut accepted = None;

        for handoff in handoffs {
            let result = if accepted.is_some() {
                warn!(agent = %handoff.agent, "Rejecting parallel hand-off");
                Message::tool_error(&handoff.call_id, PARALLEL_HANDOFF_REJECTED)
            } else if let Some(index) = self.worker_index(&handoff.agent) {
                accepted = Some(index);
                Message::tool_result(
                    &handoff.call_id,
                    format!("Successfully transferred to {}", handoff.agent),
                )
            } else {
                warn!(agent = %handoff.agent, "Hand-off to unknown agent");
                Message::tool_error(
                    &handoff.call_id,
                    Error::AgentNotFound(format!(
                        "'{}'. Available agents: {}",
                        handoff.agent,
                        self.agent_names().join(", ")
                    ))
                    .to_string(),
                )
            };
            self.append(history, result, handler).await;
        }

        accepted.map_or(TurnState::AwaitingRouting, TurnState::AwaitingAgent)
    }

    /// Record the worker returning control
    async fn hand_back(&self, agent: &str, history: &mut Vec<Message>, handler: &dyn EventHandler) {
        let call_id = format!("call_{}", uuid::Uuid::new_v4().simple());
        let message = Message::tool_call(
            Some(format!("Transferring back to {}", self.name)),
            call_id.clone(),
            HANDBACK_TOOL,
            serde_json::json!({}),
        )
        .with_name(agent);
        self.append(history, message, handler).await;

        let result = Message::tool_result(
            call_id,
            format!("Successfully transferred back to {}", self.name),
        );
        self.append(history, result, handler).await;
    }
}

#[async_trait]
impl Agent for Supervisor {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let outcome = self
            .run_turn(&input, context, self.handler.as_ref())
            .await?;
        Ok(outcome.answer)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for Supervisor
pub struct SupervisorBuilder {
    name: String,
    workers: Vec<Arc<WorkerAgent>>,
    policy: Option<Arc<dyn RoutingPolicy>>,
    store: Option<Arc<dyn CheckpointStore>>,
    handler: Arc<dyn EventHandler>,
    max_routing_steps: usize,
}

impl SupervisorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: Vec::new(),
            policy: None,
            store: None,
            handler: Arc::new(NoOpEventHandler),
            max_routing_steps: 10,
        }
    }

    pub fn add_worker(mut self, worker: Arc<WorkerAgent>) -> Self {
        self.workers.push(worker);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn RoutingPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Defaults to an [`InMemoryCheckpointer`]
    pub fn checkpointer(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Handler used by [`Agent::process`]
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn max_routing_steps(mut self, steps: usize) -> Self {
        self.max_routing_steps = steps;
        self
    }

    /// Build the supervisor
    ///
    /// # Errors
    ///
    /// Returns an error if no routing policy is set, no workers were added,
    /// or two workers share a name.
    pub fn build(self) -> Result<Supervisor> {
        let policy = self
            .policy
            .ok_or_else(|| Error::InitializationFailed("Routing policy not set".to_string()))?;

        if self.workers.is_empty() {
            return Err(Error::InitializationFailed("No workers added".to_string()));
        }

        let cards: Vec<AgentCard> = self.workers.iter().map(|w| w.card()).collect();
        for (i, card) in cards.iter().enumerate() {
            if card.name == self.name || cards[..i].iter().any(|c| c.name == card.name) {
                return Err(Error::InitializationFailed(format!(
                    "Duplicate agent name '{}'",
                    card.name
                )));
            }
        }

        Ok(Supervisor {
            name: self.name,
            workers: self.workers,
            cards,
            policy,
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryCheckpointer::new())),
            handler: self.handler,
            max_routing_steps: self.max_routing_steps,
            turn_lock: Mutex::new(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{Checkpoint, MockCheckpointStore};
    use crate::executor::{AgentExecutor, ExecutorConfig};
    use crate::routing::RoutingDecision;
    use agent_llm::{CompletionRequest, CompletionResponse, LLMProvider};
    use agent_tools::ToolSet;

    struct FixedAnswer(&'static str);

    #[async_trait]
    impl LLMProvider for FixedAnswer {
        async fn complete(&self, _request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            Ok(CompletionResponse::text(self.0))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Delegates to `agent` once, then relays the worker output
    struct Once(&'static str);

    #[async_trait]
    impl RoutingPolicy for Once {
        async fn decide(&self, request: RoutingRequest<'_>) -> Result<RoutingDecision> {
            Ok(match request.last_agent_output() {
                None => RoutingDecision::delegate(self.0),
                Some(output) => RoutingDecision::respond(output),
            })
        }

        fn name(&self) -> &str {
            "once"
        }
    }

    fn worker(name: &str, answer: &'static str) -> Arc<WorkerAgent> {
        let executor = AgentExecutor::new(
            name,
            Arc::new(FixedAnswer(answer)),
            ToolSet::empty(name),
            ExecutorConfig::default(),
        );
        Arc::new(WorkerAgent::new(
            crate::AgentDefinition::new(name, "test worker", "answer"),
            executor,
        ))
    }

    fn checkpoint(messages: &[Message], step: u64) -> Checkpoint {
        Checkpoint {
            messages: messages.to_vec(),
            step,
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_saves_after_delegation_and_turn_end() {
        let mut store = MockCheckpointStore::new();
        store.expect_load().times(1).returning(|_| Ok(None));
        let mut step = 0;
        store.expect_save().times(2).returning(move |_, messages| {
            step += 1;
            Ok(checkpoint(messages, step))
        });

        let supervisor = Supervisor::builder("supervisor")
            .add_worker(worker("fundamental", "Current ratio 1.1"))
            .policy(Arc::new(Once("fundamental")))
            .checkpointer(Arc::new(store))
            .build()
            .unwrap();

        let outcome = supervisor
            .run_turn("ratios", &Context::for_thread("1", "1"), &NoOpEventHandler)
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Current ratio 1.1");
        assert_eq!(outcome.delegations, vec!["fundamental"]);
        assert_eq!(outcome.checkpoint_step, 2);
    }

    #[tokio::test]
    async fn test_checkpoint_failure_propagates() {
        let mut store = MockCheckpointStore::new();
        store
            .expect_load()
            .returning(|_| Err(Error::Checkpoint("backend down".to_string())));

        let supervisor = Supervisor::builder("supervisor")
            .add_worker(worker("fundamental", "x"))
            .policy(Arc::new(Once("fundamental")))
            .checkpointer(Arc::new(store))
            .build()
            .unwrap();

        let err = supervisor
            .run_turn("ratios", &Context::for_thread("1", "1"), &NoOpEventHandler)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Checkpoint(_)));
    }

    #[tokio::test]
    async fn test_missing_thread_identity() {
        let supervisor = Supervisor::builder("supervisor")
            .add_worker(worker("fundamental", "x"))
            .policy(Arc::new(Once("fundamental")))
            .build()
            .unwrap();

        let mut ctx = Context::new();
        let err = supervisor.process("hi".to_string(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::MissingThread(_)));
    }

    #[test]
    fn test_builder_validation() {
        let err = Supervisor::builder("supervisor")
            .add_worker(worker("fundamental", "x"))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("Routing policy"));

        let err = Supervisor::builder("supervisor")
            .policy(Arc::new(Once("fundamental")))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("No workers"));

        let err = Supervisor::builder("supervisor")
            .add_worker(worker("fundamental", "x"))
            .add_worker(worker("fundamental", "y"))
            .policy(Arc::new(Once("fundamental")))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("Duplicate"));
    }
}
