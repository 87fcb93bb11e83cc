//! Agent runtime for the finance supervisor
//!
//! This crate provides the execution machinery:
//!
//! - [`AgentExecutor`]: the reason/act loop a worker runs against the model
//! - [`WorkerAgent`]: a named executor bound to a capability-scoped tool set
//! - [`Supervisor`]: routes each user turn to one worker at a time and records
//!   hand-offs in the shared history
//! - [`CheckpointStore`]: per-thread conversation memory
//! - [`AgentRuntime`]: owns the provider and tool registry and builds the above

pub mod agents;
pub mod checkpoint;
pub mod events;
pub mod executor;
pub mod routing;
pub mod runtime;

pub use agents::{AgentDefinition, Supervisor, SupervisorBuilder, TurnOutcome, WorkerAgent};
pub use checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointer, ThreadKey};
pub use events::{EventHandler, NoOpEventHandler};
pub use executor::{AgentExecutor, AgentRun, ExecutorConfig};
pub use routing::{AgentCard, Handoff, LlmRouter, RoutingDecision, RoutingPolicy, RoutingRequest};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
