//! Concrete agent implementations
//!
//! - WorkerAgent: an executor bound to a fixed tool subset and instructions
//! - Supervisor: routes each user turn to one worker at a time

pub mod supervisor;
pub mod worker;

pub use supervisor::{Supervisor, SupervisorBuilder, TurnOutcome};
pub use worker::{AgentDefinition, WorkerAgent};
