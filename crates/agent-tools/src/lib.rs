//! Tool management for the finance supervisor
//!
//! Tools are registered once in a shared [`ToolRegistry`]. Each agent then
//! receives a [`ToolSet`]: an explicit, immutable subset of the registry that
//! is the only place the agent can resolve tools from.

pub mod registry;
pub mod tool;

pub use registry::{ToolRegistry, ToolSet};
pub use tool::{Tool, parse_params};
