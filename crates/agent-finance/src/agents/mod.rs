//! Finance worker definitions and the supervisor that routes between them

pub mod fundamental;
pub mod market_industry;
pub mod supervisor;

pub use supervisor::{RoutingMode, SUPERVISOR_INSTRUCTIONS, SUPERVISOR_NAME, build_supervisor};
