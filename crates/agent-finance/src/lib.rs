//! Finance research supervisor
//!
//! A supervisor routes each user query to one of two workers:
//!
//! - `fundamental`: balance sheets from Yahoo Finance, liquidity and leverage
//!   ratios, charts of table columns
//! - `market_industry`: NewsAPI headlines, Wikipedia summaries, PDF reports
//!
//! Every tool reports service failures inside its result, so a failed
//! lookup never ends a conversation.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_finance::{FinanceConfig, RoutingMode, build_supervisor, register_finance_tools};
//! use agent_runtime::{AgentRuntime, NoOpEventHandler};
//! use agent_tools::ToolRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(FinanceConfig::from_env()?);
//!     config.ensure_dirs()?;
//!
//!     let registry = Arc::new(ToolRegistry::new());
//!     register_finance_tools(&registry, config)?;
//!
//!     let runtime = AgentRuntime::builder()
//!         .provider(/* your provider */)
//!         .tool_registry(registry)
//!         .build()?;
//!     let supervisor = build_supervisor(&runtime, RoutingMode::Llm)?;
//!
//!     let context = agent_core::Context::for_thread("1", "1");
//!     let outcome = supervisor
//!         .run_turn("Current ratio of AAPL?", &context, &NoOpEventHandler)
//!         .await?;
//!     println!("{}", outcome.answer);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod chart;
pub mod config;
pub mod document;
pub mod error;
pub mod router;
pub mod table;
pub mod tools;

pub use agents::{RoutingMode, build_supervisor};
pub use config::FinanceConfig;
pub use error::{FinanceError, Result};
pub use router::{KeywordRouter, QueryIntent};
pub use table::FinancialTable;
pub use tools::register_finance_tools;
