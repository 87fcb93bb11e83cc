//! Shared utilities for the finance supervisor workspace
//!
//! Logging setup and process-level configuration, read from the environment
//! (optionally seeded from a `.env` file).

pub mod config;
pub mod logging;

pub use config::{Config, LogFormat, load_dotenv};
pub use logging::init_tracing;
