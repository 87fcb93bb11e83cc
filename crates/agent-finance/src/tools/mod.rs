//! Finance tools for LLM agents
//!
//! Every tool reports service failures inside its result (a failure string
//! or an empty list) so the calling agent can read them and carry on.

pub mod chart;
pub mod financial_statement;
pub mod headlines;
pub mod pdf;
pub mod wikipedia;

pub use chart::PlotFinancialColumnTool;
pub use financial_statement::FinancialStatementTool;
pub use headlines::HeadlinesTool;
pub use pdf::ConvertTextToPdfTool;
pub use wikipedia::WikipediaTool;

use crate::config::FinanceConfig;
use crate::error::Result;
use agent_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;

pub const WIKIPEDIA_TOOL: &str = "wikipedia_tool";
pub const FETCH_LATEST_HEADLINES: &str = "fetch_latest_headlines";
pub const GET_FINANCIAL_STATEMENT: &str = "get_financial_statement";
pub const PLOT_FINANCIAL_COLUMN: &str = "plot_financial_column";
pub const CONVERT_TEXT_TO_PDF: &str = "convert_text_to_pdf";

/// Prefix of every failure string returned by a tool
pub const FAILURE_PREFIX: &str = "Failed to execute. Error: ";

pub(crate) fn failure(err: impl std::fmt::Display) -> Value {
    Value::String(format!("{FAILURE_PREFIX}{err}"))
}

/// Register all five finance tools
pub fn register_finance_tools(registry: &ToolRegistry, config: Arc<FinanceConfig>) -> Result<()> {
    registry.register(Arc::new(WikipediaTool::new(&config)?));
    registry.register(Arc::new(HeadlinesTool::new(&config)?));
    registry.register(Arc::new(FinancialStatementTool::new(Arc::clone(&config))?));
    registry.register(Arc::new(PlotFinancialColumnTool::new(Arc::clone(&config))));
    registry.register(Arc::new(ConvertTextToPdfTool::new()));

    tracing::debug!(tools = ?registry.names(), "Registered finance tools");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let registry = ToolRegistry::new();
        register_finance_tools(&registry, Arc::new(FinanceConfig::default())).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                CONVERT_TEXT_TO_PDF,
                FETCH_LATEST_HEADLINES,
                GET_FINANCIAL_STATEMENT,
                PLOT_FINANCIAL_COLUMN,
                WIKIPEDIA_TOOL,
            ]
        );
    }
}
