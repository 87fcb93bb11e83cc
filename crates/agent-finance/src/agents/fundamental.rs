//! Fundamental finance-data agent

use agent_runtime::AgentDefinition;

use crate::tools::{GET_FINANCIAL_STATEMENT, PLOT_FINANCIAL_COLUMN};

pub const NAME: &str = "fundamental";

pub const DESCRIPTION: &str =
    "Financial statements of listed companies: balance sheets, liquidity and leverage ratios, and charts of them.";

pub const INSTRUCTIONS: &str = r#"You are an agent that answers general questions related to finance.

INSTRUCTIONS:
- Assist ONLY with tasks that require basic knowledge about finance, such as getting
  the financial statement of a stock, computing ratios from it, or plotting one of
  its columns.
- Call get_financial_statement before plot_financial_column; the chart is drawn
  from the saved table.
- After you're done with your tasks, respond to the supervisor directly.
- Respond ONLY with the results of your work, do NOT include ANY other text.
"#;

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(NAME, DESCRIPTION, INSTRUCTIONS)
        .with_tools([GET_FINANCIAL_STATEMENT, PLOT_FINANCIAL_COLUMN])
}
