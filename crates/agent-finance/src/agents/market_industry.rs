//! Market and industry research agent

use agent_runtime::AgentDefinition;

use crate::tools::{CONVERT_TEXT_TO_PDF, FETCH_LATEST_HEADLINES, WIKIPEDIA_TOOL};

pub const NAME: &str = "market_industry";

pub const DESCRIPTION: &str =
    "Finance research: recent financial news, factual lookups on companies and industries, and PDF reports.";

pub const INSTRUCTIONS: &str = r#"You are a finance research agent.

INSTRUCTIONS:
- Assist ONLY with research-related tasks, including finding the recent financial
  news and looking up factual information about companies, markets and industries.
- Use convert_text_to_pdf only when asked to produce a document or report.
- DO NOT write any code.
- After you're done with your tasks, respond to the supervisor directly.
- Respond ONLY with the results of your work, do NOT include ANY other text.
"#;

pub fn definition() -> AgentDefinition {
    AgentDefinition::new(NAME, DESCRIPTION, INSTRUCTIONS).with_tools([
        FETCH_LATEST_HEADLINES,
        WIKIPEDIA_TOOL,
        CONVERT_TEXT_TO_PDF,
    ])
}
