//! Keyword router for directing queries to the finance workers
//!
//! A deterministic alternative to model-driven routing: the opening user
//! message of a turn is classified by vocabulary, the matching worker is
//! delegated to once, and its output is relayed as the answer.

use agent_core::Result;
use agent_runtime::{RoutingDecision, RoutingPolicy, RoutingRequest};
use async_trait::async_trait;
use tracing::debug;

use crate::agents::{fundamental, market_industry};

/// Answer used when a worker finished without any text
pub const EMPTY_ANSWER: &str = "The agent did not return an answer.";

/// Intent detected from a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryIntent {
    /// Balance sheets, ratios and charts of them
    FinancialStatement,
    /// News, factual lookups and written reports
    MarketResearch,
    /// Nothing matched
    General,
}

impl QueryIntent {
    /// Worker that handles this intent
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::FinancialStatement => fundamental::NAME,
            Self::MarketResearch | Self::General => market_industry::NAME,
        }
    }
}

mod keywords_en {
    pub const FINANCIAL_STATEMENT: &[&str] = &[
        "financial statement",
        "balance sheet",
        "current ratio",
        "quick ratio",
        "debt to equity",
        "debt-to-equity",
        "ratio",
        "liabilities",
        "assets",
        "inventory",
        "equity",
        "total debt",
        "plot",
        "chart",
        "graph",
    ];

    pub const MARKET_RESEARCH: &[&str] = &[
        "news",
        "headline",
        "wikipedia",
        "research",
        "industry",
        "market",
        "who is",
        "what is",
        "history of",
        "pdf",
        "report",
        "article",
    ];
}

mod keywords_zh {
    pub const FINANCIAL_STATEMENT: &[&str] = &[
        "财务报表",
        "资产负债表",
        "流动比率",
        "速动比率",
        "负债",
        "资产",
        "存货",
        "股东权益",
        "图表",
    ];

    pub const MARKET_RESEARCH: &[&str] = &["新闻", "头条", "维基", "研究", "行业", "市场", "报告"];
}

/// Routes by keyword classification, without calling a model
#[derive(Debug, Clone, Default)]
pub struct KeywordRouter;

impl KeywordRouter {
    pub fn new() -> Self {
        Self
    }

    /// Classify the intent of a query
    ///
    /// The intent with more matching keywords wins; ties go to the
    /// financial-statement worker when it matched at all.
    pub fn classify(&self, query: &str) -> QueryIntent {
        let query = query.to_lowercase();
        let financial = Self::count_matches(&query, keywords_en::FINANCIAL_STATEMENT)
            + Self::count_matches(&query, keywords_zh::FINANCIAL_STATEMENT);
        let research = Self::count_matches(&query, keywords_en::MARKET_RESEARCH)
            + Self::count_matches(&query, keywords_zh::MARKET_RESEARCH);

        debug!(financial, research, "Keyword scores");

        if financial > 0 && financial >= research {
            QueryIntent::FinancialStatement
        } else if research > 0 {
            QueryIntent::MarketResearch
        } else {
            QueryIntent::General
        }
    }

    fn count_matches(query: &str, keywords: &[&str]) -> usize {
        keywords.iter().filter(|kw| query.contains(*kw)).count()
    }
}

#[async_trait]
impl RoutingPolicy for KeywordRouter {
    async fn decide(&self, request: RoutingRequest<'_>) -> Result<RoutingDecision> {
        if !request.delegations.is_empty() {
            let answer = request.last_agent_output().unwrap_or(EMPTY_ANSWER);
            return Ok(RoutingDecision::respond(answer));
        }

        let intent = self.classify(request.user_input().unwrap_or_default());
        let target = intent.agent_name();

        // Fall back to the first worker when the target is not part of this supervisor
        let agent = if request.agents.iter().any(|a| a.name == target) {
            target
        } else {
            match request.agents.first() {
                Some(card) => card.name.as_str(),
                None => return Ok(RoutingDecision::respond(EMPTY_ANSWER)),
            }
        };

        debug!(?intent, agent, "Keyword routing");
        Ok(RoutingDecision::delegate(agent))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::Message;
    use agent_runtime::AgentCard;

    fn cards() -> Vec<AgentCard> {
        [fundamental::NAME, market_industry::NAME]
            .into_iter()
            .map(|name| AgentCard {
                name: name.to_string(),
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_classify_financial_statement() {
        let router = KeywordRouter::new();
        assert_eq!(
            router.classify("Get the balance sheet of AAPL and plot the current ratio"),
            QueryIntent::FinancialStatement
        );
        assert_eq!(router.classify("苹果的资产负债表"), QueryIntent::FinancialStatement);
    }

    #[test]
    fn test_classify_market_research() {
        let router = KeywordRouter::new();
        assert_eq!(
            router.classify("What are the latest business news headlines?"),
            QueryIntent::MarketResearch
        );
        assert_eq!(router.classify("最新的市场新闻"), QueryIntent::MarketResearch);
    }

    #[test]
    fn test_classify_general() {
        let router = KeywordRouter::new();
        assert_eq!(router.classify("hello there"), QueryIntent::General);
        assert_eq!(QueryIntent::General.agent_name(), market_industry::NAME);
    }

    #[tokio::test]
    async fn test_delegates_then_relays() {
        let router = KeywordRouter::new();
        let agents = cards();
        let mut history = vec![Message::user("Show me the balance sheet of NFLX")];

        let first = router
            .decide(RoutingRequest {
                history: &history,
                turn_start: 0,
                agents: &agents,
                delegations: &[],
                supervisor: "supervisor",
            })
            .await
            .unwrap();
        assert_eq!(first.handoffs.len(), 1);
        assert_eq!(first.handoffs[0].agent, fundamental::NAME);

        history.push(Message::assistant("NFLX current ratio is 1.2").with_name(fundamental::NAME));
        let delegations = vec![fundamental::NAME.to_string()];
        let second = router
            .decide(RoutingRequest {
                history: &history,
                turn_start: 0,
                agents: &agents,
                delegations: &delegations,
                supervisor: "supervisor",
            })
            .await
            .unwrap();
        assert!(second.is_final());
        assert_eq!(second.message.text(), Some("NFLX current ratio is 1.2"));
    }

    #[tokio::test]
    async fn test_falls_back_to_first_agent() {
        let router = KeywordRouter::new();
        let agents = vec![AgentCard {
            name: "solo".to_string(),
            description: String::new(),
        }];
        let history = vec![Message::user("any news?")];

        let decision = router
            .decide(RoutingRequest {
                history: &history,
                turn_start: 0,
                agents: &agents,
                delegations: &[],
                supervisor: "supervisor",
            })
            .await
            .unwrap();
        assert_eq!(decision.handoffs[0].agent, "solo");
    }
}
