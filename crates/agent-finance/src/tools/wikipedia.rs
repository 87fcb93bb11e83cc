//! Wikipedia lookup tool

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::{WIKIPEDIA_TOOL, failure};
use crate::api::WikipediaClient;
use crate::config::FinanceConfig;
use crate::error::Result;

pub const NO_RESULTS: &str = "No results found on Wikipedia.";

/// Tool for looking up factual summaries on Wikipedia
pub struct WikipediaTool {
    client: WikipediaClient,
}

#[derive(Debug, Deserialize)]
struct WikipediaParams {
    query: String,
}

impl WikipediaTool {
    pub fn new(config: &FinanceConfig) -> Result<Self> {
        Ok(Self::with_client(WikipediaClient::from_config(config)?))
    }

    pub fn with_client(client: WikipediaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: WikipediaParams = parse_params(params)?;

        let result = match self.client.lookup(&params.query).await {
            Ok(Some(summary)) => {
                format!("Successfully executed:\nWikipedia summary: {summary}")
            }
            Ok(None) => NO_RESULTS.to_string(),
            Err(e) => {
                warn!(query = %params.query, error = %e, "Wikipedia lookup failed");
                return Ok(failure(e));
            }
        };
        Ok(json!(result))
    }

    fn name(&self) -> &str {
        WIKIPEDIA_TOOL
    }

    fn description(&self) -> &str {
        "Use this to search Wikipedia for factual information. \
         Returns a short summary of the best matching page."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "query": schema::string(
                    "The Wikipedia search to execute to find key summary information"
                ),
            }),
            &["query"],
        )
    }
}
