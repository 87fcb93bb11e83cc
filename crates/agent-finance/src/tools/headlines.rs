//! Tool for fetching the latest news headlines

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Number, Value, json};
use tracing::{info, warn};

use super::FETCH_LATEST_HEADLINES;
use crate::api::{HeadlineQuery, NewsClient};
use crate::config::FinanceConfig;
use crate::error::Result;

/// NewsAPI caps page size at 100
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_COUNTRY: &str = "sg";

/// Tool returning top headlines as a list of articles
///
/// Every failure, including a missing API key, yields an empty list.
pub struct HeadlinesTool {
    client: NewsClient,
}

/// Every argument is optional; `null` means the default
#[derive(Debug, Deserialize)]
struct HeadlinesParams {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    page_size: Option<Number>,
}

impl HeadlinesParams {
    fn into_query(self) -> HeadlineQuery {
        let country = self
            .country
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        HeadlineQuery {
            category: self.category.filter(|c| !c.trim().is_empty()),
            country,
            page_size: page_size(self.page_size.as_ref()),
        }
    }
}

/// Integral or float page size, rounded and clamped to 1..=100
fn page_size(requested: Option<&Number>) -> u32 {
    requested
        .and_then(Number::as_f64)
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(1.0, MAX_PAGE_SIZE as f64) as u32)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

impl HeadlinesTool {
    pub fn new(config: &FinanceConfig) -> Result<Self> {
        Ok(Self::with_client(NewsClient::from_config(config)?))
    }

    pub fn with_client(client: NewsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for HeadlinesTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let query = parse_params::<HeadlinesParams>(params)?.into_query();

        match self.client.top_headlines(&query).await {
            Ok(articles) => {
                info!(
                    country = %query.country,
                    category = ?query.category,
                    count = articles.len(),
                    "Fetched headlines"
                );
                Ok(json!(articles))
            }
            Err(e) => {
                warn!(error = %e, "Error fetching news");
                Ok(json!([]))
            }
        }
    }

    fn name(&self) -> &str {
        FETCH_LATEST_HEADLINES
    }

    fn description(&self) -> &str {
        "Use this to fetch the latest news headlines. Returns a list of articles \
         with title, description, source, url and published_at."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "category": schema::string_enum(
                    "News category",
                    &["business", "entertainment", "general", "health", "science", "sports", "technology"],
                ),
                "country": schema::string("2-letter ISO 3166-1 country code (default: sg)"),
                "page_size": schema::integer("Number of headlines to return (default: 10)"),
            }),
            &[],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(params: Value) -> HeadlineQuery {
        parse_params::<HeadlinesParams>(params).unwrap().into_query()
    }

    #[test]
    fn test_null_arguments_use_defaults() {
        let q = query(json!({"category": null, "country": null, "page_size": null}));
        assert_eq!(q.category, None);
        assert_eq!(q.country, "sg");
        assert_eq!(q.page_size, 10);

        let q = query(json!({}));
        assert_eq!(q.country, "sg");
        assert_eq!(q.page_size, 10);
    }

    #[test]
    fn test_page_size_accepts_floats_and_clamps() {
        assert_eq!(query(json!({"page_size": 5.0})).page_size, 5);
        assert_eq!(query(json!({"page_size": 7})).page_size, 7);
        assert_eq!(query(json!({"page_size": 0})).page_size, 1);
        assert_eq!(query(json!({"page_size": -4})).page_size, 1);
        assert_eq!(query(json!({"page_size": 500})).page_size, 100);
    }

    #[test]
    fn test_country_is_normalized() {
        assert_eq!(query(json!({"country": " US "})).country, "us");
        assert_eq!(query(json!({"country": "  "})).country, "sg");
    }
}
