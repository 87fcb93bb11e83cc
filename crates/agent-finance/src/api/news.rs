//! NewsAPI client for top headlines

use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Headline as returned to agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    /// Publisher name
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

/// Filters of a top-headlines request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub category: Option<String>,
    /// 2-letter ISO 3166-1 code
    pub country: String,
    pub page_size: u32,
}

impl Default for HeadlineQuery {
    fn default() -> Self {
        Self {
            category: None,
            country: "sg".to_string(),
            page_size: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlinesResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    source: Option<RawSource>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    /// Articles without a title are dropped
    fn into_article(self) -> Option<Article> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(Article {
            title,
            description: self.description,
            source: self.source.and_then(|s| s.name),
            url: self.url,
            published_at: self.published_at,
        })
    }
}

/// NewsAPI client
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &FinanceConfig) -> Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.news_api_url.clone(),
            config.news_api_key.clone(),
        ))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch top headlines
    ///
    /// Fails without sending a request when no API key is configured.
    pub async fn top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FinanceError::ConfigError("NEWS_API_KEY is not set".to_string()))?;

        let url = format!("{}/top-headlines", self.base_url.trim_end_matches('/'));
        let page_size = query.page_size.to_string();
        let mut params = vec![
            ("country", query.country.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", api_key),
        ];
        if let Some(category) = query.category.as_deref() {
            params.push(("category", category));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FinanceError::ApiError(format!("NewsAPI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinanceError::ApiError(format!(
                "NewsAPI error {status}: {body}"
            )));
        }

        let body = response
            .json::<HeadlinesResponse>()
            .await
            .map_err(|e| FinanceError::ApiError(format!("Failed to parse NewsAPI response: {e}")))?;

        if body.status != "ok" {
            return Err(FinanceError::ApiError(format!(
                "NewsAPI returned status '{}' ({}): {}",
                body.status,
                body.code.unwrap_or_default(),
                body.message.unwrap_or_default()
            )));
        }

        Ok(body
            .articles
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect())
    }
}
