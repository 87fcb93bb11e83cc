//! MediaWiki API client for page search and intro summaries

use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

/// Wikipedia client
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: Client,
    api_url: String,
    sentences: usize,
}

impl WikipediaClient {
    pub fn new(client: Client, api_url: impl Into<String>, sentences: usize) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            sentences,
        }
    }

    pub fn from_config(config: &FinanceConfig) -> Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.wikipedia_api_url.clone(),
            config.summary_sentences,
        ))
    }

    /// Page titles matching `query`, best match first
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
            ])
            .await?;

        if let Some(err) = response.error {
            return Err(FinanceError::ApiError(format!(
                "Wikipedia search failed ({}): {}",
                err.code, err.info
            )));
        }

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Plain-text intro of the page, following redirects
    pub async fn summary(&self, title: &str) -> Result<String> {
        let sentences = self.sentences.to_string();
        let response: ExtractResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        if let Some(err) = response.error {
            return Err(FinanceError::ApiError(format!(
                "Wikipedia summary failed ({}): {}",
                err.code, err.info
            )));
        }

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(|page| !page.missing)
            .ok_or_else(|| FinanceError::DataUnavailable {
                symbol: title.to_string(),
                reason: "page does not exist".to_string(),
            })?;

        debug!(title = %page.title, "Fetched Wikipedia summary");
        Ok(page.extract.unwrap_or_default().trim().to_string())
    }

    /// Summary of the best matching page, or `None` when nothing matches
    pub async fn lookup(&self, query: &str) -> Result<Option<String>> {
        let titles = self.search(query).await?;
        match titles.first() {
            Some(title) => self.summary(title).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .map_err(|e| FinanceError::ApiError(format!("Wikipedia request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinanceError::ApiError(format!(
                "Wikipedia API error {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FinanceError::ApiError(format!("Failed to parse Wikipedia response: {e}")))
    }
}
