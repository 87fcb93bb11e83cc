//! Configuration for the finance tools
//!
//! Output locations, service endpoints and credentials live in one explicit
//! [`FinanceConfig`] that is handed to every tool at construction.

use crate::error::{FinanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_YAHOO_FINANCE_URL: &str = "https://query2.finance.yahoo.com";

/// Tickers used when the caller does not name any
pub const DEFAULT_SYMBOLS: [&str; 5] = ["META", "AAPL", "AMZN", "NFLX", "GOOG"];

/// File name of the persisted balance-sheet table
pub const TABLE_FILENAME: &str = "stock_data.csv";

/// Configuration for finance tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Root of `data/` and `images/`
    pub output_dir: PathBuf,

    pub wikipedia_api_url: String,
    pub news_api_url: String,
    pub yahoo_finance_url: String,

    /// NewsAPI key; headlines come back empty without it
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,

    /// Sentences in a Wikipedia summary
    pub summary_sentences: usize,

    pub default_symbols: Vec<String>,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Sent with every request; Wikipedia and Yahoo reject anonymous clients
    pub user_agent: String,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            wikipedia_api_url: DEFAULT_WIKIPEDIA_API_URL.to_string(),
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            yahoo_finance_url: DEFAULT_YAHOO_FINANCE_URL.to_string(),
            news_api_key: None,
            summary_sentences: 8,
            default_symbols: DEFAULT_SYMBOLS.iter().map(ToString::to_string).collect(),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("finance-supervisor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FinanceConfig {
    /// Create a new configuration builder
    pub fn builder() -> FinanceConfigBuilder {
        FinanceConfigBuilder::default()
    }

    /// Read `FINANCE_OUTPUT_DIR` and `NEWS_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(FinanceError::ConfigError(
                "output_dir must not be empty".to_string(),
            ));
        }

        if !(1..=10).contains(&self.summary_sentences) {
            return Err(FinanceError::ConfigError(
                "summary_sentences must be between 1 and 10".to_string(),
            ));
        }

        if self.default_symbols.is_empty() {
            return Err(FinanceError::ConfigError(
                "default_symbols must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(FinanceError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory holding tabular data
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    /// Directory holding rendered charts
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }

    pub fn table_path(&self) -> PathBuf {
        self.data_dir().join(TABLE_FILENAME)
    }

    /// Create the data and image directories
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.data_dir(), self.images_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// HTTP client shared by the API clients
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(&self.user_agent)
            .build()?)
    }
}

/// Builder for FinanceConfig
#[derive(Debug, Default)]
pub struct FinanceConfigBuilder {
    output_dir: Option<PathBuf>,
    wikipedia_api_url: Option<String>,
    news_api_url: Option<String>,
    yahoo_finance_url: Option<String>,
    news_api_key: Option<String>,
    summary_sentences: Option<usize>,
    default_symbols: Option<Vec<String>>,
    request_timeout: Option<Duration>,
}

impl FinanceConfigBuilder {
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn wikipedia_api_url(mut self, url: impl Into<String>) -> Self {
        self.wikipedia_api_url = Some(url.into());
        self
    }

    pub fn news_api_url(mut self, url: impl Into<String>) -> Self {
        self.news_api_url = Some(url.into());
        self
    }

    pub fn yahoo_finance_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_finance_url = Some(url.into());
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn summary_sentences(mut self, sentences: usize) -> Self {
        self.summary_sentences = Some(sentences);
        self
    }

    pub fn default_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Fill unset fields from `FINANCE_OUTPUT_DIR` and `NEWS_API_KEY`
    pub fn with_env(mut self) -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        if self.output_dir.is_none() {
            self.output_dir = var("FINANCE_OUTPUT_DIR").map(PathBuf::from);
        }
        if self.news_api_key.is_none() {
            self.news_api_key = var("NEWS_API_KEY");
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<FinanceConfig> {
        let defaults = FinanceConfig::default();

        let config = FinanceConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            wikipedia_api_url: self
                .wikipedia_api_url
                .unwrap_or(defaults.wikipedia_api_url),
            news_api_url: self.news_api_url.unwrap_or(defaults.news_api_url),
            yahoo_finance_url: self
                .yahoo_finance_url
                .unwrap_or(defaults.yahoo_finance_url),
            news_api_key: self.news_api_key,
            summary_sentences: self
                .summary_sentences
                .unwrap_or(defaults.summary_sentences),
            default_symbols: self.default_symbols.unwrap_or(defaults.default_symbols),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            user_agent: defaults.user_agent,
        };

        config.validate()?;
        Ok(config)
    }
}
