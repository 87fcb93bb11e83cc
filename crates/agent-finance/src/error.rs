//! Error types for finance data operations

use thiserror::Error;

/// Finance specific errors
#[derive(Debug, Error)]
pub enum FinanceError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol or page
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    ChartError(String),

    /// PDF rendering failed
    #[error("PDF error: {0}")]
    PdfError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for finance operations
pub type Result<T> = std::result::Result<T, FinanceError>;

impl From<FinanceError> for agent_core::Error {
    fn from(err: FinanceError) -> Self {
        match err {
            FinanceError::ConfigError(msg) => agent_core::Error::InitializationFailed(msg),
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<agent_core::Error> for FinanceError {
    fn from(err: agent_core::Error) -> Self {
        FinanceError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FinanceError::InvalidSymbol("A B".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: A B");

        let err = FinanceError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "no balance sheet rows".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for AAPL: no balance sheet rows"
        );
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: agent_core::Error = FinanceError::ApiError("boom".to_string()).into();
        match agent_err {
            agent_core::Error::ProcessingFailed(msg) => assert!(msg.contains("API error")),
            other => panic!("Expected ProcessingFailed, got {other:?}"),
        }

        let agent_err: agent_core::Error = FinanceError::ConfigError("bad".to_string()).into();
        assert!(matches!(agent_err, agent_core::Error::InitializationFailed(_)));
    }
}
