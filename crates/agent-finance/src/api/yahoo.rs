//! Yahoo Finance fundamentals time-series client
//!
//! Annual balance-sheet values come from the `fundamentals-timeseries`
//! endpoint, which returns one series per requested field. Series are
//! regrouped here into one row per reporting date.

use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Start of the requested history (mid 1985), far enough back for any listing
const PERIOD_START: i64 = 493_590_046;

/// Balance-sheet fields fetched for every ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BalanceSheetField {
    CurrentAssets,
    CurrentLiabilities,
    Inventory,
    TotalDebt,
    StockholdersEquity,
    TotalAssets,
    CashAndCashEquivalents,
}

impl BalanceSheetField {
    pub const ALL: [Self; 7] = [
        Self::CurrentAssets,
        Self::CurrentLiabilities,
        Self::Inventory,
        Self::TotalDebt,
        Self::StockholdersEquity,
        Self::TotalAssets,
        Self::CashAndCashEquivalents,
    ];

    /// Column name in the persisted table
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentAssets => "CurrentAssets",
            Self::CurrentLiabilities => "CurrentLiabilities",
            Self::Inventory => "Inventory",
            Self::TotalDebt => "TotalDebt",
            Self::StockholdersEquity => "StockholdersEquity",
            Self::TotalAssets => "TotalAssets",
            Self::CashAndCashEquivalents => "CashAndCashEquivalents",
        }
    }

    /// Series name understood by the time-series endpoint
    pub fn series_type(self) -> String {
        format!("annual{}", self.as_str())
    }

    fn from_series_type(series: &str) -> Option<Self> {
        let name = series.strip_prefix("annual")?;
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Balance-sheet values of one ticker at one reporting date
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSheetRow {
    pub symbol: String,
    /// `YYYY-MM-DD`
    pub as_of_date: String,
    /// e.g. `12M`
    pub period_type: String,
    pub values: BTreeMap<BalanceSheetField, f64>,
}

impl BalanceSheetRow {
    pub fn get(&self, field: BalanceSheetField) -> Option<f64> {
        self.values.get(&field).copied()
    }
}

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    timeseries: Timeseries,
}

#[derive(Debug, Deserialize)]
struct Timeseries {
    #[serde(default)]
    result: Vec<Value>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    as_of_date: String,
    #[serde(default)]
    period_type: String,
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: Option<f64>,
}

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &FinanceConfig) -> Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.yahoo_finance_url.clone(),
        ))
    }

    /// Annual balance-sheet rows of `symbol`, oldest first
    pub async fn balance_sheet(&self, symbol: &str) -> Result<Vec<BalanceSheetRow>> {
        let symbol = normalize_symbol(symbol)?;
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{symbol}",
            self.base_url.trim_end_matches('/')
        );
        let types = BalanceSheetField::ALL
            .iter()
            .map(|f| f.series_type())
            .collect::<Vec<_>>()
            .join(",");
        let period1 = PERIOD_START.to_string();
        let period2 = Utc::now().timestamp().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("type", types.as_str()),
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FinanceError::ApiError(format!("Yahoo Finance request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FinanceError::ApiError(format!(
                "Yahoo Finance error {status}: {body}"
            )));
        }

        let envelope = response.json::<TimeseriesEnvelope>().await.map_err(|e| {
            FinanceError::ApiError(format!("Failed to parse Yahoo Finance response: {e}"))
        })?;

        let rows = parse_timeseries(&symbol, envelope)?;
        debug!(symbol = %symbol, rows = rows.len(), "Fetched balance sheet");
        Ok(rows)
    }
}

/// Uppercase and validate a ticker
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if valid {
        Ok(symbol)
    } else {
        Err(FinanceError::InvalidSymbol(symbol))
    }
}

fn parse_timeseries(symbol: &str, envelope: TimeseriesEnvelope) -> Result<Vec<BalanceSheetRow>> {
    if let Some(error) = envelope.timeseries.error.filter(|e| !e.is_null()) {
        return Err(FinanceError::ApiError(format!(
            "Yahoo Finance returned an error: {error}"
        )));
    }

    let mut grouped: BTreeMap<(String, String), BTreeMap<BalanceSheetField, f64>> =
        BTreeMap::new();

    for series in &envelope.timeseries.result {
        let Some(series_type) = series["meta"]["type"][0].as_str() else {
            continue;
        };
        let Some(field) = BalanceSheetField::from_series_type(series_type) else {
            continue;
        };
        let Some(points) = series[series_type].as_array() else {
            continue;
        };

        // Missing years come back as nulls
        for point in points.iter().filter(|p| !p.is_null()) {
            let point: DataPoint = serde_json::from_value(point.clone())?;
            if let Some(raw) = point.reported_value.and_then(|v| v.raw) {
                grouped
                    .entry((point.as_of_date, point.period_type))
                    .or_default()
                    .insert(field, raw);
            }
        }
    }

    if grouped.is_empty() {
        return Err(FinanceError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no balance sheet data returned".to_string(),
        });
    }

    Ok(grouped
        .into_iter()
        .map(|((as_of_date, period_type), values)| BalanceSheetRow {
            symbol: symbol.to_string(),
            as_of_date,
            period_type,
            values,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(date: &str, raw: f64) -> Value {
        json!({
            "asOfDate": date,
            "periodType": "12M",
            "currencyCode": "USD",
            "reportedValue": {"raw": raw, "fmt": "x"}
        })
    }

    #[test]
    fn test_field_names() {
        assert_eq!(
            BalanceSheetField::CurrentAssets.series_type(),
            "annualCurrentAssets"
        );
        assert_eq!(
            BalanceSheetField::from_series_type("annualTotalDebt"),
            Some(BalanceSheetField::TotalDebt)
        );
        assert_eq!(BalanceSheetField::from_series_type("quarterlyTotalDebt"), None);
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk-b").unwrap(), "BRK-B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("AA PL").is_err());
    }

    #[test]
    fn test_parse_groups_by_date() {
        let envelope: TimeseriesEnvelope = serde_json::from_value(json!({
            "timeseries": {
                "result": [
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualCurrentAssets"]},
                        "timestamp": [1, 2],
                        "annualCurrentAssets": [point("2023-09-30", 143.0), null, point("2022-09-30", 135.0)]
                    },
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualCurrentLiabilities"]},
                        "annualCurrentLiabilities": [point("2023-09-30", 145.0)]
                    },
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualInventory"]}
                    }
                ],
                "error": null
            }
        }))
        .unwrap();

        let rows = parse_timeseries("AAPL", envelope).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_of_date, "2022-09-30");
        assert_eq!(rows[0].get(BalanceSheetField::CurrentLiabilities), None);
        assert_eq!(rows[1].get(BalanceSheetField::CurrentAssets), Some(143.0));
        assert_eq!(rows[1].get(BalanceSheetField::CurrentLiabilities), Some(145.0));
        assert_eq!(rows[1].period_type, "12M");
    }

    #[test]
    fn test_parse_empty_result() {
        let envelope: TimeseriesEnvelope =
            serde_json::from_value(json!({"timeseries": {"result": [], "error": null}})).unwrap();
        let err = parse_timeseries("ZZZZ", envelope).unwrap_err();
        assert!(matches!(err, FinanceError::DataUnavailable { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_balance_sheet() {
        let client = YahooFinanceClient::from_config(&FinanceConfig::default()).unwrap();
        let rows = client.balance_sheet("AAPL").await.unwrap();
        assert!(!rows.is_empty());
        assert_eq!(rows[0].symbol, "AAPL");
    }
}
