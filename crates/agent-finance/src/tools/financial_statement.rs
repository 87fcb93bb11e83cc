//! Balance-sheet retrieval tool
//!
//! Fetches annual balance sheets for a set of tickers, derives liquidity and
//! leverage ratios and persists the combined table as CSV.

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use super::{GET_FINANCIAL_STATEMENT, failure};
use crate::api::YahooFinanceClient;
use crate::config::{FinanceConfig, TABLE_FILENAME};
use crate::error::Result;
use crate::table::FinancialTable;

pub struct FinancialStatementTool {
    client: YahooFinanceClient,
    config: Arc<FinanceConfig>,
}

/// A comma or whitespace separated string, or a list of tickers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Symbols {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct FinancialStatementParams {
    #[serde(default)]
    symbols: Option<Symbols>,
}

impl Symbols {
    fn into_list(self) -> Vec<String> {
        let raw = match self {
            Symbols::One(s) => vec![s],
            Symbols::Many(v) => v,
        };

        let mut out: Vec<String> = Vec::new();
        for symbol in raw
            .iter()
            .flat_map(|s| s.split(|c: char| c == ',' || c.is_whitespace()))
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
        {
            if !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        out
    }
}

impl FinancialStatementTool {
    pub fn new(config: Arc<FinanceConfig>) -> Result<Self> {
        let client = YahooFinanceClient::from_config(&config)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: YahooFinanceClient, config: Arc<FinanceConfig>) -> Self {
        Self { client, config }
    }

    fn resolve_symbols(&self, symbols: Option<Symbols>) -> Vec<String> {
        let list = symbols.map(Symbols::into_list).unwrap_or_default();
        if list.is_empty() {
            self.config.default_symbols.clone()
        } else {
            list
        }
    }
}

#[async_trait]
impl Tool for FinancialStatementTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: FinancialStatementParams = parse_params(params)?;
        let symbols = self.resolve_symbols(params.symbols);

        let mut sheets = Vec::new();
        for symbol in &symbols {
            match self.client.balance_sheet(symbol).await {
                Ok(rows) => sheets.extend(rows),
                Err(e) => warn!(symbol = %symbol, error = %e, "Skipping ticker"),
            }
        }

        if sheets.is_empty() {
            return Ok(failure(format!(
                "no balance sheet data for {}",
                symbols.join(", ")
            )));
        }

        let table = FinancialTable::from_balance_sheets(&sheets);
        let path = self.config.table_path();
        if let Err(e) = table.write_csv(&path) {
            warn!(path = %path.display(), error = %e, "Failed to write table");
            return Ok(failure(e));
        }

        info!(
            path = %path.display(),
            rows = table.len(),
            symbols = ?table.symbols(),
            "Saved financial statement"
        );

        Ok(json!({
            "csv_filename": TABLE_FILENAME,
            "path": path.display().to_string(),
            "columns": table.columns(),
            "rows": table.len(),
            "symbols": table.symbols(),
        }))
    }

    fn name(&self) -> &str {
        GET_FINANCIAL_STATEMENT
    }

    fn description(&self) -> &str {
        "Use this to get the annual balance sheet of one or more stocks, with \
         current ratio, quick ratio and debt-to-equity ratio. The table is saved \
         as CSV for plotting; returns the file name and its columns."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbols": schema::any_of(
                    "Stock tickers, e.g. \"AAPL,MSFT\" or [\"AAPL\", \"MSFT\"]. \
                     Defaults to META, AAPL, AMZN, NFLX, GOOG",
                    vec![
                        json!({ "type": "string" }),
                        schema::array("List of tickers", json!({ "type": "string" })),
                    ],
                ),
            }),
            &[],
        )
    }
}
