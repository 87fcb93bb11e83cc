//! Balance-sheet table with derived liquidity and leverage ratios
//!
//! The table is the hand-off point between the retrieval tool and the chart
//! tool: it is written once as CSV and loaded again for plotting. Missing
//! values are empty cells; a ratio is missing whenever an operand is missing
//! or a denominator is zero.

use crate::api::{BalanceSheetField, BalanceSheetRow};
use crate::error::{FinanceError, Result};
use std::path::Path;

/// Identifying columns, in table order
pub const KEY_COLUMNS: [&str; 3] = ["asOfDate", "symbol", "periodType"];

pub const CURRENT_RATIO: &str = "CurrentRatio";
pub const QUICK_RATIO: &str = "QuickRatio";
pub const DEBT_TO_EQUITY_RATIO: &str = "DebtToEquityRatio";

/// `numerator / denominator`, absent on missing input or a zero denominator
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d).filter(|v| v.is_finite())
}

/// One reporting date of one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRow {
    pub as_of_date: String,
    pub symbol: String,
    pub period_type: String,
    /// Aligned with [`FinancialTable::value_columns`]
    pub values: Vec<Option<f64>>,
}

impl FinancialRow {
    /// Label used on chart axes
    pub fn label(&self) -> String {
        format!("{} {}", self.symbol, self.as_of_date)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialTable {
    value_columns: Vec<String>,
    rows: Vec<FinancialRow>,
}

impl FinancialTable {
    /// Build the table and derive the three ratios for every row
    pub fn from_balance_sheets(rows: &[BalanceSheetRow]) -> Self {
        let value_columns = BalanceSheetField::ALL
            .iter()
            .map(|f| f.as_str())
            .chain([CURRENT_RATIO, QUICK_RATIO, DEBT_TO_EQUITY_RATIO])
            .map(ToString::to_string)
            .collect();

        let rows = rows
            .iter()
            .map(|row| {
                let field = |f| row.get(f);
                let current_assets = field(BalanceSheetField::CurrentAssets);
                let current_liabilities = field(BalanceSheetField::CurrentLiabilities);

                let mut values: Vec<Option<f64>> =
                    BalanceSheetField::ALL.iter().map(|f| field(*f)).collect();
                values.push(ratio(current_assets, current_liabilities));
                // CurrentAssets / Inventory / CurrentLiabilities, chained
                values.push(ratio(
                    ratio(current_assets, field(BalanceSheetField::Inventory)),
                    current_liabilities,
                ));
                values.push(ratio(
                    field(BalanceSheetField::TotalDebt),
                    field(BalanceSheetField::StockholdersEquity),
                ));

                FinancialRow {
                    as_of_date: row.as_of_date.clone(),
                    symbol: row.symbol.clone(),
                    period_type: row.period_type.clone(),
                    values,
                }
            })
            .collect();

        Self {
            value_columns,
            rows,
        }
    }

    /// All column names, identifying columns first
    pub fn columns(&self) -> Vec<String> {
        KEY_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(self.value_columns.iter().cloned())
            .collect()
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn rows(&self) -> &[FinancialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct tickers in first-seen order
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for row in &self.rows {
            if !symbols.contains(&row.symbol) {
                symbols.push(row.symbol.clone());
            }
        }
        symbols
    }

    /// Values of a numeric column, or `None` if there is no such column
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.value_columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.columns())?;
        for row in &self.rows {
            let mut record = vec![
                row.as_of_date.clone(),
                row.symbol.clone(),
                row.period_type.clone(),
            ];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let header_keys: Vec<&str> = headers.iter().take(KEY_COLUMNS.len()).collect();
        if header_keys != KEY_COLUMNS {
            return Err(FinanceError::Other(format!(
                "Unexpected table header in {}: {:?}",
                path.display(),
                header_keys
            )));
        }
        let value_columns: Vec<String> = headers
            .iter()
            .skip(KEY_COLUMNS.len())
            .map(ToString::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
            let values = value_columns
                .iter()
                .enumerate()
                .map(|(i, column)| parse_cell(record.get(KEY_COLUMNS.len() + i), column))
                .collect::<Result<Vec<_>>>()?;

            rows.push(FinancialRow {
                as_of_date: cell(0),
                symbol: cell(1),
                period_type: cell(2),
                values,
            });
        }

        Ok(Self {
            value_columns,
            rows,
        })
    }
}

fn parse_cell(cell: Option<&str>, column: &str) -> Result<Option<f64>> {
    match cell.map(str::trim) {
        None | Some("" | "NaN" | "nan") => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
            FinanceError::Other(format!("Invalid number '{text}' in column {column}"))
        }),
    }
}
