//! Tool plotting one column of the saved financial table

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use super::{PLOT_FINANCIAL_COLUMN, failure};
use crate::chart::{ChartPoint, render_line_chart, sanitize_file_stem};
use crate::config::FinanceConfig;
use crate::table::FinancialTable;

pub struct PlotFinancialColumnTool {
    config: Arc<FinanceConfig>,
}

#[derive(Debug, Deserialize)]
struct PlotParams {
    column: String,
    title: String,
}

impl PlotFinancialColumnTool {
    pub fn new(config: Arc<FinanceConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Tool for PlotFinancialColumnTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: PlotParams = parse_params(params)?;
        let table_path = self.config.table_path();

        if !table_path.exists() {
            return Ok(failure(format!(
                "no saved financial table at {}; call get_financial_statement first",
                table_path.display()
            )));
        }

        let table = match FinancialTable::read_csv(&table_path) {
            Ok(table) => table,
            Err(e) => return Ok(failure(e)),
        };

        let Some(values) = table.column(&params.column) else {
            return Ok(failure(format!(
                "unknown column '{}'. Available columns: {}",
                params.column,
                table.value_columns().join(", ")
            )));
        };

        let points: Vec<ChartPoint> = table
            .rows()
            .iter()
            .zip(values)
            .filter_map(|(row, value)| {
                value.map(|value| ChartPoint {
                    label: row.label(),
                    value,
                })
            })
            .collect();

        if points.is_empty() {
            return Ok(failure(format!(
                "column '{}' has no numeric values",
                params.column
            )));
        }

        let image_filename = format!("{}.svg", sanitize_file_stem(&params.title));
        let path = self.config.images_dir().join(&image_filename);
        let count = points.len();
        let rendered = {
            let (path, title, column) = (path.clone(), params.title, params.column.clone());
            tokio::task::spawn_blocking(move || render_line_chart(&path, &title, &column, &points))
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r.map_err(|e| e.to_string()))
        };
        if let Err(e) = rendered {
            warn!(path = %path.display(), error = %e, "Failed to render chart");
            return Ok(failure(e));
        }

        info!(path = %path.display(), column = %params.column, points = count, "Saved chart");
        Ok(json!({
            "image_filename": image_filename,
            "path": path.display().to_string(),
            "column": params.column,
            "points": count,
        }))
    }

    fn name(&self) -> &str {
        PLOT_FINANCIAL_COLUMN
    }

    fn description(&self) -> &str {
        "Use this to plot one column of the saved financial statement table \
         (e.g. CurrentRatio) as a line chart. Returns the saved image file name."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "column": schema::string("Column of the financial table to plot"),
                "title": schema::string("Chart title; also used as the image file name"),
            }),
            &["column", "title"],
        )
    }
}
