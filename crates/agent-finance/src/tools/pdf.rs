//! Text to PDF export tool

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{CONVERT_TEXT_TO_PDF, failure};
use crate::document::write_pdf;

/// Writes Markdown or plain text to a PDF at exactly the given file name
#[derive(Debug, Default)]
pub struct ConvertTextToPdfTool;

#[derive(Debug, Deserialize)]
struct PdfParams {
    text: String,
    filename: String,
}

impl ConvertTextToPdfTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ConvertTextToPdfTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: PdfParams = parse_params(params)?;
        if params.filename.trim().is_empty() {
            return Ok(failure("filename must not be empty"));
        }

        let path = PathBuf::from(&params.filename);
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("report")
            .to_string();
        let text = params.text;

        let written = tokio::task::spawn_blocking(move || write_pdf(&text, &title, &path))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));

        match written {
            Ok(pages) => {
                info!(filename = %params.filename, pages, "Saved PDF");
                Ok(json!({ "pdf_filename": params.filename }))
            }
            Err(e) => {
                warn!(filename = %params.filename, error = %e, "Failed to write PDF");
                Ok(failure(e))
            }
        }
    }

    fn name(&self) -> &str {
        CONVERT_TEXT_TO_PDF
    }

    fn description(&self) -> &str {
        "Use this to convert text or Markdown into a PDF file saved under the given file name."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "text": schema::string("Text or Markdown content of the document"),
                "filename": schema::string("Output file name, e.g. report.pdf"),
            }),
            &["text", "filename"],
        )
    }
}
