//! Tool trait definition

use agent_core::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single-purpose function an agent can call
///
/// Implementations wrap one external service or computation. Failures of that
/// service are reported inside the returned value (a failure string or an
/// empty result); `Err` is reserved for arguments that do not match
/// [`Tool::input_schema`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with arguments produced by the model
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name within a [`crate::ToolRegistry`]
    fn name(&self) -> &str;

    /// Shown to the model to decide when the tool applies
    fn description(&self) -> &str;

    /// JSON Schema of the expected arguments
    fn input_schema(&self) -> Value;
}

/// Deserialize tool arguments, mapping failures to [`Error::InvalidParameters`]
///
/// ```
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Params {
///     query: String,
/// }
///
/// let params: Params = agent_tools::parse_params(json!({"query": "DBS"})).unwrap();
/// assert_eq!(params.query, "DBS");
/// assert!(agent_tools::parse_params::<Params>(json!({})).is_err());
/// ```
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    // Models sometimes send `null` for tools whose arguments are all optional
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| Error::InvalidParameters(e.to_string()))
}
