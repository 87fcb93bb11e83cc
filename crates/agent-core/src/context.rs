//! Execution context for agents
//!
//! A `Context` travels with every user turn. It always identifies the
//! conversation thread (`thread_id` + `user_id`) and may carry extra
//! key-value data that tools or routing policies want to consult.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Conversation thread identifier
    pub const THREAD_ID: &str = "thread_id";
    /// User identifier, paired with the thread identifier
    pub const USER_ID: &str = "user_id";
    /// Upper bound on supervisor routing steps for the turn
    pub const ROUTING_LIMIT: &str = "routing_limit";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let ctx = Context::new().with_thread_id("1").with_user_id("1");
///
/// assert_eq!(ctx.thread_id(), Some("1"));
/// assert_eq!(ctx.user_id(), Some("1"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the given thread and user
    pub fn for_thread(thread_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new().with_thread_id(thread_id).with_user_id(user_id)
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.insert(keys::THREAD_ID, serde_json::json!(thread_id.into()));
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.insert(keys::USER_ID, serde_json::json!(user_id.into()));
        self
    }

    /// Override the routing step limit for turns run with this context
    pub fn with_routing_limit(mut self, limit: usize) -> Self {
        self.insert(keys::ROUTING_LIMIT, serde_json::json!(limit));
        self
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.get(keys::THREAD_ID).and_then(|v| v.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get(keys::USER_ID).and_then(|v| v.as_str())
    }

    pub fn routing_limit(&self) -> Option<usize> {
        self.get(keys::ROUTING_LIMIT)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }

    /// Returns `(thread_id, user_id)`, failing if either is absent
    pub fn thread_identity(&self) -> crate::Result<(&str, &str)> {
        let thread = self
            .thread_id()
            .ok_or(crate::Error::MissingThread(keys::THREAD_ID))?;
        let user = self
            .user_id()
            .ok_or(crate::Error::MissingThread(keys::USER_ID))?;
        Ok((thread, user))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value, serializing it to JSON
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value, deserializing it from JSON
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        self.data
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })
            })
            .transpose()
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Preferences {
        currency: String,
        verbose: bool,
    }

    #[test]
    fn test_thread_identity() {
        let ctx = Context::for_thread("1", "42");
        assert_eq!(ctx.thread_identity().unwrap(), ("1", "42"));
    }

    #[test]
    fn test_missing_user_is_an_error() {
        let ctx = Context::new().with_thread_id("1");
        let err = ctx.thread_identity().unwrap_err();
        assert!(matches!(err, crate::Error::MissingThread(keys::USER_ID)));
    }

    #[test]
    fn test_routing_limit() {
        let ctx = Context::new();
        assert_eq!(ctx.routing_limit(), None);

        let ctx = ctx.with_routing_limit(3);
        assert_eq!(ctx.routing_limit(), Some(3));
    }

    #[test]
    fn test_typed_insert_get() {
        let mut ctx = Context::new();
        let prefs = Preferences {
            currency: "SGD".to_string(),
            verbose: true,
        };

        ctx.insert_typed("prefs", &prefs).unwrap();
        let back: Preferences = ctx.get_typed("prefs").unwrap().unwrap();
        assert_eq!(back, prefs);

        let missing: Option<Preferences> = ctx.get_typed("nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_remove() {
        let mut ctx = Context::for_thread("1", "1");
        assert_eq!(ctx.len(), 2);
        ctx.remove(keys::THREAD_ID);
        assert!(ctx.thread_id().is_none());
        assert!(!ctx.is_empty());
    }
}
