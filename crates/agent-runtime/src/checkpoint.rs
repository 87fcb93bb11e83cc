//! Conversation checkpoints keyed by thread
//!
//! A checkpoint is the full message history of one thread plus a step
//! counter. The supervisor loads it at the start of a turn and saves it after
//! every delegation. The store is a trait so a persistent backend can replace
//! the in-memory one without touching the supervisor.

use agent_core::{Context, Error, Result};
use agent_llm::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use tracing::debug;

/// Identity of a conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadKey {
    pub thread_id: String,
    pub user_id: String,
}

impl ThreadKey {
    pub fn new(thread_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Read the key from a context, failing if either part is missing
    pub fn from_context(context: &Context) -> Result<Self> {
        let (thread, user) = context.thread_identity()?;
        Ok(Self::new(thread, user))
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.thread_id)
    }
}

/// Stored state of one thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub messages: Vec<Message>,
    /// Incremented on every save
    pub step: u64,
    pub updated_at: DateTime<Utc>,
}

/// Storage backend for thread checkpoints
#[cfg_attr(test, mockall::automock)]
pub trait CheckpointStore: Send + Sync {
    /// Latest checkpoint of the thread, if any
    fn load(&self, key: &ThreadKey) -> Result<Option<Checkpoint>>;

    /// Replace the thread's history and return the new checkpoint
    fn save(&self, key: &ThreadKey, messages: &[Message]) -> Result<Checkpoint>;

    /// Drop the thread; returns whether it existed
    fn delete(&self, key: &ThreadKey) -> Result<bool>;

    /// Keys of all stored threads
    fn threads(&self) -> Result<Vec<ThreadKey>>;
}

/// Volatile store living for the lifetime of the process
#[derive(Default)]
pub struct InMemoryCheckpointer {
    threads: RwLock<HashMap<ThreadKey, Checkpoint>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Checkpoint("checkpoint lock poisoned".to_string())
}

impl CheckpointStore for InMemoryCheckpointer {
    fn load(&self, key: &ThreadKey) -> Result<Option<Checkpoint>> {
        let threads = self.threads.read().map_err(poisoned)?;
        Ok(threads.get(key).cloned())
    }

    fn save(&self, key: &ThreadKey, messages: &[Message]) -> Result<Checkpoint> {
        let mut threads = self.threads.write().map_err(poisoned)?;
        let step = threads.get(key).map_or(1, |cp| cp.step + 1);
        let checkpoint = Checkpoint {
            messages: messages.to_vec(),
            step,
            updated_at: Utc::now(),
        };
        debug!(thread = %key, step, messages = messages.len(), "Checkpoint saved");
        threads.insert(key.clone(), checkpoint.clone());
        Ok(checkpoint)
    }

    fn delete(&self, key: &ThreadKey) -> Result<bool> {
        let mut threads = self.threads.write().map_err(poisoned)?;
        Ok(threads.remove(key).is_some())
    }

    fn threads(&self) -> Result<Vec<ThreadKey>> {
        let threads = self.threads.read().map_err(poisoned)?;
        Ok(threads.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_context() {
        let ctx = Context::for_thread("1", "7");
        let key = ThreadKey::from_context(&ctx).unwrap();
        assert_eq!(key, ThreadKey::new("1", "7"));
        assert_eq!(key.to_string(), "7/1");

        assert!(ThreadKey::from_context(&Context::new()).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let store = InMemoryCheckpointer::new();
        let key = ThreadKey::new("1", "1");
        assert!(store.load(&key).unwrap().is_none());

        let first = store.save(&key, &[Message::user("hi")]).unwrap();
        assert_eq!(first.step, 1);

        let second = store
            .save(&key, &[Message::user("hi"), Message::assistant("hello")])
            .unwrap();
        assert_eq!(second.step, 2);

        let loaded = store.load(&key).unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.step, 2);
    }

    #[test]
    fn test_threads_are_isolated() {
        let store = InMemoryCheckpointer::new();
        let a = ThreadKey::new("1", "alice");
        let b = ThreadKey::new("1", "bob");

        store.save(&a, &[Message::user("alice's question")]).unwrap();

        assert!(store.load(&b).unwrap().is_none());
        assert_eq!(store.threads().unwrap(), vec![a.clone()]);

        assert!(store.delete(&a).unwrap());
        assert!(!store.delete(&a).unwrap());
        assert!(store.threads().unwrap().is_empty());
    }
}
