//! Tool registry and capability-scoped tool sets

use crate::Tool;
use agent_core::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registry of every tool known to the process
///
/// The registry is shared; agents never dispatch through it directly but
/// through a [`ToolSet`] obtained from [`ToolRegistry::scope`].
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registering tool");
        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the capability set for `owner` from the given tool names
    ///
    /// Fails with [`Error::ToolNotFound`] if any name is not registered, so a
    /// misconfigured agent is caught at construction time.
    pub fn scope<S: AsRef<str>>(&self, owner: &str, names: &[S]) -> Result<ToolSet> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut scoped = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let tool = tools
                .get(name)
                .cloned()
                .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
            if !scoped.iter().any(|t: &Arc<dyn Tool>| t.name() == name) {
                scoped.push(tool);
            }
        }

        Ok(ToolSet {
            owner: owner.to_string(),
            tools: scoped,
        })
    }
}

/// Immutable set of tools one agent is permitted to call
#[derive(Clone)]
pub struct ToolSet {
    owner: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    /// A set with no tools
    pub fn empty(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            tools: Vec::new(),
        }
    }

    /// Agent this set belongs to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Resolve a tool by name, rejecting anything outside the set
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| Error::ToolNotPermitted {
                agent: self.owner.clone(),
                tool: name.to_string(),
            })
    }

    pub fn permits(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Tool names in the order they were granted
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet")
            .field("owner", &self.owner)
            .field("tools", &self.names())
            .finish()
    }
}
