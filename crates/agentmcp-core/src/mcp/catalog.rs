//! Named catalog of portable MCP server definitions.

use std::path::Path;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::definition::McpServerDefinition;
use super::loader::CatalogLoader;
use crate::error::{AgentError, Result};

/// Insertion-ordered name -> definition map handed to agent models.
pub type ResolvedServers = IndexMap<String, McpServerDefinition>;

/// Immutable registry of MCP server definitions.
///
/// Cloning is cheap: clones share the same frozen map, so one catalog can be
/// handed to any number of clients and threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpServerCatalog {
    servers: Arc<ResolvedServers>,
}

impl McpServerCatalog {
    pub fn builder() -> McpServerCatalogBuilder {
        McpServerCatalogBuilder::default()
    }

    /// Create a catalog from an existing collection of named definitions.
    pub fn of<I, S>(servers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, McpServerDefinition)>,
        S: Into<String>,
    {
        servers
            .into_iter()
            .try_fold(Self::builder(), |builder, (name, def)| {
                builder.add(name, def)
            })
            .map(McpServerCatalogBuilder::build)
    }

    /// Load a single catalog document.
    pub fn from_file(path: &Path) -> Result<Self> {
        CatalogLoader::new().load_file(path)
    }

    /// Load and merge every `*.json` document in a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        CatalogLoader::new().load_directory(path)
    }

    /// Load from a file or a directory, whichever `path` points at.
    pub fn from_path(path: &Path) -> Result<Self> {
        CatalogLoader::new().load(path)
    }

    pub(crate) fn from_map(servers: ResolvedServers) -> Self {
        Self {
            servers: Arc::new(servers),
        }
    }

    pub fn all(&self) -> &ResolvedServers {
        &self.servers
    }

    pub fn get(&self, name: &str) -> Option<&McpServerDefinition> {
        self.servers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Resolve server names to their definitions.
    ///
    /// Duplicate names collapse to one entry. Fails with
    /// [`AgentError::CatalogLookup`] listing every missing name; a partial map
    /// is never returned.
    pub fn resolve<I, S>(&self, names: I) -> Result<ResolvedServers>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = ResolvedServers::new();
        let mut missing: IndexSet<String> = IndexSet::new();
        for name in names {
            let name = name.as_ref();
            match self.servers.get(name) {
                Some(def) => {
                    resolved.insert(name.to_string(), def.clone());
                }
                None => {
                    missing.insert(name.to_string());
                }
            }
        }

        if !missing.is_empty() {
            return Err(AgentError::CatalogLookup {
                missing: missing.into_iter().collect(),
                available: self.servers.keys().cloned().collect(),
            });
        }
        Ok(resolved)
    }
}

/// Mutable accumulator frozen into a [`McpServerCatalog`] by [`build`].
///
/// [`build`]: McpServerCatalogBuilder::build
#[derive(Debug, Default)]
pub struct McpServerCatalogBuilder {
    servers: ResolvedServers,
}

impl McpServerCatalogBuilder {
    /// Add a named definition. A repeated name replaces the earlier entry.
    pub fn add(
        mut self,
        name: impl Into<String>,
        definition: impl Into<McpServerDefinition>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::InvalidArgument(
                "MCP server name must not be blank".to_string(),
            ));
        }
        self.servers.insert(name, definition.into());
        Ok(self)
    }

    pub fn build(self) -> McpServerCatalog {
        McpServerCatalog::from_map(self.servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::definition::{HttpDefinition, SseDefinition, StdioDefinition};

    fn catalog() -> McpServerCatalog {
        McpServerCatalog::builder()
            .add("a", StdioDefinition::new("cmd-a").unwrap())
            .and_then(|b| b.add("b", SseDefinition::new("http://b").unwrap()))
            .and_then(|b| b.add("c", HttpDefinition::new("http://c").unwrap()))
            .unwrap()
            .build()
    }

    #[test]
    fn test_builder_last_write_wins() {
        let catalog = McpServerCatalog::builder()
            .add("a", StdioDefinition::new("first").unwrap())
            .and_then(|b| b.add("a", StdioDefinition::new("second").unwrap()))
            .unwrap()
            .build();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().endpoint(), "second");
    }

    #[test]
    fn test_builder_rejects_blank_name() {
        let result = McpServerCatalog::builder().add(" ", StdioDefinition::new("cmd").unwrap());
        assert!(matches!(result, Err(AgentError::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_reports_all_missing_names() {
        let err = catalog().resolve(["a", "x", "y", "x"]).unwrap_err();
        match err {
            AgentError::CatalogLookup { missing, available } => {
                assert_eq!(missing, vec!["x".to_string(), "y".to_string()]);
                assert_eq!(available, vec!["a", "b", "c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_keeps_request_order() {
        let resolved = catalog().resolve(["c", "a"]).unwrap();
        let keys: Vec<_> = resolved.keys().cloned().collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn test_clones_share_frozen_map() {
        let original = catalog();
        let copy = original.clone();
        assert!(Arc::ptr_eq(&original.servers, &copy.servers));
    }
}
