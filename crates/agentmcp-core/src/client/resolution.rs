//! Request-time resolution of MCP server names.

use indexmap::IndexSet;
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::mcp::{McpServerCatalog, ResolvedServers};

/// Union `defaults` and `requested` and resolve them against `catalog`.
///
/// Names keep the order of their first occurrence, defaults first. An empty
/// union never needs a catalog.
pub fn resolve_mcp_servers<D, R>(
    catalog: Option<&McpServerCatalog>,
    defaults: D,
    requested: R,
) -> Result<ResolvedServers>
where
    D: IntoIterator,
    D::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let names: IndexSet<String> = defaults
        .into_iter()
        .map(|n| n.as_ref().to_string())
        .chain(requested.into_iter().map(|n| n.as_ref().to_string()))
        .collect();

    if names.is_empty() {
        return Ok(ResolvedServers::new());
    }

    let Some(catalog) = catalog else {
        return Err(AgentError::MissingCatalog {
            requested: names.into_iter().collect(),
        });
    };

    let resolved = catalog.resolve(&names)?;
    debug!("Resolved {} MCP server(s): {:?}", resolved.len(), names);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{SseDefinition, StdioDefinition};

    fn catalog() -> McpServerCatalog {
        McpServerCatalog::builder()
            .add("a", StdioDefinition::new("a").unwrap())
            .and_then(|b| b.add("b", SseDefinition::new("http://b").unwrap()))
            .unwrap()
            .build()
    }

    #[test]
    fn test_union_collapses_duplicates() {
        let resolved = resolve_mcp_servers(Some(&catalog()), ["a"], ["a", "b"]).unwrap();
        let names: Vec<_> = resolved.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_union_needs_no_catalog() {
        let none: [&str; 0] = [];
        assert!(resolve_mcp_servers(None, none, none).unwrap().is_empty());
    }

    #[test]
    fn test_names_without_catalog_fail() {
        let none: [&str; 0] = [];
        let err = resolve_mcp_servers(None, ["a"], none).unwrap_err();
        assert!(matches!(err, AgentError::MissingCatalog { .. }));
        assert!(err.to_string().contains("McpServerCatalog"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = catalog();
        let first = resolve_mcp_servers(Some(&catalog), ["b"], ["a"]).unwrap();
        let second = resolve_mcp_servers(Some(&catalog), ["b"], ["a"]).unwrap();
        assert_eq!(first, second);
    }
}
