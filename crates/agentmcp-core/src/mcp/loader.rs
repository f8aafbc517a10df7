//! Catalog loading from JSON documents.
//!
//! The document shape follows the Claude CLI convention:
//!
//! ```json
//! {
//!   "servers": {
//!     "brave-search": {
//!       "type": "stdio",
//!       "command": "npx",
//!       "args": ["-y", "@modelcontextprotocol/server-brave-search"],
//!       "env": { "BRAVE_API_KEY": "${BRAVE_API_KEY}" }
//!     },
//!     "weather": { "type": "sse", "url": "http://localhost:8080/sse" }
//!   }
//! }
//! ```
//!
//! `mcpServers` is accepted in place of `servers`. `${VAR}` placeholders in
//! string fields are substituted at load time; unset variables become empty
//! strings.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::catalog::{McpServerCatalog, ResolvedServers};
use super::definition::{
    HttpDefinition, McpServerDefinition, SseDefinition, StdioDefinition, TransportType,
};
use crate::error::{AgentError, Result};

/// File extension matched when scanning a catalog directory.
pub const CATALOG_FILE_EXTENSION: &str = "json";

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
});

/// Source of environment variable values for `${VAR}` substitution.
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Replace every `${NAME}` in `value` using `env`; unset names become "".
pub fn substitute_env_vars(value: &str, env: &impl EnvLookup) -> String {
    ENV_VAR_PATTERN
        .replace_all(value, |caps: &Captures<'_>| match env.var(&caps[1]) {
            Some(resolved) => resolved,
            None => {
                debug!("Environment variable '{}' is not set, substituting empty string", &caps[1]);
                String::new()
            }
        })
        .into_owned()
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default, alias = "mcpServers")]
    servers: Option<IndexMap<String, RawServerEntry>>,
}

/// One server entry, kept loosely typed.
///
/// Scalars are read as text, `null` counts as absent, and collections of the
/// wrong shape are treated as empty. Fields that do not belong to the entry's
/// type are never inspected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerEntry {
    #[serde(rename = "type")]
    kind: Value,
    command: Value,
    args: Value,
    env: Value,
    url: Value,
    headers: Value,
}

/// Text of a scalar value; `None` for null and containers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses catalog documents into [`McpServerCatalog`]s.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader<E = ProcessEnv> {
    env: E,
}

impl CatalogLoader<ProcessEnv> {
    pub fn new() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: EnvLookup> CatalogLoader<E> {
    /// Use a custom environment source instead of the process environment.
    pub fn with_env(env: E) -> Self {
        Self { env }
    }

    /// Load a file, or merge a directory of `*.json` files.
    pub fn load(&self, path: &Path) -> Result<McpServerCatalog> {
        if !path.exists() {
            return Err(AgentError::parse(path, "path does not exist"));
        }
        if path.is_dir() {
            self.load_directory(path)
        } else {
            self.load_file(path)
        }
    }

    pub fn load_file(&self, path: &Path) -> Result<McpServerCatalog> {
        let servers = self.parse_file(path)?;
        info!(
            "Loaded {} MCP server(s) from {}",
            servers.len(),
            path.display()
        );
        Ok(McpServerCatalog::from_map(servers))
    }

    /// Merge every matching document in `dir`, in file-name order.
    ///
    /// Later files overwrite earlier ones on name collision. Files without a
    /// `.json` extension are skipped.
    pub fn load_directory(&self, dir: &Path) -> Result<McpServerCatalog> {
        let files = catalog_files(dir)?;
        let mut servers = ResolvedServers::new();
        for file in &files {
            for (name, def) in self.parse_file(file)? {
                if servers.contains_key(&name) {
                    debug!("MCP server '{}' redefined by {}", name, file.display());
                }
                servers.insert(name, def);
            }
        }
        info!(
            "Loaded {} MCP server(s) from {} file(s) in {}",
            servers.len(),
            files.len(),
            dir.display()
        );
        Ok(McpServerCatalog::from_map(servers))
    }

    /// Parse document content; `source` is only used in error messages.
    pub fn parse_str(&self, content: &str, source: &Path) -> Result<ResolvedServers> {
        let document: CatalogDocument = serde_json::from_str(content)
            .map_err(|e| AgentError::parse(source, format!("invalid JSON: {}", e)))?;

        let mut servers = ResolvedServers::new();
        for (name, entry) in document.servers.unwrap_or_default() {
            let def = self.parse_definition(&name, entry, source)?;
            servers.insert(name, def);
        }
        Ok(servers)
    }

    fn parse_file(&self, path: &Path) -> Result<ResolvedServers> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentError::io(format!("Failed to read MCP catalog: {}", path.display()), e)
        })?;
        self.parse_str(&content, path)
    }

    fn parse_definition(
        &self,
        name: &str,
        entry: RawServerEntry,
        source: &Path,
    ) -> Result<McpServerDefinition> {
        let kind = scalar_text(&entry.kind)
            .map(|kind| self.subst(&kind))
            .unwrap_or_else(|| TransportType::Stdio.as_str().to_string());

        let transport = TransportType::try_from(kind.as_str()).map_err(|_| {
            AgentError::parse(
                source,
                format!("Unknown MCP server type '{}' for server '{}'", kind, name),
            )
        })?;

        let invalid = |e: AgentError| AgentError::parse(source, format!("server '{}': {}", name, e));

        let def: McpServerDefinition = match transport {
            TransportType::Stdio => {
                let command = self.subst_text(&entry.command);
                StdioDefinition::new(command)
                    .map_err(invalid)?
                    .with_args(self.subst_list(&entry.args))
                    .with_env(self.subst_map(&entry.env))
                    .into()
            }
            TransportType::Sse => {
                let url = self.subst_text(&entry.url);
                SseDefinition::new(url)
                    .map_err(invalid)?
                    .with_headers(self.subst_map(&entry.headers))
                    .into()
            }
            TransportType::Http => {
                let url = self.subst_text(&entry.url);
                HttpDefinition::new(url)
                    .map_err(invalid)?
                    .with_headers(self.subst_map(&entry.headers))
                    .into()
            }
        };
        Ok(def)
    }

    fn subst(&self, value: &str) -> String {
        substitute_env_vars(value, &self.env)
    }

    fn subst_text(&self, value: &Value) -> String {
        scalar_text(value)
            .map(|text| self.subst(&text))
            .unwrap_or_default()
    }

    /// Array elements as text; anything but an array is empty.
    fn subst_list(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Array(items) => items.iter().map(|item| self.subst_text(item)).collect(),
            _ => Vec::new(),
        }
    }

    /// Object values as text; anything but an object is empty.
    fn subst_map(&self, value: &Value) -> BTreeMap<String, String> {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), self.subst_text(v)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

fn catalog_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AgentError::io(format!("Failed to scan directory: {}", dir.display()), e)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AgentError::io(format!("Failed to scan directory: {}", dir.display()), e)
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext == CATALOG_FILE_EXTENSION);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_replaces_every_placeholder() {
        let env = env(&[("HOST", "localhost"), ("PORT", "8080")]);
        assert_eq!(
            substitute_env_vars("http://${HOST}:${PORT}/sse", &env),
            "http://localhost:8080/sse"
        );
    }

    #[test]
    fn test_substitute_unset_becomes_empty() {
        let env = env(&[]);
        assert_eq!(substitute_env_vars("key=${MISSING}", &env), "key=");
    }

    #[test]
    fn test_substitute_leaves_plain_text() {
        let env = env(&[("A", "x")]);
        assert_eq!(substitute_env_vars("no_vars_here $A {A}", &env), "no_vars_here $A {A}");
    }

    #[test]
    fn test_unknown_type_names_server_and_file() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "servers": { "ws": { "type": "websocket", "url": "ws://x" } } }"#;
        let err = loader
            .parse_str(content, Path::new("catalog/ws.json"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("websocket"));
        assert!(message.contains("'ws'"));
        assert!(message.contains("catalog/ws.json"));
    }

    #[test]
    fn test_type_is_case_insensitive_and_substituted() {
        let loader = CatalogLoader::with_env(env(&[("KIND", "SSE")]));
        let content = r#"{ "servers": { "w": { "type": "${KIND}", "url": "http://w" } } }"#;
        let servers = loader.parse_str(content, Path::new("w.json")).unwrap();
        assert!(servers["w"].as_sse().is_some());
    }

    #[test]
    fn test_stdio_without_command_is_parse_error() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "servers": { "broken": { "args": ["x"] } } }"#;
        let err = loader.parse_str(content, Path::new("b.json")).unwrap_err();
        assert!(matches!(err, AgentError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_mcp_servers_alias_is_accepted() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "mcpServers": { "n": { "command": "node" } } }"#;
        let servers = loader.parse_str(content, Path::new("n.json")).unwrap();
        assert_eq!(servers["n"].endpoint(), "node");
    }

    #[test]
    fn test_scalar_args_and_env_values_become_text() {
        let loader = CatalogLoader::with_env(env(&[("PORT", "9000")]));
        let content = r#"{ "servers": { "s": {
            "command": "srv",
            "args": ["--port", 8080, true, "${PORT}"],
            "env": { "RETRIES": 3, "VERBOSE": false, "HOST": "h" }
        } } }"#;
        let servers = loader.parse_str(content, Path::new("s.json")).unwrap();
        let stdio = servers["s"].as_stdio().unwrap();
        assert_eq!(stdio.args(), ["--port", "8080", "true", "9000"]);
        assert_eq!(stdio.env()["RETRIES"], "3");
        assert_eq!(stdio.env()["VERBOSE"], "false");
        assert_eq!(stdio.env()["HOST"], "h");
    }

    #[test]
    fn test_null_or_misshapen_collections_are_empty() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "servers": {
            "a": { "command": "srv", "args": null, "env": null },
            "b": { "command": "srv", "args": "--flag", "env": ["X=1"] },
            "c": { "type": "http", "url": "http://c", "headers": 5 }
        } }"#;
        let servers = loader.parse_str(content, Path::new("n.json")).unwrap();
        for name in ["a", "b"] {
            let stdio = servers[name].as_stdio().unwrap();
            assert!(stdio.args().is_empty());
            assert!(stdio.env().is_empty());
        }
        assert!(servers["c"].as_http().unwrap().headers().is_empty());
    }

    #[test]
    fn test_fields_of_other_types_are_ignored() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "servers": {
            "w": { "type": "sse", "url": "http://w", "command": 42, "args": {"x": 1} },
            "s": { "command": "srv", "url": false, "headers": [1, 2] }
        } }"#;
        let servers = loader.parse_str(content, Path::new("o.json")).unwrap();
        assert_eq!(servers["w"].endpoint(), "http://w");
        assert_eq!(servers["s"].endpoint(), "srv");
    }

    #[test]
    fn test_numeric_command_is_read_as_text() {
        let loader = CatalogLoader::with_env(env(&[]));
        let content = r#"{ "servers": { "s": { "command": 7 } } }"#;
        let servers = loader.parse_str(content, Path::new("s.json")).unwrap();
        assert_eq!(servers["s"].endpoint(), "7");
    }
}
