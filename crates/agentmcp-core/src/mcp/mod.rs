//! MCP (Model Context Protocol) server catalog and definitions

pub mod catalog;
pub mod definition;
pub mod loader;

pub use catalog::{McpServerCatalog, McpServerCatalogBuilder, ResolvedServers};
pub use definition::{
    HttpDefinition, McpServerDefinition, SseDefinition, StdioDefinition, TransportType,
};
pub use loader::{CatalogLoader, EnvLookup, ProcessEnv, substitute_env_vars};
