//! agentmcp Core Library
//!
//! Declares MCP servers once in a portable catalog and attaches them to
//! agent CLI invocations, translating each definition into the provider's
//! own configuration format.

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod model;
pub mod provider;
pub mod transport;

pub use error::{AgentError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Catalog
    pub use crate::mcp::{
        CatalogLoader, HttpDefinition, McpServerCatalog, McpServerDefinition, ResolvedServers,
        SseDefinition, StdioDefinition, TransportType,
    };

    // Client
    pub use crate::client::{AgentClient, resolve_mcp_servers};

    // Models
    pub use crate::model::{AgentModel, AgentOptions, AgentResponse, AgentTaskRequest};
    pub use crate::provider::{
        ClaudeAgentModel, ClaudeAgentOptions, GeminiAgentModel, GeminiAgentOptions,
        McpTranslator, assemble_mcp_servers,
    };

    // Configuration
    pub use crate::config::{AgentMcpConfig, ProviderKind};

    // Errors
    pub use crate::error::{AgentError, Result};
}
