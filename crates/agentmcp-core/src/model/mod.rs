//! Provider-independent agent request and response types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::mcp::ResolvedServers;
use crate::transport::{Message, MessageKind};

/// Default upper bound for one agent invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// An agent backed by some external CLI.
///
/// Implementations translate the portable MCP servers attached to a request
/// into their native configuration right before invoking the CLI.
pub trait AgentModel: Send + Sync {
    fn call(&self, request: &AgentTaskRequest) -> Result<AgentResponse>;

    /// Whether the backing CLI can be invoked at all.
    fn is_available(&self) -> bool;
}

/// Per-call knobs; the working directory lives on [`AgentTaskRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    pub timeout: Duration,
    pub environment: BTreeMap<String, String>,
    pub model: Option<String>,
    /// Portable servers resolved from the catalog for this call.
    pub mcp_servers: ResolvedServers,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            environment: BTreeMap::new(),
            model: None,
            mcp_servers: ResolvedServers::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentTaskRequest {
    goal: String,
    working_directory: PathBuf,
    options: AgentOptions,
}

impl AgentTaskRequest {
    pub fn new(goal: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            goal: goal.into(),
            working_directory: working_directory.into(),
            options: AgentOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn mcp_servers(&self) -> &ResolvedServers {
        &self.options.mcp_servers
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    messages: Vec<Message>,
}

impl AgentResponse {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Assistant text, one message per line.
    pub fn result(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.kind == MessageKind::Assistant)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_successful(&self) -> bool {
        !self.messages.is_empty() && !self.messages.iter().any(Message::is_error)
    }
}
