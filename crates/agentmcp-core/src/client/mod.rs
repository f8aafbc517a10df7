//! Caller-facing client that attaches catalog servers to agent requests.

mod resolution;

pub use resolution::resolve_mcp_servers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::{AgentError, Result};
use crate::mcp::McpServerCatalog;
use crate::model::{AgentModel, AgentOptions, AgentResponse, AgentTaskRequest, DEFAULT_TIMEOUT};

/// Runs goals against one [`AgentModel`].
///
/// Server names configured as defaults are added to every request; names
/// given on a request are added on top. Both are resolved through the
/// client's catalog at run time.
#[derive(Clone)]
pub struct AgentClient {
    model: Arc<dyn AgentModel>,
    catalog: Option<McpServerCatalog>,
    default_mcp_servers: Vec<String>,
    default_working_directory: Option<PathBuf>,
    default_timeout: Duration,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("catalog", &self.catalog)
            .field("default_mcp_servers", &self.default_mcp_servers)
            .field("default_working_directory", &self.default_working_directory)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    pub fn builder(model: Arc<dyn AgentModel>) -> AgentClientBuilder {
        AgentClientBuilder {
            model,
            catalog: None,
            default_mcp_servers: Vec::new(),
            default_working_directory: None,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn create(model: Arc<dyn AgentModel>) -> Self {
        Self::builder(model).build()
    }

    /// A builder seeded with this client's settings.
    pub fn mutate(&self) -> AgentClientBuilder {
        AgentClientBuilder {
            model: Arc::clone(&self.model),
            catalog: self.catalog.clone(),
            default_mcp_servers: self.default_mcp_servers.clone(),
            default_working_directory: self.default_working_directory.clone(),
            default_timeout: self.default_timeout,
        }
    }

    pub fn goal(&self, goal: impl Into<String>) -> AgentRequestSpec<'_> {
        AgentRequestSpec {
            client: self,
            goal: goal.into(),
            working_directory: None,
            mcp_servers: Vec::new(),
            timeout: None,
        }
    }

    /// Run a goal with the client's defaults.
    pub fn run(&self, goal: impl Into<String>) -> Result<AgentResponse> {
        self.goal(goal).run()
    }

    pub fn catalog(&self) -> Option<&McpServerCatalog> {
        self.catalog.as_ref()
    }

    pub fn default_mcp_servers(&self) -> &[String] {
        &self.default_mcp_servers
    }
}

pub struct AgentClientBuilder {
    model: Arc<dyn AgentModel>,
    catalog: Option<McpServerCatalog>,
    default_mcp_servers: Vec<String>,
    default_working_directory: Option<PathBuf>,
    default_timeout: Duration,
}

impl AgentClientBuilder {
    pub fn mcp_server_catalog(mut self, catalog: McpServerCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Add server names resolved on every request.
    pub fn default_mcp_servers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_mcp_servers
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn default_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_working_directory = Some(dir.into());
        self
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn build(self) -> AgentClient {
        AgentClient {
            model: self.model,
            catalog: self.catalog,
            default_mcp_servers: self.default_mcp_servers,
            default_working_directory: self.default_working_directory,
            default_timeout: self.default_timeout,
        }
    }
}

/// One pending request, built fluently and consumed by [`run`](Self::run).
pub struct AgentRequestSpec<'a> {
    client: &'a AgentClient,
    goal: String,
    working_directory: Option<PathBuf>,
    mcp_servers: Vec<String>,
    timeout: Option<Duration>,
}

impl AgentRequestSpec<'_> {
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Add server names for this request; repeated calls accumulate.
    pub fn mcp_servers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mcp_servers.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn run(self) -> Result<AgentResponse> {
        let client = self.client;
        let mcp_servers = resolve_mcp_servers(
            client.catalog.as_ref(),
            &client.default_mcp_servers,
            &self.mcp_servers,
        )?;

        let working_directory = match self
            .working_directory
            .or_else(|| client.default_working_directory.clone())
        {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(|e| AgentError::io("Failed to determine current directory", e))?,
        };

        let options = AgentOptions {
            timeout: self.timeout.unwrap_or(client.default_timeout),
            mcp_servers,
            ..AgentOptions::default()
        };
        info!(
            "Running goal in {} with {} MCP server(s)",
            working_directory.display(),
            options.mcp_servers.len()
        );

        let request = AgentTaskRequest::new(self.goal, working_directory).with_options(options);
        client.model.call(&request)
    }
}
