//! Claude CLI transport (flag-style MCP configuration).
//!
//! All MCP servers travel inline as one `--mcp-config` JSON value, so no file
//! is written and nothing needs cleaning up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::discovery::find_executable;
use super::message::{Message, parse_output};
use super::process::ProcessExecutor;
use crate::error::{AgentError, Result};

pub const DEFAULT_CLAUDE_COMMAND: &str = "claude";

/// One entry of Claude's `mcpServers` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClaudeMcpServerConfig {
    Stdio {
        command: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    Sse {
        url: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    Http {
        url: String,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ClaudeCliOptions {
    pub model: Option<String>,
    pub max_turns: Option<u32>,
    pub append_system_prompt: Option<String>,
    /// `--dangerously-skip-permissions`
    pub yolo: bool,
    pub mcp_servers: IndexMap<String, ClaudeMcpServerConfig>,
    /// Ignore MCP servers from Claude's own configuration files.
    pub strict_mcp_config: bool,
    pub timeout: Option<Duration>,
}

impl ClaudeCliOptions {
    /// `{"mcpServers": {...}}` as passed to `--mcp-config`.
    pub fn mcp_config_json(&self) -> Result<String> {
        let document = McpConfigDocument {
            mcp_servers: &self.mcp_servers,
        };
        serde_json::to_string(&document).map_err(|e| {
            AgentError::InvalidDefinition(format!("Failed to serialize MCP config: {}", e))
        })
    }
}

#[derive(Serialize)]
struct McpConfigDocument<'a> {
    #[serde(rename = "mcpServers")]
    mcp_servers: &'a IndexMap<String, ClaudeMcpServerConfig>,
}

#[derive(Debug, Clone)]
pub struct ClaudeCliTransport {
    command_prefix: Vec<String>,
    working_directory: PathBuf,
    default_timeout: Duration,
    executor: ProcessExecutor,
}

impl ClaudeCliTransport {
    pub fn discover(
        working_directory: impl Into<PathBuf>,
        default_timeout: Duration,
        executable: Option<&Path>,
    ) -> Result<Self> {
        let path = find_executable(DEFAULT_CLAUDE_COMMAND, executable)?;
        Ok(Self::with_command(
            vec![path.display().to_string()],
            working_directory,
            default_timeout,
        ))
    }

    pub fn with_command(
        command_prefix: Vec<String>,
        working_directory: impl Into<PathBuf>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            command_prefix,
            working_directory: working_directory.into(),
            default_timeout,
            executor: ProcessExecutor::new(),
        }
    }

    pub fn with_executor(mut self, executor: ProcessExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn build_command(&self, prompt: &str, options: &ClaudeCliOptions) -> Result<Vec<String>> {
        let mut command = self.command_prefix.clone();
        command.extend(["--print", "--output-format", "text"].map(String::from));

        if let Some(model) = &options.model {
            command.push("--model".to_string());
            command.push(model.clone());
        }
        if let Some(turns) = options.max_turns {
            command.push("--max-turns".to_string());
            command.push(turns.to_string());
        }
        if let Some(system_prompt) = &options.append_system_prompt {
            command.push("--append-system-prompt".to_string());
            command.push(system_prompt.clone());
        }
        if options.yolo {
            command.push("--dangerously-skip-permissions".to_string());
        }
        if !options.mcp_servers.is_empty() {
            command.push("--mcp-config".to_string());
            command.push(options.mcp_config_json()?);
        }
        if options.strict_mcp_config {
            command.push("--strict-mcp-config".to_string());
        }

        command.push(prompt.to_string());
        Ok(command)
    }

    pub fn execute_query(&self, prompt: &str, options: &ClaudeCliOptions) -> Result<Vec<Message>> {
        if prompt.trim().is_empty() {
            return Err(AgentError::InvalidArgument(
                "prompt must not be blank".to_string(),
            ));
        }

        let command = self.build_command(prompt, options)?;
        info!(
            "Executing Claude CLI with prompt length {} and {} MCP server(s)",
            prompt.len(),
            options.mcp_servers.len()
        );
        debug!("Command: {}", command.join(" "));

        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let output = self
            .executor
            .execute(&command, &self.working_directory, timeout)?;
        Ok(parse_output(&output.stdout))
    }
}
