//! Claude agent model.

use indexmap::IndexMap;
use tracing::debug;

use super::{CliCommand, McpTranslator, assemble_mcp_servers, executor_for};
use crate::error::Result;
use crate::mcp::McpServerDefinition;
use crate::model::{AgentModel, AgentResponse, AgentTaskRequest};
use crate::transport::claude_cli::DEFAULT_CLAUDE_COMMAND;
use crate::transport::{ClaudeCliOptions, ClaudeCliTransport, ClaudeMcpServerConfig};

/// Portable definitions to Claude's typed `mcpServers` entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeTranslator;

impl McpTranslator for ClaudeTranslator {
    type Config = ClaudeMcpServerConfig;

    fn translate(&self, definition: &McpServerDefinition) -> ClaudeMcpServerConfig {
        match definition {
            McpServerDefinition::Stdio(def) => ClaudeMcpServerConfig::Stdio {
                command: def.command().to_string(),
                args: def.args().to_vec(),
                env: def.env().clone(),
            },
            McpServerDefinition::Sse(def) => ClaudeMcpServerConfig::Sse {
                url: def.url().to_string(),
                headers: def.headers().clone(),
            },
            McpServerDefinition::Http(def) => ClaudeMcpServerConfig::Http {
                url: def.url().to_string(),
                headers: def.headers().clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaudeAgentOptions {
    pub model: Option<String>,
    pub yolo: bool,
    pub max_turns: Option<u32>,
    pub append_system_prompt: Option<String>,
    /// Native entries; these win over catalog servers of the same name.
    pub mcp_servers: IndexMap<String, ClaudeMcpServerConfig>,
    pub strict_mcp_config: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ClaudeAgentModel {
    command: CliCommand,
    options: ClaudeAgentOptions,
}

impl ClaudeAgentModel {
    pub fn new(options: ClaudeAgentOptions) -> Self {
        Self {
            command: CliCommand::default(),
            options,
        }
    }

    pub fn with_command(mut self, command: CliCommand) -> Self {
        self.command = command;
        self
    }

    pub fn options(&self) -> &ClaudeAgentOptions {
        &self.options
    }

    /// CLI options for one request, with catalog servers translated and merged.
    pub fn cli_options(&self, request: &AgentTaskRequest) -> ClaudeCliOptions {
        let request_options = request.options();
        ClaudeCliOptions {
            model: request_options
                .model
                .clone()
                .or_else(|| self.options.model.clone()),
            max_turns: self.options.max_turns,
            append_system_prompt: self.options.append_system_prompt.clone(),
            yolo: self.options.yolo,
            mcp_servers: assemble_mcp_servers(
                &ClaudeTranslator,
                &request_options.mcp_servers,
                &self.options.mcp_servers,
            ),
            strict_mcp_config: self.options.strict_mcp_config,
            timeout: Some(request_options.timeout),
        }
    }
}

impl AgentModel for ClaudeAgentModel {
    fn call(&self, request: &AgentTaskRequest) -> Result<AgentResponse> {
        let options = self.cli_options(request);
        debug!(
            "Claude call with MCP servers {:?}",
            options.mcp_servers.keys().collect::<Vec<_>>()
        );

        let transport = ClaudeCliTransport::with_command(
            self.command.prefix(DEFAULT_CLAUDE_COMMAND)?,
            request.working_directory(),
            request.options().timeout,
        )
        .with_executor(executor_for(request));

        let messages = transport.execute_query(request.goal(), &options)?;
        Ok(AgentResponse::new(messages))
    }

    fn is_available(&self) -> bool {
        self.command.is_available(DEFAULT_CLAUDE_COMMAND)
    }
}
