//! Gemini agent model.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{CliCommand, McpTranslator, assemble_mcp_servers, executor_for};
use crate::error::Result;
use crate::mcp::McpServerDefinition;
use crate::model::{AgentModel, AgentResponse, AgentTaskRequest};
use crate::transport::gemini_cli::DEFAULT_GEMINI_COMMAND;
use crate::transport::{GeminiCliOptions, GeminiCliTransport};

/// Portable definitions to Gemini `settings.json` entries.
///
/// Gemini infers the transport from the fields present, so no `type` key is
/// written.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiTranslator;

impl McpTranslator for GeminiTranslator {
    type Config = Value;

    fn translate(&self, definition: &McpServerDefinition) -> Value {
        let mut entry = Map::new();
        match definition {
            McpServerDefinition::Stdio(def) => {
                entry.insert("command".to_string(), json!(def.command()));
                if !def.args().is_empty() {
                    entry.insert("args".to_string(), json!(def.args()));
                }
                if !def.env().is_empty() {
                    entry.insert("env".to_string(), json!(def.env()));
                }
            }
            McpServerDefinition::Sse(def) => {
                entry.insert("url".to_string(), json!(def.url()));
                if !def.headers().is_empty() {
                    entry.insert("headers".to_string(), json!(def.headers()));
                }
            }
            McpServerDefinition::Http(def) => {
                entry.insert("url".to_string(), json!(def.url()));
                if !def.headers().is_empty() {
                    entry.insert("headers".to_string(), json!(def.headers()));
                }
            }
        }
        Value::Object(entry)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeminiAgentOptions {
    pub model: Option<String>,
    pub yolo: bool,
    pub all_files: bool,
    pub debug: bool,
    pub sandbox: bool,
    pub sandbox_image: Option<String>,
    pub proxy: Option<String>,
    pub include_directories: Vec<String>,
    pub extensions: Vec<String>,
    /// Native entries; these win over catalog servers of the same name.
    pub mcp_servers: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct GeminiAgentModel {
    command: CliCommand,
    options: GeminiAgentOptions,
}

impl GeminiAgentModel {
    pub fn new(options: GeminiAgentOptions) -> Self {
        Self {
            command: CliCommand::default(),
            options,
        }
    }

    pub fn with_command(mut self, command: CliCommand) -> Self {
        self.command = command;
        self
    }

    pub fn options(&self) -> &GeminiAgentOptions {
        &self.options
    }

    pub fn cli_options(&self, request: &AgentTaskRequest) -> GeminiCliOptions {
        let request_options = request.options();
        let defaults = &self.options;
        GeminiCliOptions {
            model: request_options
                .model
                .clone()
                .or_else(|| defaults.model.clone()),
            yolo: defaults.yolo,
            all_files: defaults.all_files,
            debug: defaults.debug,
            sandbox: defaults.sandbox,
            sandbox_image: defaults.sandbox_image.clone(),
            proxy: defaults.proxy.clone(),
            include_directories: defaults.include_directories.clone(),
            extensions: defaults.extensions.clone(),
            mcp_servers: assemble_mcp_servers(
                &GeminiTranslator,
                &request_options.mcp_servers,
                &defaults.mcp_servers,
            ),
            timeout: Some(request_options.timeout),
        }
    }
}

impl AgentModel for GeminiAgentModel {
    fn call(&self, request: &AgentTaskRequest) -> Result<AgentResponse> {
        let options = self.cli_options(request);
        debug!(
            "Gemini call with MCP servers {:?}",
            options.mcp_servers.keys().collect::<Vec<_>>()
        );

        let transport = GeminiCliTransport::with_command(
            self.command.prefix(DEFAULT_GEMINI_COMMAND)?,
            request.working_directory(),
            request.options().timeout,
        )
        .with_executor(executor_for(request));

        let messages = transport.execute_query(request.goal(), &options)?;
        Ok(AgentResponse::new(messages))
    }

    fn is_available(&self) -> bool {
        self.command.is_available(DEFAULT_GEMINI_COMMAND)
    }
}
