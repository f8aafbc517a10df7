//! Gemini CLI transport (file-style MCP configuration).

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use super::discovery::find_executable;
use super::message::{Message, parse_output};
use super::process::ProcessExecutor;
use super::settings::{SettingsArtifact, SettingsLayout};
use crate::error::{AgentError, Result};

/// Gemini reads MCP servers from `.gemini/settings.json` in its working directory.
pub const GEMINI_SETTINGS: SettingsLayout = SettingsLayout {
    directory: ".gemini",
    file_name: "settings.json",
    servers_key: "mcpServers",
};

pub const DEFAULT_GEMINI_COMMAND: &str = "gemini";

/// Per-call Gemini CLI flags.
#[derive(Debug, Clone, Default)]
pub struct GeminiCliOptions {
    pub model: Option<String>,
    /// `-y`: auto-approve every tool call.
    pub yolo: bool,
    /// `-a`: include all files in context.
    pub all_files: bool,
    pub debug: bool,
    pub sandbox: bool,
    pub sandbox_image: Option<String>,
    pub proxy: Option<String>,
    pub include_directories: Vec<String>,
    pub extensions: Vec<String>,
    /// Translated servers, written to the settings artifact.
    pub mcp_servers: IndexMap<String, Value>,
    /// Overrides the transport's default timeout.
    pub timeout: Option<Duration>,
}

impl GeminiCliOptions {
    /// Comma-separated server names, or `None` when no servers are configured.
    pub fn allowed_mcp_server_names(&self) -> Option<String> {
        if self.mcp_servers.is_empty() {
            return None;
        }
        Some(
            self.mcp_servers
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeminiCliTransport {
    command_prefix: Vec<String>,
    working_directory: PathBuf,
    default_timeout: Duration,
    executor: ProcessExecutor,
}

impl GeminiCliTransport {
    /// Locate `gemini` on `PATH` (or use `executable`) and bind it to a working directory.
    pub fn discover(
        working_directory: impl Into<PathBuf>,
        default_timeout: Duration,
        executable: Option<&Path>,
    ) -> Result<Self> {
        let path = find_executable(DEFAULT_GEMINI_COMMAND, executable)?;
        Ok(Self::with_command(
            vec![path.display().to_string()],
            working_directory,
            default_timeout,
        ))
    }

    /// Use an explicit command prefix, e.g. `["npx", "@google/gemini-cli"]`.
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

    /// Full argument vector for one invocation; the prompt is always last.
    pub fn build_command(&self, prompt: &str, options: &GeminiCliOptions) -> Vec<String> {
        let mut command = self.command_prefix.clone();

        if let Some(model) = &options.model {
            command.push("-m".to_string());
            command.push(model.clone());
        }
        if options.yolo {
            command.push("-y".to_string());
        }
        if options.all_files {
            command.push("-a".to_string());
        }
        if options.debug {
            command.push("-d".to_string());
        }
        if options.sandbox {
            command.push("-s".to_string());
        }
        if let Some(image) = &options.sandbox_image {
            command.push("--sandbox-image".to_string());
            command.push(image.clone());
        }
        if let Some(proxy) = &options.proxy {
            command.push("--proxy".to_string());
            command.push(proxy.clone());
        }
        if !options.include_directories.is_empty() {
            command.push("--include-directories".to_string());
            command.push(options.include_directories.join(","));
        }
        if !options.extensions.is_empty() {
            command.push("-e".to_string());
            command.extend(options.extensions.iter().cloned());
        }
        if let Some(names) = options.allowed_mcp_server_names() {
            command.push("--allowed-mcp-server-names".to_string());
            command.push(names);
        }

        command.push("-p".to_string());
        command.push(prompt.to_string());
        command
    }

    /// Stage settings, run the CLI, parse its output, then remove the settings.
    pub fn execute_query(&self, prompt: &str, options: &GeminiCliOptions) -> Result<Vec<Message>> {
        if prompt.trim().is_empty() {
            return Err(AgentError::InvalidArgument(
                "prompt must not be blank".to_string(),
            ));
        }

        let artifact = if options.mcp_servers.is_empty() {
            None
        } else {
            Some(SettingsArtifact::stage(
                &self.working_directory,
                &GEMINI_SETTINGS,
                &options.mcp_servers,
            )?)
        };

        let command = self.build_command(prompt, options);
        info!(
            "Executing Gemini CLI with prompt length {} and {} MCP server(s)",
            prompt.len(),
            options.mcp_servers.len()
        );
        debug!("Command: {}", command.join(" "));

        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let output = self
            .executor
            .execute(&command, &self.working_directory, timeout);
        drop(artifact);

        let output = output?;
        debug!("Gemini CLI output length: {}", output.stdout.len());
        Ok(parse_output(&output.stdout))
    }
}
