//! Schema for agentmcp's `config.toml`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::default_catalog_dir;
use crate::error::{AgentError, Result};
use crate::mcp::{McpServerCatalog, McpServerDefinition};
use crate::model::{AgentModel, DEFAULT_TIMEOUT};
use crate::provider::{
    ClaudeAgentModel, ClaudeAgentOptions, ClaudeTranslator, CliCommand, GeminiAgentModel,
    GeminiAgentOptions, GeminiTranslator, McpTranslator,
};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMcpConfig {
    /// Catalog file or directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Server names attached to every run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_servers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Explicit CLI path; otherwise looked up on `PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub yolo: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Claude,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
        }
    }

    /// Translate a portable definition into this provider's JSON shape.
    pub fn render(&self, definition: &McpServerDefinition) -> Result<serde_json::Value> {
        match self {
            ProviderKind::Gemini => Ok(GeminiTranslator.translate(definition)),
            ProviderKind::Claude => serde_json::to_value(ClaudeTranslator.translate(definition))
                .map_err(|e| AgentError::InvalidDefinition(e.to_string())),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "claude" => Ok(ProviderKind::Claude),
            other => Err(AgentError::InvalidArgument(format!(
                "Unknown provider '{}'. Valid values: gemini, claude",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AgentMcpConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.provider.timeout_secs == Some(0) {
            return Err("provider.timeout_secs must be greater than zero".to_string());
        }
        if let Some(name) = self.default_servers.iter().find(|n| n.trim().is_empty()) {
            return Err(format!("default_servers contains a blank name: '{}'", name));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.provider
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Load the configured catalog.
    ///
    /// Without an explicit `catalog`, the default catalog directory is used
    /// when it exists; otherwise there is no catalog.
    pub fn load_catalog(&self) -> Result<Option<McpServerCatalog>> {
        if let Some(path) = &self.catalog {
            return McpServerCatalog::from_path(path).map(Some);
        }
        match default_catalog_dir() {
            Some(dir) if dir.is_dir() => McpServerCatalog::from_directory(&dir).map(Some),
            _ => {
                debug!("No MCP catalog configured");
                Ok(None)
            }
        }
    }

    /// The agent model described by `[provider]`.
    pub fn build_model(&self, kind: Option<ProviderKind>) -> Arc<dyn AgentModel> {
        let provider = &self.provider;
        let command = CliCommand::Discover(provider.executable.clone());
        match kind.unwrap_or(provider.kind) {
            ProviderKind::Gemini => Arc::new(
                GeminiAgentModel::new(GeminiAgentOptions {
                    model: provider.model.clone(),
                    yolo: provider.yolo,
                    ..Default::default()
                })
                .with_command(command),
            ),
            ProviderKind::Claude => Arc::new(
                ClaudeAgentModel::new(ClaudeAgentOptions {
                    model: provider.model.clone(),
                    yolo: provider.yolo,
                    ..Default::default()
                })
                .with_command(command),
            ),
        }
    }

    /// Resolve `working_directory` against `base` when it is relative.
    pub fn working_directory_in(&self, base: &Path) -> Option<PathBuf> {
        self.working_directory.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                base.join(dir)
            }
        })
    }
}
