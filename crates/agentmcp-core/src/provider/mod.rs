//! Provider-specific agent models and MCP translation.

pub mod claude;
pub mod gemini;

pub use claude::{ClaudeAgentModel, ClaudeAgentOptions, ClaudeTranslator};
pub use gemini::{GeminiAgentModel, GeminiAgentOptions, GeminiTranslator};

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::mcp::{McpServerDefinition, ResolvedServers};
use crate::model::AgentTaskRequest;
use crate::transport::{CliAvailability, ProcessExecutor, find_executable};

/// Maps a portable definition to one provider's native configuration.
///
/// Translation is pure: a fresh value is produced on every call.
pub trait McpTranslator {
    type Config;

    fn translate(&self, definition: &McpServerDefinition) -> Self::Config;
}

/// Build the final per-provider server set for one invocation.
///
/// Portable servers are translated in order; a native entry with the same name
/// replaces the portable one outright. Native-only entries follow.
pub fn assemble_mcp_servers<T: McpTranslator>(
    translator: &T,
    portable: &ResolvedServers,
    native: &IndexMap<String, T::Config>,
) -> IndexMap<String, T::Config>
where
    T::Config: Clone,
{
    let mut servers = IndexMap::with_capacity(portable.len() + native.len());
    for (name, definition) in portable {
        if native.contains_key(name) {
            debug!("Native MCP config for '{}' overrides catalog definition", name);
            continue;
        }
        servers.insert(name.clone(), translator.translate(definition));
    }
    for (name, config) in native {
        servers.insert(name.clone(), config.clone());
    }
    servers
}

/// How a provider model locates its CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Look the default binary up on `PATH`, or use an explicit path.
    Discover(Option<PathBuf>),
    /// Run this exact prefix; the provider's flags are appended.
    Fixed(Vec<String>),
}

impl CliCommand {
    fn prefix(&self, default_name: &str) -> Result<Vec<String>> {
        match self {
            CliCommand::Discover(explicit) => {
                let path = find_executable(default_name, explicit.as_deref())?;
                Ok(vec![path.display().to_string()])
            }
            CliCommand::Fixed(prefix) => Ok(prefix.clone()),
        }
    }

    fn is_available(&self, default_name: &str) -> bool {
        match self {
            CliCommand::Discover(explicit) => {
                CliAvailability::check(default_name, explicit.as_deref()).is_available()
            }
            CliCommand::Fixed(prefix) => prefix
                .first()
                .is_some_and(|program| find_executable(program, None).is_ok()),
        }
    }
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::Discover(None)
    }
}

fn executor_for(request: &AgentTaskRequest) -> ProcessExecutor {
    ProcessExecutor::new().with_env(request.options().environment.clone())
}
