//! Error taxonomy shared by the catalog, resolution and transport layers.

use std::path::PathBuf;
use std::time::Duration;

/// Errors surfaced by agentmcp operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A catalog or config document is malformed.
    #[error("Failed to parse {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// One or more requested server names are absent from the catalog.
    #[error(
        "MCP server '{}' not found in catalog. Available: [{}]",
        .missing.join("', '"),
        .available.join(", ")
    )]
    CatalogLookup {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// Server names were requested but no catalog was configured.
    #[error(
        "MCP servers [{}] were requested but no McpServerCatalog is configured",
        .requested.join(", ")
    )]
    MissingCatalog { requested: Vec<String> },

    #[error("Invalid MCP server definition: {0}")]
    InvalidDefinition(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The agent CLI binary could not be located or started.
    #[error("Executable not found: {command}")]
    ExecutableNotFound {
        command: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Process timed out after {}s", .duration.as_secs_f64())]
    Timeout { duration: Duration },

    /// The process ran but exited with a non-zero code.
    #[error("Process exited with code {exit_code}{}", failure_detail(.stdout, .stderr))]
    ProcessExecution {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Writing a settings artifact failed; the invocation is aborted.
    #[error("Failed to write settings artifact {}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AgentError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AgentError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AgentError::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// `": <stderr>"`, falling back to stdout, or nothing when both are blank.
fn failure_detail(stdout: &str, stderr: &str) -> String {
    [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty())
        .map(|text| format!(": {}", text))
        .unwrap_or_default()
}
