//! Subprocess transports for agent CLIs.
//!
//! Flag-style providers receive MCP configuration on the command line;
//! file-style providers read a settings artifact staged in the working
//! directory for the duration of one call.

pub mod claude_cli;
pub mod discovery;
pub mod gemini_cli;
pub mod message;
pub mod process;
pub mod settings;

pub use claude_cli::{ClaudeCliOptions, ClaudeCliTransport, ClaudeMcpServerConfig};
pub use discovery::{CliAvailability, find_executable};
pub use gemini_cli::{GEMINI_SETTINGS, GeminiCliOptions, GeminiCliTransport};
pub use message::{Message, MessageKind, parse_output};
pub use process::{ProcessExecutor, ProcessOutput};
pub use settings::{
    SettingsArtifact, SettingsLayout, cleanup_settings_artifact, read_settings_artifact,
    write_settings_artifact,
};
