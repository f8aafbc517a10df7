//! User configuration.
//!
//! An optional `config.toml` under the platform config directory selects the
//! catalog, default servers and provider:
//!
//! - Linux: `~/.config/agentmcp/config.toml`
//! - macOS: `~/Library/Application Support/agentmcp/config.toml`

mod parser;
mod schema;

pub use parser::{parse_config, parse_config_str, to_toml};
pub use schema::{AgentMcpConfig, ProviderConfig, ProviderKind};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

const APP_DIR: &str = "agentmcp";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Directory scanned for catalog documents when none is configured.
pub fn default_catalog_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("servers"))
}

/// Load `explicit`, or the default config file if present, or defaults.
///
/// An explicit path must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<AgentMcpConfig> {
    if let Some(path) = explicit {
        return parse_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Loading config from {}", path.display());
            parse_config(&path)
        }
        _ => Ok(AgentMcpConfig::default()),
    }
}
