//! On-disk settings artifacts for file-style providers.
//!
//! A file-style agent CLI reads its MCP servers from a settings document
//! under the working directory. The document is staged right before the
//! invocation and removed right after, whatever the outcome.
//!
//! Concurrent invocations that share a working directory are not
//! coordinated: one call's cleanup can remove another call's settings.
//! Give each concurrent invocation its own working directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{AgentError, Result};

/// Where a provider expects its settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsLayout {
    /// Directory relative to the working directory, e.g. `.gemini`.
    pub directory: &'static str,
    pub file_name: &'static str,
    /// Top-level key holding the servers map.
    pub servers_key: &'static str,
}

impl SettingsLayout {
    pub fn path_in(&self, working_directory: &Path) -> PathBuf {
        working_directory.join(self.directory).join(self.file_name)
    }
}

/// Write `{ "<servers_key>": servers }` beneath `working_directory`.
///
/// Missing parent directories are created. An existing document is
/// overwritten, so repeated calls leave exactly one copy of `servers`.
pub fn write_settings_artifact<T: Serialize>(
    working_directory: &Path,
    layout: &SettingsLayout,
    servers: &T,
) -> Result<PathBuf> {
    let path = layout.path_in(working_directory);
    let artifact_err = |source: std::io::Error| AgentError::ArtifactIo {
        path: path.clone(),
        source,
    };

    let servers = serde_json::to_value(servers)
        .map_err(|e| artifact_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    let mut document = Map::new();
    document.insert(layout.servers_key.to_string(), servers);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(artifact_err)?;
    }
    let bytes = serde_json::to_vec_pretty(&Value::Object(document))
        .map_err(|e| artifact_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    std::fs::write(&path, bytes).map_err(artifact_err)?;

    debug!("Wrote MCP settings to {}", path.display());
    Ok(path)
}

/// Read back the servers map from a settings document.
pub fn read_settings_artifact(path: &Path, layout: &SettingsLayout) -> Result<Map<String, Value>> {
    let bytes = std::fs::read(path)
        .map_err(|e| AgentError::io(format!("Failed to read settings: {}", path.display()), e))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AgentError::parse(path, format!("invalid JSON: {}", e)))?;
    match value.get(layout.servers_key) {
        Some(Value::Object(servers)) => Ok(servers.clone()),
        Some(_) => Err(AgentError::parse(
            path,
            format!("expected '{}' to be a JSON object", layout.servers_key),
        )),
        None => Ok(Map::new()),
    }
}

/// Remove a settings document and its parent directory if that became empty.
///
/// Best effort: `None` and already-missing files are no-ops, and failures are
/// logged rather than returned.
pub fn cleanup_settings_artifact(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to clean up MCP settings file {}: {}", path.display(), e);
        return;
    }

    if let Some(parent) = path.parent()
        && parent.is_dir()
    {
        match std::fs::read_dir(parent) {
            Ok(mut entries) => {
                if entries.next().is_none()
                    && let Err(e) = std::fs::remove_dir(parent)
                {
                    warn!("Failed to remove settings directory {}: {}", parent.display(), e);
                }
            }
            Err(e) => warn!("Failed to inspect settings directory {}: {}", parent.display(), e),
        }
    }
    debug!("Cleaned up MCP settings at {}", path.display());
}

/// A staged settings document, removed when the guard is dropped.
#[derive(Debug)]
pub struct SettingsArtifact {
    path: Option<PathBuf>,
}

impl SettingsArtifact {
    pub fn stage<T: Serialize>(
        working_directory: &Path,
        layout: &SettingsLayout,
        servers: &T,
    ) -> Result<Self> {
        let path = write_settings_artifact(working_directory, layout, servers)?;
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Clean up now instead of at drop.
    pub fn release(mut self) {
        cleanup_settings_artifact(self.path.take().as_deref());
    }
}

impl Drop for SettingsArtifact {
    fn drop(&mut self) {
        cleanup_settings_artifact(self.path.take().as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const LAYOUT: SettingsLayout = SettingsLayout {
        directory: ".agent",
        file_name: "settings.json",
        servers_key: "mcpServers",
    };

    #[test]
    fn test_write_overwrites_previous_document() {
        let temp = TempDir::new().unwrap();
        write_settings_artifact(temp.path(), &LAYOUT, &json!({"a": {"command": "x"}})).unwrap();
        let path =
            write_settings_artifact(temp.path(), &LAYOUT, &json!({"b": {"command": "y"}}))
                .unwrap();

        let servers = read_settings_artifact(&path, &LAYOUT).unwrap();
        assert_eq!(servers.len(), 1);
        assert!(servers.contains_key("b"));
    }

    #[test]
    fn test_guard_cleans_up_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = {
            let artifact =
                SettingsArtifact::stage(temp.path(), &LAYOUT, &json!({"a": {}})).unwrap();
            let path = artifact.path().unwrap().to_path_buf();
            assert!(path.exists());
            path
        };
        assert!(!path.exists());
        assert!(!temp.path().join(".agent").exists());
    }

    #[test]
    fn test_guard_cleans_up_when_unwinding() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        let result = std::panic::catch_unwind(move || {
            let _artifact = SettingsArtifact::stage(&dir, &LAYOUT, &json!({"a": {}})).unwrap();
            panic!("agent call blew up");
        });
        assert!(result.is_err());
        assert!(!LAYOUT.path_in(temp.path()).exists());
    }
}
