mod support;

use serde_json::json;
use tempfile::TempDir;

use agentmcp_core::error::AgentError;
use agentmcp_core::mcp::McpServerCatalog;
use agentmcp_core::provider::{GeminiTranslator, assemble_mcp_servers};
use agentmcp_core::transport::gemini_cli::GEMINI_SETTINGS;
use agentmcp_core::transport::{
    cleanup_settings_artifact, read_settings_artifact, write_settings_artifact,
};

use support::write_json;

#[test]
fn write_then_read_returns_same_servers() {
    let temp = TempDir::new().unwrap();
    let servers = json!({
        "brave": {"command": "npx", "args": ["-y", "brave"]},
        "weather": {"url": "http://localhost:8080/sse"}
    });

    let path = write_settings_artifact(temp.path(), &GEMINI_SETTINGS, &servers).unwrap();
    assert_eq!(path, temp.path().join(".gemini").join("settings.json"));

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw, json!({"mcpServers": servers}));

    let read = read_settings_artifact(&path, &GEMINI_SETTINGS).unwrap();
    assert_eq!(serde_json::Value::Object(read), servers);
}

#[test]
fn cleanup_removes_file_and_empty_parent() {
    let temp = TempDir::new().unwrap();
    let path = write_settings_artifact(temp.path(), &GEMINI_SETTINGS, &json!({})).unwrap();

    cleanup_settings_artifact(Some(&path));
    assert!(!path.exists());
    assert!(!temp.path().join(".gemini").exists());
}

#[test]
fn cleanup_keeps_non_empty_parent() {
    let temp = TempDir::new().unwrap();
    let path = write_settings_artifact(temp.path(), &GEMINI_SETTINGS, &json!({})).unwrap();
    let neighbour = temp.path().join(".gemini").join("GEMINI.md");
    std::fs::write(&neighbour, "# notes").unwrap();

    cleanup_settings_artifact(Some(&path));
    assert!(!path.exists());
    assert!(neighbour.exists());
}

#[test]
fn cleanup_of_none_or_missing_is_noop() {
    let temp = TempDir::new().unwrap();
    cleanup_settings_artifact(None);
    cleanup_settings_artifact(Some(&temp.path().join(".gemini").join("settings.json")));
    assert!(temp.path().exists());
}

#[cfg(unix)]
#[test]
fn unwritable_directory_is_artifact_error() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let locked = temp.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();

    let result = write_settings_artifact(&locked, &GEMINI_SETTINGS, &json!({}));
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();

    // Root ignores directory permissions.
    if let Err(err) = result {
        assert!(matches!(err, AgentError::ArtifactIo { .. }));
    }
}

#[test]
fn catalog_directory_to_gemini_settings_end_to_end() {
    let catalog_dir = TempDir::new().unwrap();
    write_json(
        catalog_dir.path(),
        "brave.json",
        &json!({"servers": {"brave": {
            "type": "stdio",
            "command": "npx",
            "args": ["-y", "@modelcontextprotocol/server-brave-search"]
        }}}),
    );
    write_json(
        catalog_dir.path(),
        "weather.json",
        &json!({"servers": {"weather": {"type": "sse", "url": "http://localhost:8080/sse"}}}),
    );

    let catalog = McpServerCatalog::from_directory(catalog_dir.path()).unwrap();
    let resolved = catalog.resolve(["brave", "weather"]).unwrap();
    assert_eq!(resolved.len(), 2);

    let servers = assemble_mcp_servers(&GeminiTranslator, &resolved, &Default::default());
    let workdir = TempDir::new().unwrap();
    let path = write_settings_artifact(workdir.path(), &GEMINI_SETTINGS, &servers).unwrap();

    let written = read_settings_artifact(&path, &GEMINI_SETTINGS).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(
        written["brave"],
        json!({"command": "npx", "args": ["-y", "@modelcontextprotocol/server-brave-search"]})
    );
    assert_eq!(written["weather"], json!({"url": "http://localhost:8080/sse"}));

    cleanup_settings_artifact(Some(&path));
    assert!(!path.exists());
    assert!(!workdir.path().join(".gemini").exists());
}
