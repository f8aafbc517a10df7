mod support;

use serde_json::json;
use tempfile::TempDir;

use agentmcp_core::config::{ProviderKind, load_config, parse_config};
use agentmcp_core::mcp::{McpServerDefinition, SseDefinition};

use support::write_json;

#[test]
fn config_points_at_catalog_directory() {
    let temp = TempDir::new().unwrap();
    let servers = temp.path().join("servers");
    std::fs::create_dir(&servers).unwrap();
    write_json(
        &servers,
        "weather.json",
        &json!({"mcpServers": {"weather": {"type": "sse", "url": "http://localhost:8080/sse"}}}),
    );

    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "catalog = {:?}\ndefault_servers = [\"weather\"]\n\n[provider]\nkind = \"claude\"\n",
            servers.display().to_string()
        ),
    )
    .unwrap();

    let config = load_config(Some(&config_path)).unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Claude);

    let catalog = config.load_catalog().unwrap().unwrap();
    let resolved = catalog.resolve(&config.default_servers).unwrap();
    assert!(resolved["weather"].as_sse().is_some());
}

#[test]
fn explicit_missing_config_is_error() {
    let temp = TempDir::new().unwrap();
    assert!(load_config(Some(&temp.path().join("absent.toml"))).is_err());
}

#[test]
fn relative_working_directory_resolves_against_base() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(&config_path, "working_directory = \"work\"\n").unwrap();

    let config = parse_config(&config_path).unwrap();
    assert_eq!(
        config.working_directory_in(temp.path()),
        Some(temp.path().join("work"))
    );
}

#[test]
fn provider_render_shapes_differ() {
    let def: McpServerDefinition = SseDefinition::new("http://w").unwrap().into();
    assert_eq!(
        ProviderKind::Claude.render(&def).unwrap(),
        json!({"type": "sse", "url": "http://w"})
    );
    assert_eq!(
        ProviderKind::Gemini.render(&def).unwrap(),
        json!({"url": "http://w"})
    );
}
