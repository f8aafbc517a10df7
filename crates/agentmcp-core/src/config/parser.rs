//! TOML parser with helpful error messages

use std::path::Path;

use super::schema::AgentMcpConfig;
use crate::error::{AgentError, Result};

/// Parse config.toml with detailed error messages
pub fn parse_config(path: &Path) -> Result<AgentMcpConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::io(format!("Failed to read config file: {}", path.display()), e)
    })?;

    parse_config_str(&content).map_err(|e| match e {
        AgentError::ConfigParse { message, .. } => AgentError::parse(path, message),
        other => other,
    })
}

/// Parse config.toml content from string
pub fn parse_config_str(content: &str) -> Result<AgentMcpConfig> {
    let config: AgentMcpConfig = toml::from_str(content)
        .map_err(|e| AgentError::parse("<config>", enhance_toml_error(&e, content)))?;

    config
        .validate()
        .map_err(|message| AgentError::parse("<config>", message))?;

    Ok(config)
}

/// Serialize a configuration to a TOML string
pub fn to_toml(config: &AgentMcpConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| {
        AgentError::InvalidArgument(format!("Failed to serialize configuration to TOML: {}", e))
    })
}

fn enhance_toml_error(error: &toml::de::Error, content: &str) -> String {
    let message = error.message();
    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            format!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                get_line_context(content, line_num),
                message
            )
        }
        None => format!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
