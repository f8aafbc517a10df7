//! Portable MCP server definitions.
//!
//! A definition is provider-agnostic: each agent model translates it into its
//! own native MCP configuration right before invoking the CLI. In-process SDK
//! servers carry live handles and cannot be expressed here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{AgentError, Result};

/// Transport discriminator used in catalog documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Stdio,
    Sse,
    Http,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Stdio => "stdio",
            TransportType::Sse => "sse",
            TransportType::Http => "http",
        }
    }
}

impl TryFrom<&str> for TransportType {
    type Error = AgentError;

    fn try_from(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "stdio" => Ok(TransportType::Stdio),
            "sse" => Ok(TransportType::Sse),
            "http" => Ok(TransportType::Http),
            _ => Err(AgentError::InvalidDefinition(format!(
                "Invalid transport: '{}'. Valid values: stdio, sse, http",
                value
            ))),
        }
    }
}

/// An immutable description of one MCP server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpServerDefinition {
    Stdio(StdioDefinition),
    Sse(SseDefinition),
    Http(HttpDefinition),
}

impl McpServerDefinition {
    pub fn transport(&self) -> TransportType {
        match self {
            McpServerDefinition::Stdio(_) => TransportType::Stdio,
            McpServerDefinition::Sse(_) => TransportType::Sse,
            McpServerDefinition::Http(_) => TransportType::Http,
        }
    }

    /// Command for stdio servers, URL for remote ones.
    pub fn endpoint(&self) -> &str {
        match self {
            McpServerDefinition::Stdio(def) => def.command(),
            McpServerDefinition::Sse(def) => def.url(),
            McpServerDefinition::Http(def) => def.url(),
        }
    }

    pub fn as_stdio(&self) -> Option<&StdioDefinition> {
        match self {
            McpServerDefinition::Stdio(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_sse(&self) -> Option<&SseDefinition> {
        match self {
            McpServerDefinition::Sse(def) => Some(def),
            _ => None,
        }
    }

    pub fn as_http(&self) -> Option<&HttpDefinition> {
        match self {
            McpServerDefinition::Http(def) => Some(def),
            _ => None,
        }
    }
}

impl From<StdioDefinition> for McpServerDefinition {
    fn from(def: StdioDefinition) -> Self {
        McpServerDefinition::Stdio(def)
    }
}

impl From<SseDefinition> for McpServerDefinition {
    fn from(def: SseDefinition) -> Self {
        McpServerDefinition::Sse(def)
    }
}

impl From<HttpDefinition> for McpServerDefinition {
    fn from(def: HttpDefinition) -> Self {
        McpServerDefinition::Http(def)
    }
}

/// Stdio-based server, launched as a subprocess by the agent CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StdioDefinition {
    command: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, String>,
}

impl StdioDefinition {
    pub fn new(command: impl Into<String>) -> Result<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(AgentError::InvalidDefinition(
                "command must not be blank".to_string(),
            ));
        }
        Ok(Self {
            command,
            args: Vec::new(),
            env: BTreeMap::new(),
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

/// Remote server reached over Server-Sent Events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SseDefinition {
    url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl SseDefinition {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: require_url(url.into())?,
            headers: BTreeMap::new(),
        })
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = collect_pairs(headers);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Remote server reached over streamable HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpDefinition {
    url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
}

impl HttpDefinition {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: require_url(url.into())?,
            headers: BTreeMap::new(),
        })
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = collect_pairs(headers);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

fn require_url(url: String) -> Result<String> {
    if url.trim().is_empty() {
        return Err(AgentError::InvalidDefinition(
            "url must not be blank".to_string(),
        ));
    }
    Ok(url)
}

fn collect_pairs<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
