//! Messages parsed from agent CLI output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    System,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Assistant,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            content: content.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Wrap raw CLI output as messages.
///
/// Blank output becomes a single error message; anything else is one
/// assistant message holding the trimmed text.
pub fn parse_output(raw: &str) -> Vec<Message> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return vec![Message::error("Empty response from agent CLI")];
    }
    vec![Message::assistant(trimmed)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_output_is_error() {
        let messages = parse_output("  \n\t ");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_error());
    }

    #[test]
    fn test_output_is_single_assistant_message() {
        let messages = parse_output("\nHello there.\n");
        assert_eq!(messages, vec![Message::assistant("Hello there.")]);
    }
}
