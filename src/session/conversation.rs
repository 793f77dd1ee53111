use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a log entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        };
        f.write_str(label)
    }
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

/// Append-only, ordered conversation log.
///
/// Entries can be added and read; there is no way to edit, reorder or remove one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn system(&mut self, content: impl Into<String>) {
        self.append(MessageRole::System, content);
    }

    pub fn user(&mut self, content: impl Into<String>) {
        self.append(MessageRole::User, content);
    }

    pub fn assistant(&mut self, content: impl Into<String>) {
        self.append(MessageRole::Assistant, content);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Title derived from the first question, truncated to 60 characters
    pub fn title(&self) -> Option<String> {
        let first = self.messages.iter().find(|m| m.role == MessageRole::User)?;
        let mut chars = first.content.chars();
        let preview: String = chars.by_ref().take(60).collect();
        if chars.next().is_some() {
            Some(format!("{}...", preview))
        } else {
            Some(preview)
        }
    }

    /// One-line summary for status displays
    pub fn summary(&self) -> String {
        let questions = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .count();
        format!("{} messages | {} questions", self.messages.len(), questions)
    }
}
