//! Conversation transcript sent to the provider on every call.
//!
//! The transcript always starts with exactly one system message. After
//! construction it only grows: there is no delete, update, or windowing.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles that may be appended after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered, append-only message history.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create a transcript seeded with the session's system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::new(Role::System, system_prompt)],
        }
    }

    /// Append a user or assistant message. Never rejects, never deduplicates.
    pub fn append(&mut self, speaker: Speaker, content: impl Into<String>) {
        self.messages.push(Message::new(speaker.into(), content));
    }

    /// The full ordered history, system message first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages including the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system message is present from construction.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    /// Content of the most recent assistant message, if any.
    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_holds_only_system_message() {
        let transcript = Transcript::new("be helpful");
        assert_eq!(transcript.len(), 1);
        assert!(!transcript.is_empty());
        assert_eq!(transcript.snapshot()[0].role, Role::System);
        assert_eq!(transcript.system_prompt(), "be helpful");
        assert_eq!(transcript.last_assistant(), None);
    }

    #[test]
    fn append_preserves_order_and_system_head() {
        let mut transcript = Transcript::new("sys");
        transcript.append(Speaker::User, "q1");
        transcript.append(Speaker::Assistant, "a1");
        transcript.append(Speaker::User, "q2");
        transcript.append(Speaker::User, "q2");

        let snapshot = transcript.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot[0], Message::new(Role::System, "sys"));
        let contents: Vec<&str> = snapshot[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "q2"]);
        assert_eq!(transcript.last_assistant(), Some("a1"));
    }

    #[test]
    fn system_message_is_unchanged_by_appends() {
        let mut transcript = Transcript::new("original system prompt");
        for i in 0..20 {
            let speaker = if i % 2 == 0 {
                Speaker::User
            } else {
                Speaker::Assistant
            };
            transcript.append(speaker, format!("turn {i}"));
        }
        assert_eq!(transcript.len(), 21);
        assert_eq!(transcript.snapshot()[0].role, Role::System);
        assert_eq!(transcript.system_prompt(), "original system prompt");
        assert_eq!(
            transcript
                .snapshot()
                .iter()
                .filter(|m| m.role == Role::System)
                .count(),
            1
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
